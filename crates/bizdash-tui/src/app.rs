//! Application core: event loop, screen switching, action dispatch.
//!
//! The session bridge is the only thing that moves the app between the
//! login form and the dashboard. Store bridges live under a separate
//! cancellation token that is replaced on every login.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};
use strum::IntoEnumIterator;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use bizdash_core::{Resource, ResourceDataStore, Session, UserSession};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::{CrudScreen, LoginScreen};
use crate::theme;
use crate::tui::Tui;
use crate::widgets::overlay;

const TOAST_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    session: Arc<Session>,
    profile_name: String,
    /// Currently shown screen.
    active_screen: ScreenId,
    /// Tab to return to after signing in again.
    last_tab: ScreenId,
    login: LoginScreen,
    screens: HashMap<Resource, CrudScreen>,
    user: Option<UserSession>,
    running: bool,
    help_visible: bool,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Cancels the session bridge on shutdown.
    session_cancel: CancellationToken,
    /// Cancels the store bridges of the current login.
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(session: Arc<Session>, profile_name: String, username: Option<String>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let client = Arc::clone(session.client());
        let screens = Resource::iter()
            .map(|resource| {
                let store = ResourceDataStore::new(Arc::clone(&client), resource.endpoint());
                (resource, CrudScreen::new(resource, store))
            })
            .collect();

        let user = session.user();
        let active_screen = if user.is_some() {
            ScreenId::default()
        } else {
            ScreenId::Login
        };
        let username = user
            .as_ref()
            .map(|u| u.username.clone())
            .or(username);

        Self {
            login: LoginScreen::new(Arc::clone(&session), username),
            session,
            profile_name,
            active_screen,
            last_tab: ScreenId::default(),
            screens,
            user,
            running: true,
            help_visible: false,
            pending_confirm: None,
            notification: None,
            action_tx,
            action_rx,
            session_cancel: CancellationToken::new(),
            data_cancel: CancellationToken::new(),
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        self.login.init(self.action_tx.clone())?;
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        Ok(())
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        data_bridge::spawn_session_bridge(
            &self.session,
            self.action_tx.clone(),
            self.session_cancel.clone(),
        );
        if self.user.is_some() {
            self.start_data();
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        self.session_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Data lifecycle ──────────────────────────────────────────────

    /// Bridge every store to the UI and load page 1 of each.
    fn start_data(&mut self) {
        self.data_cancel.cancel();
        self.data_cancel = CancellationToken::new();

        for (&resource, screen) in &self.screens {
            let store = screen.store().clone();
            tokio::spawn(data_bridge::bridge_store(
                resource,
                store.clone(),
                self.action_tx.clone(),
                self.data_cancel.clone(),
            ));
            tokio::spawn(async move { store.fetch_page(1).await });
        }
        debug!(stores = self.screens.len(), "store bridges started");
    }

    fn stop_data(&mut self) {
        self.data_cancel.cancel();
        debug!("store bridges stopped");
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let active = self.active_screen;
        let captures = match active {
            ScreenId::Login => self.login.captures_input(),
            ScreenId::Crud(resource) => self
                .screens
                .get(&resource)
                .is_some_and(CrudScreen::captures_input),
        };

        if !captures {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                KeyCode::Char('L') => {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::Logout)));
                }
                KeyCode::Tab => return Ok(Some(Action::SwitchScreen(active.next()))),
                KeyCode::BackTab => return Ok(Some(Action::SwitchScreen(active.prev()))),
                KeyCode::Char(c @ '1'..='9') => {
                    let n = c.to_digit(10).and_then(|d| usize::try_from(d).ok());
                    if let Some(target) = n.and_then(ScreenId::from_number) {
                        return Ok(Some(Action::SwitchScreen(target)));
                    }
                }
                _ => {}
            }
        }

        match active {
            ScreenId::Login => self.login.handle_key_event(key),
            ScreenId::Crud(resource) => match self.screens.get_mut(&resource) {
                Some(screen) => screen.handle_key_event(key),
                None => Ok(None),
            },
        }
    }

    // ── Dispatch ────────────────────────────────────────────────────

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render => {}
            Action::Resize(w, h) => debug!(width = w, height = h, "terminal resized"),

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_TTL)
                {
                    self.notification = None;
                }
                match self.active_screen {
                    ScreenId::Login => {
                        self.login.update(action)?;
                    }
                    ScreenId::Crud(resource) => {
                        if let Some(screen) = self.screens.get_mut(&resource) {
                            screen.update(action)?;
                        }
                    }
                }
            }

            Action::SwitchScreen(target) => {
                if self.user.is_some() && *target != ScreenId::Login {
                    self.active_screen = *target;
                    self.last_tab = *target;
                }
            }

            Action::LoginFinished(_) => {
                self.login.update(action)?;
            }

            Action::SessionChanged(user) => self.apply_session(user.clone()),

            Action::StoreUpdated(resource, _)
            | Action::SubmitFinished(resource, _)
            | Action::RemoveFinished(resource, _) => {
                let follow_up = match self.screens.get_mut(resource) {
                    Some(screen) => screen.update(action)?,
                    None => None,
                };
                if let Some(follow_up) = follow_up {
                    self.action_tx.send(follow_up)?;
                }
            }

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),
            Action::ConfirmYes => match self.pending_confirm.take() {
                Some(ConfirmAction::DeleteRecord { resource, id, .. }) => {
                    if let Some(screen) = self.screens.get(&resource) {
                        screen.start_removal(id);
                    }
                }
                Some(ConfirmAction::Logout) => self.session.logout(),
                None => {}
            },
            Action::ConfirmNo => self.pending_confirm = None,

            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }
        }
        Ok(())
    }

    fn apply_session(&mut self, user: Option<UserSession>) {
        let was_signed_in = self.user.is_some();
        self.user.clone_from(&user);
        match user {
            Some(user) if !was_signed_in => {
                info!(username = %user.username, "session started");
                self.active_screen = self.last_tab;
                self.notification = Some((
                    Notification::success(format!("Welcome, {}", user.name)),
                    Instant::now(),
                ));
                self.start_data();
            }
            Some(_) => {}
            None => {
                info!("session ended");
                self.stop_data();
                self.pending_confirm = None;
                self.help_visible = false;
                self.login.reset();
                self.active_screen = ScreenId::Login;
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if self.active_screen == ScreenId::Login {
            self.login.render(frame, area);
        } else {
            let [content, tab_bar, status_bar] = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

            if let ScreenId::Crud(resource) = self.active_screen {
                if let Some(screen) = self.screens.get(&resource) {
                    screen.render(frame, content);
                }
            }
            self.render_tab_bar(frame, tab_bar);
            self.render_status_bar(frame, status_bar);
        }

        if let Some((ref notif, _)) = self.notification {
            overlay::render_notification(frame, area, notif);
        }
        if let Some(ref confirm) = self.pending_confirm {
            overlay::render_confirm(frame, area, confirm);
        }
        if self.help_visible {
            overlay::render_help(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::tabs()
            .map(|id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let n = id.number().unwrap_or_default();
                Line::from(Span::styled(format!(" {n} {} ", id.label()), style))
            })
            .collect();

        let selected = ScreenId::tabs()
            .position(|s| s == self.active_screen)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(selected);

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let who = match self.user {
            Some(ref user) => Span::styled(
                format!("\u{25CF} {} ({})", user.name, user.role),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            None => Span::styled("\u{25CB} signed out", Style::default().fg(theme::ERROR_RED)),
        };
        let line = Line::from(vec![
            Span::raw(" "),
            who,
            Span::styled(format!(" \u{2502} {}", self.profile_name), theme::key_hint()),
            Span::styled(" \u{2502} ? help  L log out  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}
