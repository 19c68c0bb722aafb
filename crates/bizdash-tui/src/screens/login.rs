//! Sign-in form shown whenever there is no authenticated session.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use secrecy::SecretString;
use tokio::sync::mpsc::UnboundedSender;

use bizdash_core::Session;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Username,
    Password,
}

pub struct LoginScreen {
    session: Arc<Session>,
    action_tx: Option<UnboundedSender<Action>>,
    username: String,
    password: String,
    focus: Focus,
    show_password: bool,
    submitting: bool,
    error: Option<String>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl LoginScreen {
    pub fn new(session: Arc<Session>, username: Option<String>) -> Self {
        let focus = if username.is_some() {
            Focus::Password
        } else {
            Focus::Username
        };
        Self {
            session,
            action_tx: None,
            username: username.unwrap_or_default(),
            password: String::new(),
            focus,
            show_password: false,
            submitting: false,
            error: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    /// Forget the typed password, e.g. after a logout.
    pub fn reset(&mut self) {
        self.password.clear();
        self.submitting = false;
        self.focus = if self.username.is_empty() {
            Focus::Username
        } else {
            Focus::Password
        };
    }

    fn active_value(&mut self) -> &mut String {
        match self.focus {
            Focus::Username => &mut self.username,
            Focus::Password => &mut self.password,
        }
    }

    fn submit(&mut self) {
        let username = self.username.trim().to_owned();
        if username.is_empty() {
            self.error = Some("Please enter your username".into());
            self.focus = Focus::Username;
            return;
        }
        if self.password.is_empty() {
            self.error = Some("Please enter your password".into());
            self.focus = Focus::Password;
            return;
        }
        let Some(tx) = self.action_tx.clone() else {
            return;
        };

        self.error = None;
        self.submitting = true;
        let session = Arc::clone(&self.session);
        let password = SecretString::from(self.password.clone());
        tokio::spawn(async move {
            let outcome = session.login(&username, &password).await;
            let _ = tx.send(Action::LoginFinished(outcome));
        });
    }

    fn render_input_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        focus: Focus,
        masked: bool,
    ) {
        if area.height < 4 {
            return;
        }
        let active = self.focus == focus;
        let value = match focus {
            Focus::Username => &self.username,
            Focus::Password => &self.password,
        };

        let label_style = if active {
            Style::default().fg(theme::ACCENT_SOFT)
        } else {
            Style::default().fg(theme::TEXT)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let display = if masked {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.clone()
        };
        let border_color = if active {
            theme::ACCENT
        } else {
            theme::BORDER_GRAY
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));
        let block_area = Rect::new(area.x, area.y + 1, area.width, 3);
        let inner = block.inner(block_area);
        frame.render_widget(block, block_area);

        let text = if active && !self.submitting {
            format!("{display}\u{2588}")
        } else {
            display
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::TEXT))),
            inner,
        );
    }
}

impl Component for LoginScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            return Ok(None);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('r') {
                self.show_password = !self.show_password;
            }
            return Ok(None);
        }
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    Focus::Username => Focus::Password,
                    Focus::Password => Focus::Username,
                };
            }
            KeyCode::Enter => match self.focus {
                Focus::Username if self.password.is_empty() => self.focus = Focus::Password,
                _ => self.submit(),
            },
            KeyCode::Esc => return Ok(Some(Action::Quit)),
            KeyCode::Backspace => {
                self.active_value().pop();
            }
            KeyCode::Char(c) => {
                self.active_value().push(c);
                self.error = None;
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoginFinished(outcome) => {
                self.submitting = false;
                if outcome.success {
                    self.password.clear();
                    self.error = None;
                } else {
                    self.error = Some(
                        outcome
                            .error
                            .clone()
                            .unwrap_or_else(|| "Login failed".into()),
                    );
                }
            }
            Action::Tick => {
                if self.submitting {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            area,
        );

        let panel = centered_rect(area, 52, 18);
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("bizdash", theme::title_style()),
                Span::styled(" \u{00B7} sign in ", theme::key_hint()),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let [_, username_area, password_area, status_area, _, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner.inner(ratatui::layout::Margin::new(2, 0)));

        self.render_input_field(frame, username_area, "Username", Focus::Username, false);
        self.render_input_field(
            frame,
            password_area,
            "Password",
            Focus::Password,
            !self.show_password,
        );

        if self.submitting {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Signing in...")
                .style(Style::default().fg(theme::TEXT_DIM))
                .throbber_style(Style::default().fg(theme::ACCENT));
            frame.render_stateful_widget(throbber, status_area, &mut self.throbber_state.clone());
        } else if let Some(ref err) = self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(err.as_str(), Style::default().fg(theme::ERROR_RED)))
                    .alignment(Alignment::Center),
                status_area,
            );
        }

        let hints = Line::from(vec![
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("switch  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("sign in  ", theme::key_hint()),
            Span::styled("Ctrl+R ", theme::key_hint_key()),
            Span::styled("reveal  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(
            Paragraph::new(hints).alignment(Alignment::Center),
            hints_area,
        );
    }

    fn captures_input(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use bizdash_api::ApiClient;
    use bizdash_core::{LoginOutcome, MemoryVault};
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;

    fn screen(username: Option<&str>) -> LoginScreen {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api").unwrap(),
            Duration::from_secs(1),
        );
        let session = Session::new(Arc::new(client), Arc::new(MemoryVault::default()));
        LoginScreen::new(Arc::new(session), username.map(str::to_owned))
    }

    fn press(screen: &mut LoginScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn prefilled_username_focuses_password() {
        let s = screen(Some("admin"));
        assert_eq!(s.focus, Focus::Password);
        assert_eq!(s.username, "admin");
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut s = screen(None);
        for c in "admin".chars() {
            press(&mut s, KeyCode::Char(c));
        }
        press(&mut s, KeyCode::Tab);
        for c in "admin123".chars() {
            press(&mut s, KeyCode::Char(c));
        }
        press(&mut s, KeyCode::Backspace);
        assert_eq!(s.username, "admin");
        assert_eq!(s.password, "admin12");
    }

    #[test]
    fn enter_on_username_moves_to_password() {
        let mut s = screen(None);
        for c in "admin".chars() {
            press(&mut s, KeyCode::Char(c));
        }
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.focus, Focus::Password);
        assert!(!s.submitting);
    }

    #[test]
    fn empty_password_is_rejected_locally() {
        let mut s = screen(Some("admin"));
        press(&mut s, KeyCode::Enter);
        assert!(!s.submitting);
        assert_eq!(s.error.as_deref(), Some("Please enter your password"));
    }

    #[test]
    fn failed_login_shows_error() {
        let mut s = screen(Some("admin"));
        s.submitting = true;
        s.update(&Action::LoginFinished(LoginOutcome {
            success: false,
            error: Some("Invalid credentials".into()),
        }))
        .unwrap();
        assert!(!s.submitting);
        assert_eq!(s.error.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn escape_quits() {
        let mut s = screen(None);
        assert!(matches!(press(&mut s, KeyCode::Esc), Some(Action::Quit)));
    }
}
