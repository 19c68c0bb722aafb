//! Table screen for one collection, driven by a `CrudPresenter`.
//!
//! Browse mode moves the selection and pages. `/` enters search mode,
//! which filters the loaded page as you type. `n` and `e` open the form
//! modal; `d` asks the app for a delete confirmation.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use bizdash_core::{CrudPresenter, Record, RecordId, Resource, ResourceDataStore};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::form::{self, FormView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    /// Form modal open; index of the focused field.
    Form(usize),
}

pub struct CrudScreen {
    resource: Resource,
    presenter: CrudPresenter,
    action_tx: Option<UnboundedSender<Action>>,
    table_state: TableState,
    mode: Mode,
    submitting: bool,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl CrudScreen {
    pub fn new(resource: Resource, store: ResourceDataStore) -> Self {
        Self {
            resource,
            presenter: CrudPresenter::for_resource(store, resource),
            action_tx: None,
            table_state: TableState::default().with_selected(Some(0)),
            mode: Mode::Browse,
            submitting: false,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    pub fn store(&self) -> &ResourceDataStore {
        self.presenter.store()
    }

    // ── Background work ─────────────────────────────────────────────

    fn spawn_fetch(&self, page: u32) {
        let store = self.presenter.store().clone();
        tokio::spawn(async move { store.fetch_page(page).await });
    }

    fn spawn_submit(&mut self) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let resource = self.resource;
        let submission = self.presenter.submission();
        let values = self.presenter.draft_values();
        self.submitting = true;
        debug!(%resource, mode = ?submission.mode(), "submitting record");
        tokio::spawn(async move {
            let outcome = submission.run(&values).await;
            let _ = tx.send(Action::SubmitFinished(resource, outcome));
        });
    }

    /// Delete `id` in the background. Called once the user confirmed.
    pub fn start_removal(&self, id: RecordId) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let resource = self.resource;
        let removal = self.presenter.removal(id);
        tokio::spawn(async move {
            let outcome = removal.run().await;
            let _ = tx.send(Action::RemoveFinished(resource, outcome));
        });
    }

    // ── Selection ───────────────────────────────────────────────────

    fn selected_record(&self) -> Option<Arc<Record>> {
        let rows = self.presenter.visible_rows();
        self.table_state
            .selected()
            .and_then(|i| rows.get(i).cloned())
    }

    fn select(&mut self, idx: usize) {
        let len = self.presenter.visible_rows().len();
        let clamped = if len == 0 { 0 } else { idx.min(len - 1) };
        self.table_state.select(Some(clamped));
    }

    fn move_selection(&mut self, delta: isize) {
        let current = self.table_state.selected().unwrap_or(0);
        self.select(current.saturating_add_signed(delta));
    }

    fn step_page(&mut self, forward: bool) {
        let paging = self.presenter.paging();
        let current = paging.current();
        let target = if forward {
            if current >= paging.page_count() {
                return;
            }
            current + 1
        } else {
            if current <= 1 {
                return;
            }
            current - 1
        };
        let target = u32::try_from(target).unwrap_or(u32::MAX);
        if let Some(page) = self.presenter.request_page(target) {
            self.spawn_fetch(page);
        }
        self.select(0);
    }

    // ── Key handling per mode ───────────────────────────────────────

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.select(0),
            KeyCode::Char('G') | KeyCode::End => self.select(usize::MAX),
            KeyCode::Char('[') | KeyCode::PageUp => self.step_page(false),
            KeyCode::Char(']') | KeyCode::PageDown => self.step_page(true),
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Esc if !self.presenter.search().is_empty() => {
                self.presenter.refresh_view();
                self.select(0);
            }
            KeyCode::Char('r') => {
                self.presenter.refresh_view();
                self.select(0);
            }
            KeyCode::Char('R') => self.spawn_fetch(1),
            KeyCode::Char('n') => {
                self.presenter.open_create();
                self.mode = Mode::Form(0);
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(record) = self.selected_record() {
                    self.presenter.open_edit(record);
                    self.mode = Mode::Form(0);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let record = self.selected_record()?;
                let Some(id) = record.id() else {
                    return Some(Action::Notify(Notification::error(
                        "This record has no id and cannot be deleted",
                    )));
                };
                let name = self
                    .resource
                    .columns()
                    .first()
                    .map_or_else(|| id.to_string(), |c| record.display_value(c.field));
                return Some(Action::ShowConfirm(ConfirmAction::DeleteRecord {
                    resource: self.resource,
                    id,
                    name,
                }));
            }
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.presenter.refresh_view();
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => self.mode = Mode::Browse,
            KeyCode::Backspace => {
                let mut text = self.presenter.search().to_owned();
                text.pop();
                self.presenter.set_search(text);
            }
            KeyCode::Char(c) => {
                let text = format!("{}{c}", self.presenter.search());
                self.presenter.set_search(text);
            }
            _ => return,
        }
        self.select(0);
    }

    fn handle_form_key(&mut self, key: KeyEvent, focus: usize) {
        if self.submitting {
            return;
        }
        let len = self.presenter.fields().len();
        match key.code {
            KeyCode::Esc => {
                self.presenter.close_modal();
                self.mode = Mode::Browse;
            }
            KeyCode::Tab | KeyCode::Down => self.mode = Mode::Form((focus + 1) % len.max(1)),
            KeyCode::BackTab | KeyCode::Up => {
                self.mode = Mode::Form((focus + len.max(1) - 1) % len.max(1));
            }
            KeyCode::Enter => {
                if self.presenter.validate() {
                    self.spawn_submit();
                } else if let Some(first) = self.presenter.field_errors().keys().next() {
                    // Jump to the first invalid field
                    let idx = self
                        .presenter
                        .fields()
                        .iter()
                        .position(|f| &f.name == first)
                        .unwrap_or(focus);
                    self.mode = Mode::Form(idx);
                }
            }
            code => {
                let Some(field) = self.presenter.fields().get(focus).cloned() else {
                    return;
                };
                if let Some(value) = self.presenter.draft_mut().value_mut(&field.name) {
                    form::edit_value(&field, value, code);
                }
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render_search_line(&self, frame: &mut Frame, area: Rect) {
        let line = if self.mode == Mode::Search {
            Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::ACCENT)),
                Span::styled(self.presenter.search(), Style::default().fg(theme::TEXT)),
                Span::styled("\u{2588}", Style::default().fg(theme::ACCENT_SOFT)),
                Span::styled("  Enter keep  Esc clear", theme::key_hint()),
            ])
        } else if self.presenter.search().is_empty() {
            Line::from(Span::styled(" / search", theme::key_hint()))
        } else {
            Line::from(vec![
                Span::styled(" filter: ", theme::key_hint()),
                Span::styled(self.presenter.search(), Style::default().fg(theme::ACCENT_SOFT)),
                Span::styled("  (Esc to clear)", theme::key_hint()),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let columns = self.resource.columns();
        let rows = self.presenter.visible_rows();

        let mut header_cells = vec![Cell::from("  ID")];
        header_cells.extend(columns.iter().map(|c| Cell::from(c.title)));
        let header = Row::new(header_cells).style(theme::table_header());

        let selected = self.table_state.selected().unwrap_or(0);
        let table_rows: Vec<Row> = rows
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let is_selected = i == selected;
                let prefix = if is_selected { "\u{25B8} " } else { "  " };
                let id = record.id().as_ref().map(ToString::to_string).unwrap_or_default();
                let mut cells = vec![Cell::from(format!("{prefix}{id}"))];
                cells.extend(
                    columns
                        .iter()
                        .map(|c| Cell::from(record.display_value(c.field))),
                );
                let style = if is_selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                Row::new(cells).style(style)
            })
            .collect();

        let mut widths = vec![Constraint::Length(7)];
        widths.extend(columns.iter().map(|_| Constraint::Fill(1)));

        let table = Table::new(table_rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let [status_area, hints_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

        let paging = self.presenter.paging();
        let snapshot = self.presenter.snapshot();
        let page_text = format!(
            " Page {}/{}  \u{00B7}  {} records",
            paging.current(),
            paging.page_count(),
            snapshot.pagination.count,
        );

        if snapshot.loading || self.submitting {
            let [left, right] =
                Layout::horizontal([Constraint::Min(0), Constraint::Length(16)]).areas(status_area);
            frame.render_widget(
                Paragraph::new(Span::styled(page_text, theme::key_hint())),
                left,
            );
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(if self.submitting { "Saving" } else { "Loading" })
                .style(Style::default().fg(theme::TEXT_DIM))
                .throbber_style(Style::default().fg(theme::ACCENT));
            frame.render_stateful_widget(throbber, right, &mut self.throbber_state.clone());
        } else {
            frame.render_widget(
                Paragraph::new(Span::styled(page_text, theme::key_hint())),
                status_area,
            );
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("new  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("edit  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("[ ] ", theme::key_hint_key()),
            Span::styled("page  ", theme::key_hint()),
            Span::styled("R ", theme::key_hint_key()),
            Span::styled("reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);
    }
}

impl Component for CrudScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(None);
        }
        let action = match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Search => {
                self.handle_search_key(key);
                None
            }
            Mode::Form(focus) => {
                self.handle_form_key(key, focus);
                None
            }
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StoreUpdated(resource, snapshot) if *resource == self.resource => {
                debug!(
                    %resource,
                    page = snapshot.current_page,
                    records = snapshot.records.len(),
                    "store updated"
                );
                let current = self.table_state.selected().unwrap_or(0);
                self.select(current);
            }
            Action::SubmitFinished(resource, outcome) if *resource == self.resource => {
                self.submitting = false;
                self.presenter.apply_submit(outcome);
                if !self.presenter.modal().is_open() {
                    self.mode = Mode::Browse;
                }
                return Ok(Some(Action::Notify(outcome.notice.clone().into())));
            }
            Action::RemoveFinished(resource, outcome) if *resource == self.resource => {
                return Ok(Some(Action::Notify(outcome.notice.clone().into())));
            }
            Action::Tick => {
                if self.submitting || self.presenter.loading() {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let count = self.presenter.snapshot().pagination.count;
        let block = Block::default()
            .title(format!(" {} ({count}) ", self.resource.label()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [search_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .areas(inner);

        self.render_search_line(frame, search_area);
        self.render_table(frame, table_area);
        self.render_footer(frame, footer_area);

        if let Mode::Form(focus) = self.mode {
            let title = self.presenter.modal_title();
            form::render_form(
                frame,
                area,
                &FormView {
                    title: &title,
                    fields: self.presenter.fields(),
                    draft: self.presenter.draft(),
                    errors: self.presenter.field_errors(),
                    focus,
                    submitting: self.submitting,
                },
            );
        }
    }

    fn captures_input(&self) -> bool {
        self.mode != Mode::Browse
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bizdash_api::ApiClient;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
    use url::Url;

    use super::*;

    fn screen(resource: Resource) -> CrudScreen {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api").unwrap(),
            Duration::from_secs(1),
        );
        let store = ResourceDataStore::new(Arc::new(client), resource.endpoint());
        CrudScreen::new(resource, store)
    }

    fn press(screen: &mut CrudScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut CrudScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn new_opens_empty_create_form() {
        let mut s = screen(Resource::Employees);
        assert!(!s.captures_input());
        press(&mut s, KeyCode::Char('n'));
        assert!(s.captures_input());
        assert_eq!(s.presenter.modal(), &bizdash_core::ModalState::Create);
        assert_eq!(s.presenter.modal_title(), "Create employee");
        assert_eq!(s.presenter.draft().get("name"), "");
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut s = screen(Resource::Employees);
        press(&mut s, KeyCode::Char('n'));
        type_text(&mut s, "An Nguyen");
        press(&mut s, KeyCode::Tab);
        type_text(&mut s, "an@company.com");
        press(&mut s, KeyCode::Tab);
        press(&mut s, KeyCode::Right);
        press(&mut s, KeyCode::Right);

        let draft = s.presenter.draft();
        assert_eq!(draft.get("name"), "An Nguyen");
        assert_eq!(draft.get("email"), "an@company.com");
        assert_eq!(draft.get("position"), "Senior Developer");
    }

    #[test]
    fn invalid_submit_keeps_form_open_and_focuses_first_error() {
        let mut s = screen(Resource::Employees);
        press(&mut s, KeyCode::Char('n'));
        type_text(&mut s, "An");
        press(&mut s, KeyCode::Tab);
        press(&mut s, KeyCode::Enter);

        assert!(!s.submitting);
        assert!(s.presenter.modal().is_open());
        assert_eq!(s.mode, Mode::Form(1));
        assert_eq!(
            s.presenter.field_errors().get("email").map(String::as_str),
            Some("Please enter email")
        );
    }

    #[test]
    fn escape_closes_the_form() {
        let mut s = screen(Resource::Assets);
        press(&mut s, KeyCode::Char('n'));
        type_text(&mut s, "Desk");
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.mode, Mode::Browse);
        assert!(!s.presenter.modal().is_open());
        assert_eq!(s.presenter.draft().get("name"), "");
    }

    #[test]
    fn search_mode_filters_and_escape_clears() {
        let mut s = screen(Resource::Customers);
        press(&mut s, KeyCode::Char('/'));
        assert!(s.captures_input());
        type_text(&mut s, "abc");
        assert_eq!(s.presenter.search(), "abc");
        press(&mut s, KeyCode::Backspace);
        assert_eq!(s.presenter.search(), "ab");
        press(&mut s, KeyCode::Enter);
        assert!(!s.captures_input());
        assert_eq!(s.presenter.search(), "ab");

        press(&mut s, KeyCode::Char('/'));
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.presenter.search(), "");
    }

    #[test]
    fn delete_without_selection_does_nothing() {
        let mut s = screen(Resource::Projects);
        assert!(press(&mut s, KeyCode::Char('d')).is_none());
        assert!(press(&mut s, KeyCode::Char('e')).is_none());
        assert!(!s.captures_input());
    }

    #[test]
    fn failed_submit_notifies_and_keeps_form() {
        let mut s = screen(Resource::Employees);
        press(&mut s, KeyCode::Char('n'));
        let outcome = bizdash_core::Outcome {
            succeeded: false,
            notice: bizdash_core::Notice::error("Resource not found."),
        };
        let follow_up = s
            .update(&Action::SubmitFinished(Resource::Employees, outcome))
            .unwrap();
        assert!(matches!(
            follow_up,
            Some(Action::Notify(ref n)) if n.message == "Resource not found."
        ));
        assert!(s.presenter.modal().is_open());

        // Results for other resources are ignored
        let other = bizdash_core::Outcome {
            succeeded: true,
            notice: bizdash_core::Notice::success("Created successfully"),
        };
        let ignored = s
            .update(&Action::SubmitFinished(Resource::Assets, other))
            .unwrap();
        assert!(ignored.is_none());
    }

    #[test]
    fn renders_table_header_and_form() {
        let mut s = screen(Resource::Transactions);
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();

        terminal.draw(|f| s.render(f, f.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Finance (0)"), "{text}");
        assert!(text.contains("Description"));
        assert!(text.contains("Page 1/1"));

        press(&mut s, KeyCode::Char('n'));
        press(&mut s, KeyCode::Tab);
        terminal.draw(|f| s.render(f, f.area())).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Create transaction"), "{text}");
        assert!(text.contains("YYYY-MM-DD"));
    }
}
