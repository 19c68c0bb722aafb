//! Generic record form: one input per `FieldDescriptor`, drawn by switching
//! on its `Widget`. Select fields cycle with ←/→; other fields take text.

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use bizdash_core::{FieldDescriptor, FieldErrors, FormDraft, Widget};

use crate::theme;

use super::centered_rect;

/// Rows per field: label, three-line box, error line.
const FIELD_HEIGHT: u16 = 5;

/// Apply one key press to a field's raw value. Returns whether the key
/// was consumed.
pub fn edit_value(field: &FieldDescriptor, value: &mut String, code: KeyCode) -> bool {
    match (&field.widget, code) {
        (Widget::Select { options }, KeyCode::Left | KeyCode::Right) => {
            if options.is_empty() {
                return true;
            }
            let len = options.len();
            let current = options.iter().position(|o| o.value == *value);
            let next = match (current, code) {
                (None, KeyCode::Left) => len - 1,
                (None, _) => 0,
                (Some(i), KeyCode::Left) => (i + len - 1) % len,
                (Some(i), _) => (i + 1) % len,
            };
            value.clone_from(&options[next].value);
            true
        }
        (Widget::Select { .. }, KeyCode::Backspace) => {
            value.clear();
            true
        }
        (Widget::Select { .. }, _) => false,
        (_, KeyCode::Backspace) => {
            value.pop();
            true
        }
        (Widget::Number { .. }, KeyCode::Char(c)) => {
            if c.is_ascii_digit() || matches!(c, '.' | '-') {
                value.push(c);
            }
            true
        }
        (Widget::Date, KeyCode::Char(c)) => {
            if (c.is_ascii_digit() || c == '-') && value.len() < 10 {
                value.push(c);
            }
            true
        }
        (_, KeyCode::Char(c)) => {
            value.push(c);
            true
        }
        _ => false,
    }
}

/// Everything the form needs to draw itself.
pub struct FormView<'a> {
    pub title: &'a str,
    pub fields: &'a [FieldDescriptor],
    pub draft: &'a FormDraft,
    pub errors: &'a FieldErrors,
    pub focus: usize,
    pub submitting: bool,
}

/// Draw the form as a centered modal over `area`.
pub fn render_form(frame: &mut Frame, area: Rect, view: &FormView<'_>) {
    let wanted = u16::try_from(view.fields.len())
        .unwrap_or(u16::MAX)
        .saturating_mul(FIELD_HEIGHT)
        .saturating_add(4);
    let modal = centered_rect(area, 64, wanted);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        modal,
    );
    let block = Block::default()
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled(view.title, theme::title_style()),
            Span::raw(" "),
        ]))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    if inner.height < 2 {
        return;
    }
    let hints_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
    let body = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height - 1);

    // Scroll so the focused field stays visible.
    let per_page = usize::from((body.height / FIELD_HEIGHT).max(1));
    let first = view.focus.saturating_sub(per_page - 1);

    let mut y = body.y;
    for (index, field) in view.fields.iter().enumerate().skip(first).take(per_page) {
        let slot = Rect::new(body.x, y, body.width, FIELD_HEIGHT);
        render_field(
            frame,
            slot,
            field,
            view.draft.get(&field.name),
            view.errors.get(&field.name).map(String::as_str),
            index == view.focus,
        );
        y += FIELD_HEIGHT;
    }

    let hints = if view.submitting {
        "Saving\u{2026}"
    } else {
        "Tab next  \u{25C2}/\u{25B8} choose  Enter save  Esc cancel"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, theme::key_hint())).alignment(Alignment::Center),
        hints_area,
    );
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    field: &FieldDescriptor,
    value: &str,
    error: Option<&str>,
    active: bool,
) {
    let label_style = if active {
        Style::default().fg(theme::ACCENT_SOFT)
    } else {
        Style::default().fg(theme::TEXT)
    };
    let mut label = vec![Span::styled(field.label.as_str(), label_style)];
    if field.is_required() {
        label.push(Span::styled(" *", Style::default().fg(theme::ERROR_RED)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(label)),
        Rect::new(area.x, area.y, area.width, 1),
    );

    let border_color = match (error.is_some(), active) {
        (true, _) => theme::ERROR_RED,
        (false, true) => theme::ACCENT,
        (false, false) => theme::BORDER_GRAY,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));
    let box_area = Rect::new(area.x, area.y + 1, area.width, 3);
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    frame.render_widget(Paragraph::new(input_line(field, value, active)).wrap(Wrap { trim: false }), inner);

    if let Some(message) = error {
        frame.render_widget(
            Paragraph::new(Span::styled(message, theme::field_error())),
            Rect::new(area.x, area.y + 4, area.width, 1),
        );
    }
}

fn input_line<'a>(field: &'a FieldDescriptor, value: &'a str, active: bool) -> Line<'a> {
    let text_style = Style::default().fg(theme::TEXT);
    match &field.widget {
        Widget::Select { options } => {
            let arrow_style = if active {
                Style::default().fg(theme::ACCENT)
            } else {
                Style::default().fg(theme::BORDER_GRAY)
            };
            let shown = options
                .iter()
                .find(|o| o.value == value)
                .map_or("(choose)", |o| o.label.as_str());
            let value_style = if active {
                text_style.add_modifier(Modifier::BOLD)
            } else {
                text_style
            };
            Line::from(vec![
                Span::styled("\u{25C2} ", arrow_style),
                Span::styled(shown, value_style),
                Span::styled(" \u{25B8}", arrow_style),
            ])
        }
        widget => {
            let mut spans = Vec::new();
            if value.is_empty() && !active {
                let placeholder = match widget {
                    Widget::Date => "YYYY-MM-DD",
                    Widget::Email => "name@company.com",
                    _ => "",
                };
                spans.push(Span::styled(placeholder, theme::key_hint()));
            } else {
                spans.push(Span::styled(value, text_style));
            }
            if active {
                spans.push(Span::styled("\u{2588}", Style::default().fg(theme::ACCENT_SOFT)));
            }
            Line::from(spans)
        }
    }
}
