//! Overlays drawn on top of the active screen: help, confirm, toast.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use bizdash_core::NoticeLevel;

use crate::action::{ConfirmAction, Notification};
use crate::theme;

use super::centered_rect;

fn backdrop(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        area,
    );
}

fn key_line(entries: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(entries.len() * 2);
    for (key, what) in entries {
        spans.push(Span::styled(format!("  {key:<10}"), theme::key_hint_key()));
        spans.push(Span::styled(format!("{what:<20}"), theme::key_hint()));
    }
    Line::from(spans)
}

fn section(title: &'static str) -> [Line<'static>; 2] {
    [
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::ACCENT_SOFT),
        )),
        Line::from(Span::styled(
            format!("  {}", "\u{2500}".repeat(title.len())),
            theme::key_hint(),
        )),
    ]
}

/// Keyboard reference, centered.
pub fn render_help(frame: &mut Frame, area: Rect) {
    let help_area = centered_rect(
        area,
        66.min(area.width.saturating_sub(4)),
        24.min(area.height.saturating_sub(2)),
    );
    backdrop(frame, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let mut text = vec![Line::from("")];
    text.extend(section("Navigation"));
    text.push(key_line(&[("1-5", "Jump to screen"), ("Tab", "Next screen")]));
    text.push(key_line(&[("j/k \u{2191}/\u{2193}", "Move up/down"), ("g/G", "Top / bottom")]));
    text.push(key_line(&[("[ / ]", "Previous / next page"), ("Esc", "Back / close")]));
    text.push(Line::from(""));
    text.extend(section("Records"));
    text.push(key_line(&[("n", "New record"), ("e Enter", "Edit selected")]));
    text.push(key_line(&[("d", "Delete selected"), ("/", "Search")]));
    text.push(key_line(&[("r", "Re-filter page"), ("R", "Reload from server")]));
    text.push(Line::from(""));
    text.extend(section("Form"));
    text.push(key_line(&[("Tab", "Next field"), ("\u{25C2}/\u{25B8}", "Change choice")]));
    text.push(key_line(&[("Enter", "Save"), ("Esc", "Cancel")]));
    text.push(Line::from(""));
    text.extend(section("Global"));
    text.push(key_line(&[("?", "This help"), ("L", "Log out")]));
    text.push(key_line(&[("q", "Quit"), ("Ctrl+C", "Quit")]));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "                         Esc or ? to close",
        theme::key_hint(),
    )));

    frame.render_widget(Paragraph::new(text), inner);
}

/// Centered yes/no dialog.
pub fn render_confirm(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered_rect(area, 50.min(area.width.saturating_sub(4)), 5);
    backdrop(frame, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::WARNING_AMBER));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::TEXT),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
pub fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len
        .saturating_add(6)
        .clamp(20, 60)
        .min(area.width);
    let height = 3u16.min(area.height);

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NoticeLevel::Success => (theme::SUCCESS_GREEN, "\u{2713}"),
        NoticeLevel::Error => (theme::ERROR_RED, "\u{2717}"),
    };

    backdrop(frame, toast_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::TEXT)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
