//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const ACCENT: Color = Color::Rgb(22, 119, 255); // #1677ff
pub const ACCENT_SOFT: Color = Color::Rgb(105, 177, 255); // #69b1ff
pub const SUCCESS_GREEN: Color = Color::Rgb(82, 196, 26); // #52c41a
pub const WARNING_AMBER: Color = Color::Rgb(250, 173, 20); // #faad14
pub const ERROR_RED: Color = Color::Rgb(255, 77, 79); // #ff4d4f

pub const TEXT: Color = Color::Rgb(217, 217, 217); // #d9d9d9
pub const TEXT_DIM: Color = Color::Rgb(140, 140, 140); // #8c8c8c
pub const BORDER_GRAY: Color = Color::Rgb(67, 67, 67); // #434343
pub const BG_HIGHLIGHT: Color = Color::Rgb(17, 29, 44); // #111d2c
pub const BG_DARK: Color = Color::Rgb(20, 20, 20); // #141414

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(ACCENT_SOFT).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(ACCENT_SOFT)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(TEXT)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(ACCENT_SOFT).add_modifier(Modifier::BOLD)
}

/// Inline validation message under a form field.
pub fn field_error() -> Style {
    Style::default().fg(ERROR_RED)
}
