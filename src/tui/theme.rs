//! OneHand colors and shared styles.
//!
//! Views take every color from here instead of inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

/// Brand teal: focused borders and headings.
pub const PRIMARY: Color = Color::Rgb(0x00, 0x80, 0x80);
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x00, 0x96, 0x88);
/// Coral: selection and calls to action.
pub const ACCENT: Color = Color::Rgb(0xFF, 0x7F, 0x50);
/// Terminal-dark background used behind badges.
pub const BG_BASE: Color = Color::Rgb(0x0A, 0x19, 0x19);

pub const TEXT: Color = Color::Rgb(0xE0, 0xE0, 0xE0);
pub const TEXT_MUTED: Color = Color::Rgb(0x80, 0x80, 0x80);
pub const TEXT_DIM: Color = Color::Rgb(0x50, 0x50, 0x50);

pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

/// Funded part of a campaign progress bar.
pub const PROGRESS_FILL: Color = SUCCESS;
pub const PROGRESS_EMPTY: Color = TEXT_DIM;

/// Listing title.
pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn heading() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Selected campaign, focused field label.
pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key in a `key:desc` hint.
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Shown in the status bar while a session token is present.
pub fn session_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(PRIMARY_LIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Inline validation message under a field.
pub fn field_error() -> Style {
    Style::default().fg(ERROR)
}

/// Border for the field with input focus, or the default border.
pub fn field_border(focused: bool) -> Style {
    if focused {
        border_focused()
    } else {
        border_default()
    }
}

pub fn block_focused(title: &str) -> Block<'_> {
    titled_block(title).border_style(border_focused())
}

pub fn block_default(title: &str) -> Block<'_> {
    titled_block(title).border_style(border_default())
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors_are_distinct() {
        let colors = [ERROR, SUCCESS, WARNING, INFO];
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_style_helpers_return_non_default() {
        assert_ne!(title(), Style::default());
        assert_ne!(heading(), Style::default());
        assert_ne!(highlight(), Style::default());
        assert_ne!(muted(), Style::default());
        assert_ne!(field_error(), Style::default());
    }

    #[test]
    fn test_field_border_tracks_focus() {
        assert_eq!(field_border(true), border_focused());
        assert_eq!(field_border(false), border_default());
    }
}
