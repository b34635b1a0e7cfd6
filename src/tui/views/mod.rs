pub mod campaign_detail;
pub mod campaign_wizard;
pub mod campaigns;
pub mod login;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::events::NotificationLevel;
use super::theme;
use super::widgets::InputBuffer;

/// Width of the label column in single-line forms.
pub(super) const LABEL_WIDTH: u16 = 20;

/// Draw a labelled single-line input with a message row below it.
///
/// `area` should be two rows high. The terminal cursor is placed in the
/// buffer when `focused`.
pub(super) fn render_form_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    buffer: &InputBuffer,
    focused: bool,
    message: Option<(String, Style)>,
) {
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);
    let cols = Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Min(1)]).split(rows[0]);

    let marker = if focused { "▸ " } else { "  " };
    let label_style = if focused {
        theme::highlight()
    } else {
        theme::muted()
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(label.to_string(), label_style),
        ])),
        cols[0],
    );

    let value_style = if focused {
        Style::default()
            .fg(theme::TEXT)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(theme::TEXT)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(buffer.display(), value_style)),
        cols[1],
    );

    if focused {
        let before_cursor = buffer.text()[..buffer.cursor_position()].chars().count() as u16;
        let x = (cols[1].x + before_cursor).min(cols[1].right().saturating_sub(1));
        frame.set_cursor_position((x, cols[1].y));
    }

    if let Some((text, style)) = message {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(" ".repeat(LABEL_WIDTH as usize)),
                Span::styled(text, style),
            ])),
            rows[1],
        );
    }
}

/// Key hint line in the `key:desc` style of the status bar.
pub(super) fn hint_line(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (key, desc) in hints {
        spans.push(Span::styled(*key, theme::key_hint()));
        spans.push(Span::raw(format!(":{desc} ")));
    }
    Line::from(spans)
}

/// Foreground for an inline status message.
pub(super) fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Info => theme::INFO,
        NotificationLevel::Success => theme::SUCCESS,
        NotificationLevel::Warning => theme::WARNING,
        NotificationLevel::Error => theme::ERROR,
    }
}
