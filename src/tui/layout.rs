//! Root layout computation for view tabs + main content + status bar.

use ratatui::layout::{Constraint, Layout, Rect};

/// Hide the tab row below this terminal height.
pub const HIDE_TABS_THRESHOLD: u16 = 10;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// View tab row (None if hidden).
    pub tabs: Option<Rect>,
    /// Main content area.
    pub main: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

impl AppLayout {
    pub fn compute(area: Rect) -> Self {
        if area.height < HIDE_TABS_THRESHOLD {
            let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
            return AppLayout {
                tabs: None,
                main: rows[0],
                status: rows[1],
            };
        }

        let rows = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        AppLayout {
            tabs: Some(rows[0]),
            main: rows[1],
            status: rows[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_layout() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = AppLayout::compute(area);
        assert_eq!(layout.tabs.unwrap().height, 1);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.main.height, 38);
    }

    #[test]
    fn test_tabs_hidden_when_short() {
        let area = Rect::new(0, 0, 80, 6);
        let layout = AppLayout::compute(area);
        assert!(layout.tabs.is_none());
        assert_eq!(layout.main.height + layout.status.height, area.height);
    }

    #[test]
    fn test_main_fills_width() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = AppLayout::compute(area);
        assert_eq!(layout.main.width, area.width);
    }
}
