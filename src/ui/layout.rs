//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen layout: the bordered contents list above a one-line status bar.
pub struct AppLayout {
    pub contents_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let [contents_area, status_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .areas(area);

        Self {
            contents_area,
            status_area,
        }
    }

    /// Rows of the contents list that fit inside its border.
    pub fn visible_rows(&self) -> usize {
        self.contents_area.height.saturating_sub(2) as usize
    }
}
