//! Loading indicator — a small spinner + label rendered in the top-right
//! corner of a given area while swatches are being rendered.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::theme::Theme;

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner glyph for a frame counter.
pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()]
}

/// A "N swatches" indicator with a spinning icon.
///
/// Render this on top of the contents area's border.  It picks its own
/// position (top-right of `area`) and draws nothing when `pending` is zero.
pub struct LoadingIndicator {
    /// Number of renders in flight.
    pub pending: usize,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl Widget for LoadingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.pending == 0 || area.width < 20 || area.height == 0 {
            return;
        }

        let noun = if self.pending == 1 { "swatch" } else { "swatches" };
        let label = format!(" {} {} {noun} ", spinner_frame(self.tick), self.pending);

        let label_width = label.chars().count() as u16;
        // Top-right, inside the border (leave 1 col for the border char).
        let x = area.x + area.width.saturating_sub(label_width + 2);
        let line = Line::from(Span::styled(label, Theme::spinner_style()));
        buf.set_line(x, area.y, &line, label_width);
    }
}
