//! Popup overlay widgets for the settings menu and controls submenu.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::settings::SETTINGS_ITEMS;
use crate::app::state::AppState;
use crate::config::{Action, AppConfig};

use super::theme::Theme;

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(Theme::popup_title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::dim_style())
}

fn prefix(selected: bool) -> &'static str {
    if selected {
        " ▸ "
    } else {
        "   "
    }
}

// ───────────────────────────────────────── settings popup ────

/// Settings menu popup overlay.
///
/// Holds a snapshot of the item values so it can be built before the frame
/// borrows the rest of the state.
pub struct SettingsPopup {
    selected: usize,
    entries: Vec<(&'static str, Option<String>)>,
}

impl SettingsPopup {
    pub fn new(state: &AppState) -> Self {
        Self {
            selected: state.settings_selected,
            entries: SETTINGS_ITEMS
                .iter()
                .map(|item| (item.label(), item.value(state)))
                .collect(),
        }
    }
}

impl Widget for SettingsPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (self.entries.len() as u16) + 6;
        let popup = centered_fixed(44, height, area);
        Clear.render(popup, buf);

        let block = popup_block("Settings");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        for (i, (label, value)) in self.entries.into_iter().enumerate() {
            let selected = i == self.selected;
            let label = Span::styled(
                format!("{}{label:<22}", prefix(selected)),
                Theme::popup_item_style(selected),
            );
            let value = match value {
                Some(v) if v == "ON" => {
                    Span::styled(format!("[{v}]"), Style::default().fg(Color::Green))
                }
                Some(v) if v == "OFF" => Span::styled(format!("[{v}]"), Theme::dim_style()),
                Some(v) => Span::styled(v, Style::default().fg(Color::Yellow)),
                None => Span::raw(""),
            };
            lines.push(Line::from(vec![label, value]));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter/Space: change  Esc: close",
            Theme::dim_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── controls popup ────

/// Interactive controls / keybinding popup overlay.
pub struct ControlsPopup<'a> {
    pub config: &'a AppConfig,
    pub selected: usize,
    pub awaiting_rebind: bool,
}

impl<'a> Widget for ControlsPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Actions + blank + reset + blank + hint + blank + 2 border rows.
        let height = (Action::ALL.len() as u16) + 7;
        let popup = centered_fixed(52, height, area);
        Clear.render(popup, buf);

        let block = popup_block("Controls");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];

        for (i, &action) in Action::ALL.iter().enumerate() {
            let selected = i == self.selected;
            let rebinding = selected && self.awaiting_rebind;

            let keys_display = if rebinding {
                "Press a key…".to_string()
            } else {
                self.config.display_bindings(action)
            };

            let mut key_style = Style::default().fg(Color::Yellow);
            if selected {
                key_style = key_style.bg(Color::DarkGray);
            }
            if rebinding {
                key_style = key_style.add_modifier(Modifier::BOLD);
            }

            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("{}{:<22}", prefix(selected), action.label());
            let keys_width = (inner.width as usize)
                .saturating_sub(label_col.chars().count())
                .max(1);
            let keys_col = format!("{keys_display:>keys_width$}");

            lines.push(Line::from(vec![
                Span::styled(label_col, Theme::popup_item_style(selected)),
                Span::styled(keys_col, key_style),
            ]));
        }

        let reset_selected = self.selected == Action::ALL.len();
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("{}⟳ Reset to defaults", prefix(reset_selected)),
            Theme::popup_item_style(reset_selected),
        )));

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter: add key  Del: clear  Esc: back",
            Theme::dim_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
