//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and UI renderers consume the same source of truth without cross-importing.

use super::state::{ActiveView, AppState};
use crate::core::rows::DisplayConfiguration;

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Opens a submenu.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// Boolean toggle — reads/writes via accessors on `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. }
            | Self::Toggle { label, .. }
            | Self::Cycle { label, .. } => label,
        }
    }

    /// Current value shown beside the label (`None` for submenus).
    pub fn value(&self, state: &AppState) -> Option<String> {
        match self {
            Self::Submenu { .. } => None,
            Self::Toggle { get, .. } => Some(if get(state) { "ON" } else { "OFF" }.into()),
            Self::Cycle { value, .. } => Some(value(state)),
        }
    }
}

/// Persist and push a display change into the row model.
fn commit(s: &mut AppState) {
    s.save_config();
    s.apply_display_config();
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Cycle {
        label: "Preset",
        value: |s| s.config.display.title.clone(),
        cycle: |s| {
            s.config.display = if s.config.display == DisplayConfiguration::table_of_contents() {
                DisplayConfiguration::legend()
            } else {
                DisplayConfiguration::table_of_contents()
            };
            s.status_message = Some(format!("Preset: {}", s.config.display.title));
            commit(s);
        },
    },
    SettingsItem::Toggle {
        label: "Row Separators",
        get: |s| s.config.display.show_row_separator,
        set: |s, v| {
            s.config.display.show_row_separator = v;
            commit(s);
        },
    },
    SettingsItem::Toggle {
        label: "Layer Accordion",
        get: |s| s.config.display.allow_layers_accordion,
        set: |s, v| {
            s.config.display.allow_layers_accordion = v;
            commit(s);
        },
    },
    SettingsItem::Toggle {
        label: "Toggle Visibility",
        get: |s| s.config.display.allow_toggle_visibility,
        set: |s, v| {
            s.config.display.allow_toggle_visibility = v;
            commit(s);
        },
    },
    SettingsItem::Toggle {
        label: "Layer Reordering",
        get: |s| s.config.display.allow_layer_reordering,
        set: |s, v| {
            s.config.display.allow_layer_reordering = v;
            commit(s);
        },
    },
    SettingsItem::Cycle {
        label: "Indent Step",
        value: |s| format!("{}pt", s.config.indentation.step),
        cycle: |s| {
            const STEPS: &[u16] = &[8, 16, 24, 32];
            let idx = STEPS
                .iter()
                .position(|&w| w == s.config.indentation.step)
                .unwrap_or(0);
            s.config.indentation.step = STEPS[(idx + 1) % STEPS.len()];
            commit(s);
        },
    },
];
