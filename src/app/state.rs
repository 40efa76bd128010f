//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::AppConfig;
use crate::core::rows::ContentRowModel;
use crate::ui::contents_widget::ContentsListState;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Contents,
    SettingsMenu,
    ControlsSubmenu,
}

/// Top-level application state.
pub struct AppState {
    /// Flattened rows plus the content tree and swatch cache behind them.
    pub model: ContentRowModel,
    /// Widget-level state (selection, scroll).
    pub list_state: ContentsListState,
    /// Document the tree was loaded from (for reloads).
    pub document_path: PathBuf,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub active_view: ActiveView,
    /// User configuration (bindings, display options).
    pub config: AppConfig,
    pub settings_selected: usize,
    pub controls_selected: usize,
    /// When `true`, the controls submenu is waiting for the user to press
    /// a key to rebind the action at `controls_selected`.
    pub awaiting_rebind: bool,
    /// Swatch callbacks bump this; the next frame picks up the new images.
    pub swatches_resolved: Rc<Cell<usize>>,
    /// Frame counter driving the loading spinner.
    pub tick: u64,
}

impl AppState {
    pub fn new(document_path: PathBuf, model: ContentRowModel, config: AppConfig) -> Self {
        Self {
            model,
            list_state: ContentsListState::default(),
            document_path,
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            config,
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
            swatches_resolved: Rc::new(Cell::new(0)),
            tick: 0,
        }
    }

    /// Write the config to disk, reporting a failure in the status bar.
    pub fn save_config(&mut self) {
        if let Err(err) = self.config.save() {
            tracing::debug!("config save failed: {err:#}");
            self.status_message = Some(format!("Could not save config: {err:#}"));
        }
    }

    /// Push the current display options into the model (rebuilds rows).
    pub fn apply_display_config(&mut self) {
        self.model.set_indentation(self.config.indentation);
        self.model.set_config(self.config.display.clone());
        self.list_state.clamp_selection(self.model.row_count());
    }
}
