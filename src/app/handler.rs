//! Input handling — maps key events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{Action, KeyBind};
use crate::core::document::MapDocument;
use crate::core::rows::Row;

use super::settings::{SettingsItem, SETTINGS_ITEMS};
use super::state::{ActiveView, AppState};

/// Rows skipped by PageUp / PageDown.
const PAGE: usize = 10;

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Contents => handle_contents_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu => {
            if state.awaiting_rebind {
                handle_rebind_key(state, key);
            } else {
                handle_controls_key(state, key);
            }
        }
    }
}

// ── Contents view (configurable bindings) ───────────────────────

fn handle_contents_key(state: &mut AppState, key: KeyEvent) {
    let row_count = state.model.row_count();

    // Navigation keys that always work.
    match key.code {
        KeyCode::Home => {
            state.list_state.selected = 0;
            return;
        }
        KeyCode::End => {
            state.list_state.selected = row_count.saturating_sub(1);
            return;
        }
        KeyCode::PageUp => {
            state.list_state.selected = state.list_state.selected.saturating_sub(PAGE);
            return;
        }
        KeyCode::PageDown => {
            let last = row_count.saturating_sub(1);
            state.list_state.selected = (state.list_state.selected + PAGE).min(last);
            return;
        }
        KeyCode::Left => {
            collapse_or_select_parent(state);
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::MoveUp => state.list_state.select_prev(),
        Action::MoveDown => state.list_state.select_next(row_count),
        Action::ToggleExpand => toggle_expand_selected(state),
        Action::ToggleVisibility => toggle_visibility_selected(state),
        Action::Reload => reload_document(state),
    }
}

fn toggle_expand_selected(state: &mut AppState) {
    let selected = state.list_state.selected;
    match state.model.toggle_expanded(selected) {
        Ok(_) => state.list_state.clamp_selection(state.model.row_count()),
        Err(err) => state.status_message = Some(err.to_string()),
    }
}

fn toggle_visibility_selected(state: &mut AppState) {
    let selected = state.list_state.selected;
    let visible = match state.model.row_at(selected) {
        Ok(Row::Layer { is_visible, .. } | Row::Sublayer { is_visible, .. }) => *is_visible,
        Ok(Row::Legend { .. }) | Err(_) => false,
    };
    state.status_message = match state.model.update_visibility(selected, !visible) {
        Ok(()) => {
            let name = state.model.rows()[selected].name();
            Some(format!("{name}: {}", if visible { "hidden" } else { "shown" }))
        }
        Err(err) => Some(err.to_string()),
    };
}

/// Left arrow: collapse an expanded layer, otherwise jump to the row of the
/// layer that contains the selection.
fn collapse_or_select_parent(state: &mut AppState) {
    let selected = state.list_state.selected;
    let Ok(row) = state.model.row_at(selected) else {
        return;
    };

    let collapse = state.model.config().allow_layers_accordion
        && matches!(
            row,
            Row::Layer {
                expanded: true,
                expandable: true,
                ..
            } | Row::Sublayer {
                expanded: true,
                expandable: true,
                ..
            }
        );
    let parent = match row {
        Row::Legend { owner, .. } => Some(*owner),
        Row::Layer { node, .. } | Row::Sublayer { node, .. } => {
            state.model.content().get(*node).parent
        }
    };

    if collapse {
        toggle_expand_selected(state);
        return;
    }
    let Some(parent) = parent else {
        return;
    };
    if let Some(index) = state.model.rows().iter().position(|r| {
        matches!(r, Row::Layer { node, .. } | Row::Sublayer { node, .. } if *node == parent)
    }) {
        state.list_state.selected = index;
    }
}

fn reload_document(state: &mut AppState) {
    match MapDocument::load(&state.document_path) {
        Ok(doc) => {
            state.model.set_tree(doc.to_tree());
            state.list_state.clamp_selection(state.model.row_count());
            state.status_message = Some(format!("Reloaded {}", state.document_path.display()));
        }
        Err(err) => {
            tracing::debug!("reload failed: {err:#}");
            state.status_message = Some(format!("Reload failed: {err:#}"));
        }
    }
}

// ── Settings menu ───────────────────────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Contents;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected < SETTINGS_ITEMS.len() - 1 {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                match item {
                    SettingsItem::Submenu { view, .. } => {
                        state.active_view = *view;
                        state.controls_selected = 0;
                    }
                    SettingsItem::Toggle { get, set, .. } => {
                        let current = get(state);
                        set(state, !current);
                    }
                    SettingsItem::Cycle { cycle, .. } => cycle(state),
                }
            }
        }
        _ => {}
    }
}

// ── Controls submenu (hardcoded navigation, interactive rebinding) ──

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    let item_count = controls_item_count();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Contents;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected < item_count - 1 {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                state.config.reset_defaults();
                state.save_config();
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if let Some(&action) = Action::ALL.get(state.controls_selected) {
                state.config.bindings.insert(action, Vec::new());
                state.save_config();
            }
        }
        _ => {}
    }
}

/// Capture the next key press as a new binding.
fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }
    // Ctrl+c stays reserved for quitting.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return;
    }

    let action = Action::ALL[state.controls_selected];
    state.config.add_binding(action, KeyBind::from_key_event(key));
    state.save_config();
    state.awaiting_rebind = false;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::config::AppConfig;
    use crate::core::content::{ContentTree, LegendEntry, NodeMeta};
    use crate::core::rows::{ContentRowModel, DisplayConfiguration};
    use crate::core::swatch::ImageSwatchRenderer;

    fn state() -> AppState {
        let mut tree = ContentTree::new();
        let roads = tree.add_layer(NodeMeta::new("Roads"));
        tree.add_legend_entry(roads, LegendEntry::new("Highway", None));
        let ramps = tree.add_sublayer(roads, NodeMeta::new("Ramps"));
        tree.add_legend_entry(ramps, LegendEntry::new("Ramp", None));
        tree.add_layer(NodeMeta::new("Basemap").can_change_visibility(false));

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut model = ContentRowModel::new(Arc::new(ImageSwatchRenderer::default()), tx);
        model.set_content(tree, DisplayConfiguration::default());
        AppState::new(PathBuf::from("/nonexistent/map.json"), model, AppConfig::default())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn space_toggles_visibility_of_selected_layer() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char(' ')));

        assert!(!state.model.content().get(0).visible);
        assert_eq!(state.status_message.as_deref(), Some("Roads: hidden"));

        handle_key(&mut state, press(KeyCode::Char(' ')));
        assert!(state.model.content().get(0).visible);
    }

    #[test]
    fn locked_layer_reports_error() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::End));
        handle_key(&mut state, press(KeyCode::Char(' ')));

        let basemap = state.model.rows()[4].node();
        assert!(state.model.content().get(basemap).visible);
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("does not allow visibility")));
    }

    #[test]
    fn enter_collapses_and_left_returns_to_parent() {
        let mut state = state();
        assert_eq!(state.model.row_count(), 5);

        // Select "Ramp" (legend of Ramps) and walk back up.
        for _ in 0..3 {
            handle_key(&mut state, press(KeyCode::Down));
        }
        handle_key(&mut state, press(KeyCode::Left));
        assert_eq!(state.list_state.selected, 2);

        handle_key(&mut state, press(KeyCode::Left));
        assert_eq!(state.model.row_count(), 4);
        assert_eq!(state.list_state.selected, 2);

        handle_key(&mut state, press(KeyCode::Left));
        assert_eq!(state.list_state.selected, 0);

        handle_key(&mut state, press(KeyCode::Enter));
        assert_eq!(state.model.row_count(), 2);
    }

    #[test]
    fn reload_failure_keeps_rows() {
        let mut state = state();
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
        );
        assert_eq!(state.model.row_count(), 5);
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Reload failed")));
    }

    #[test]
    fn settings_menu_opens_and_closes() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('?')));
        assert_eq!(state.active_view, ActiveView::SettingsMenu);
        handle_key(&mut state, press(KeyCode::Esc));
        assert_eq!(state.active_view, ActiveView::Contents);
    }

    /// Settings tests point `XDG_CONFIG_HOME` somewhere disposable; the
    /// variable is process-wide, so they take turns.
    static CONFIG_ENV: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn with_config_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let _guard = CONFIG_ENV.lock().unwrap_or_else(|e| e.into_inner());
        let previous = std::env::var_os("XDG_CONFIG_HOME");
        std::env::set_var("XDG_CONFIG_HOME", dir);
        let out = f();
        match previous {
            Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
        out
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("layer-contents-{}-{name}", std::process::id()))
    }

    /// Open settings and activate the item at `index`.
    fn activate_setting(state: &mut AppState, index: usize) {
        handle_key(state, press(KeyCode::Char('?')));
        for _ in 0..index {
            handle_key(state, press(KeyCode::Down));
        }
        handle_key(state, press(KeyCode::Enter));
    }

    #[test]
    fn disabling_accordion_in_settings_reveals_collapsed_rows() {
        let home = scratch("accordion");
        let _ = std::fs::remove_dir_all(&home);
        let mut state = state();

        handle_key(&mut state, press(KeyCode::Enter));
        assert_eq!(state.model.row_count(), 2);

        with_config_home(&home, || activate_setting(&mut state, 3));

        assert!(!state.config.display.allow_layers_accordion);
        assert!(!state.model.config().allow_layers_accordion);
        assert_eq!(state.model.row_count(), 5);

        let saved = std::fs::read_to_string(home.join("layer-contents").join("config.toml"))
            .unwrap_or_default();
        let _ = std::fs::remove_dir_all(&home);
        assert!(saved.contains("allow_layers_accordion = false"));
    }

    #[test]
    fn settings_save_failure_reaches_status_bar() {
        // A plain file where the config directory should be.
        let home = scratch("blocked");
        std::fs::write(&home, "").unwrap();
        let mut state = state();

        with_config_home(&home, || activate_setting(&mut state, 2));
        let _ = std::fs::remove_file(&home);

        assert!(!state.model.config().show_row_separator);
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Could not save config")));
    }
}
