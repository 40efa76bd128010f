//! User configuration — keybindings, display options and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/layer-contents/config.toml`
//! (default `~/.config/layer-contents/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::rows::{DisplayConfiguration, Indentation};
use crate::core::swatch::DEFAULT_SWATCH_SIZE;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the contents view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    ToggleExpand,
    ToggleVisibility,
    Reload,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls menu).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::ToggleExpand,
        Action::ToggleVisibility,
        Action::Reload,
        Action::OpenSettings,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::MoveUp => "Move Up",
            Action::MoveDown => "Move Down",
            Action::ToggleExpand => "Expand / Collapse",
            Action::ToggleVisibility => "Show / Hide Layer",
            Action::Reload => "Reload Document",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::ToggleExpand => "toggle_expand",
            Action::ToggleVisibility => "toggle_visibility",
            Action::Reload => "reload",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Only these modifiers take part in matching.
const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code
            && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Create a binding from a raw key event (used during rebinding).
    pub fn from_key_event(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers & MODIFIER_MASK)
    }

    /// User-friendly display string (e.g. `"Ctrl+r"`, `"Space"`, `"↑"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Config-file form (e.g. `"Ctrl+r"`, `"Space"`, `"Up"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, arrows: bool) -> String {
        let mut s = String::new();
        for (flag, prefix) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(prefix);
            }
        }
        let key = match (self.code, arrows) {
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Left, true) => "←".into(),
            (KeyCode::Right, true) => "→".into(),
            (KeyCode::Up, false) => "Up".into(),
            (KeyCode::Down, false) => "Down".into(),
            (KeyCode::Left, false) => "Left".into(),
            (KeyCode::Right, false) => "Right".into(),
            (KeyCode::Char(' '), _) => "Space".into(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Enter, _) => "Enter".into(),
            (KeyCode::Esc, _) => "Esc".into(),
            (KeyCode::Tab, _) => "Tab".into(),
            (KeyCode::Backspace, _) => "Backspace".into(),
            (KeyCode::Delete, _) => "Delete".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse a key string like `"Ctrl+r"`, `"Up"`, `"Space"`, `"v"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let (mods, key_part) = match s.rsplit_once('+') {
            // A bare "+" is the plus key itself.
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };

        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration — keybindings and presentation settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub display: DisplayConfiguration,
    pub indentation: Indentation,
    /// How many indentation points one terminal column stands for.
    pub points_per_column: u16,
    /// Edge length of rendered swatches, in pixels.
    pub swatch_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            display: DisplayConfiguration::default(),
            indentation: Indentation::default(),
            points_per_column: 8,
            swatch_size: DEFAULT_SWATCH_SIZE,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(
            ToggleExpand,
            vec![KeyBind::new(Enter, n), KeyBind::new(Char('l'), n)],
        );
        m.insert(
            ToggleVisibility,
            vec![KeyBind::new(Char(' '), n), KeyBind::new(Char('v'), n)],
        );
        m.insert(Reload, vec![KeyBind::new(Char('r'), KeyModifiers::CONTROL)]);
        m.insert(OpenSettings, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Add a binding for `action`, removing the key from any other action.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for binds in self.bindings.values_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: navigate | {}: expand/collapse | {}: show/hide | {}: settings",
            self.short_binding(Action::MoveUp),
            self.short_binding(Action::ToggleExpand),
            self.short_binding(Action::ToggleVisibility),
            self.short_binding(Action::OpenSettings),
        )
    }

    /// Indentation of a row in terminal columns.
    pub fn indent_columns(&self, offset_points: u32) -> u16 {
        let per_column = u32::from(self.points_per_column.max(1));
        (offset_points / per_column).min(u32::from(u16::MAX)) as u16
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        tracing::debug!("saved config to {}", path.display());
        Ok(())
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let flag = value == "true";

            match key {
                "title" => config.display.title = value.trim_matches('"').to_string(),
                "show_row_separator" => config.display.show_row_separator = flag,
                "allow_layers_accordion" => config.display.allow_layers_accordion = flag,
                "allow_toggle_visibility" => config.display.allow_toggle_visibility = flag,
                "allow_layer_reordering" => config.display.allow_layer_reordering = flag,
                "indent_base" => {
                    if let Ok(v) = value.parse() {
                        config.indentation.base = v;
                    }
                }
                "indent_step" => {
                    if let Ok(v) = value.parse() {
                        config.indentation.step = v;
                    }
                }
                "points_per_column" => {
                    if let Ok(v) = value.parse::<u16>() {
                        config.points_per_column = v.max(1);
                    }
                }
                "swatch_size" => {
                    if let Ok(v) = value.parse::<u32>() {
                        config.swatch_size = v.clamp(4, 128);
                    }
                }
                _ => {
                    let Some(action) = Action::from_config_key(key) else {
                        continue;
                    };
                    let parsed: Vec<KeyBind> = value
                        .split(',')
                        .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                        .collect();
                    if !parsed.is_empty() {
                        config.bindings.insert(action, parsed);
                    }
                }
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let d = &self.display;
        let mut lines = vec![
            "# layer-contents configuration".to_string(),
            String::new(),
            "# Display".to_string(),
            format!("title = \"{}\"", d.title),
            format!("show_row_separator = {}", d.show_row_separator),
            format!("allow_layers_accordion = {}", d.allow_layers_accordion),
            format!("allow_toggle_visibility = {}", d.allow_toggle_visibility),
            format!("allow_layer_reordering = {}", d.allow_layer_reordering),
            String::new(),
            "# Indentation (points) and swatch size (pixels)".to_string(),
            format!("indent_base = {}", self.indentation.base),
            format!("indent_step = {}", self.indentation.step),
            format!("points_per_column = {}", self.points_per_column),
            format!("swatch_size = {}", self.swatch_size),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/layer-contents/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("layer-contents").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig::default();
        config.display = DisplayConfiguration::legend();
        config.indentation = Indentation { base: 8, step: 4 };
        config.swatch_size = 32;
        config.add_binding(Action::Reload, KeyBind::new(KeyCode::F(5), KeyModifiers::NONE));

        let parsed = AppConfig::parse(&config.serialise());
        assert_eq!(parsed.display, DisplayConfiguration::legend());
        assert_eq!(parsed.indentation, Indentation { base: 8, step: 4 });
        assert_eq!(parsed.swatch_size, 32);
        assert_eq!(parsed.bindings[&Action::Reload], config.bindings[&Action::Reload]);
    }

    #[test]
    fn out_of_range_values_are_clamped_or_ignored() {
        let parsed =
            AppConfig::parse("swatch_size = 4096\npoints_per_column = 0\nindent_step = -3\n");
        assert_eq!(parsed.swatch_size, 128);
        assert_eq!(parsed.points_per_column, 1);
        assert_eq!(parsed.indentation.step, Indentation::default().step);
    }

    #[test]
    fn parses_modifiers_and_special_keys() {
        assert_eq!(
            KeyBind::parse("Ctrl+r"),
            Some(KeyBind::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            KeyBind::parse("Space"),
            Some(KeyBind::new(KeyCode::Char(' '), KeyModifiers::NONE))
        );
        assert_eq!(
            KeyBind::parse("Alt++"),
            Some(KeyBind::new(KeyCode::Char('+'), KeyModifiers::ALT))
        );
        assert_eq!(KeyBind::parse("Hyper+x"), None);
    }

    #[test]
    fn more_specific_binding_wins() {
        let mut config = AppConfig::default();
        config.add_binding(
            Action::Quit,
            KeyBind::new(KeyCode::Char('v'), KeyModifiers::ALT),
        );

        assert_eq!(
            config.match_key(press(KeyCode::Char('v'), KeyModifiers::ALT)),
            Some(Action::Quit)
        );
        assert_eq!(
            config.match_key(press(KeyCode::Char('v'), KeyModifiers::NONE)),
            Some(Action::ToggleVisibility)
        );
    }

    #[test]
    fn indent_columns_divides_points() {
        let config = AppConfig::default();
        assert_eq!(config.indent_columns(16), 2);
        assert_eq!(config.indent_columns(32), 4);
    }
}
