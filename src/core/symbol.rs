//! Legend symbol definitions.
//!
//! A [`Symbol`] is the *description* of how a legend entry is drawn; the
//! pixels come later from a [`SwatchRenderer`](super::swatch::SwatchRenderer).
//! Symbols are identified by [`SymbolKey`], which compares their whole
//! structure, so two legend entries that describe the same symbol share one
//! cached swatch.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA colour.
pub type Rgba = [u8; 4];

// ───────────────────────────────────────── styles ────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    #[default]
    Circle,
    Square,
    Diamond,
    Triangle,
    Cross,
    X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
}

/// Outline drawn around markers and fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outline {
    pub color: Rgba,
    pub width: u32,
}

// ───────────────────────────────────────── symbol ────────────

/// A legend symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Symbol {
    SimpleMarker {
        #[serde(default)]
        style: MarkerStyle,
        color: Rgba,
        /// Marker diameter in swatch pixels.
        size: u32,
        #[serde(default)]
        outline: Option<Outline>,
    },
    SimpleLine {
        #[serde(default)]
        style: LineStyle,
        color: Rgba,
        width: u32,
    },
    SimpleFill {
        color: Rgba,
        #[serde(default)]
        outline: Option<Outline>,
    },
    /// Image loaded from disk and scaled into the swatch.
    PictureMarker { path: PathBuf },
}

impl Symbol {
    /// Identity used as the swatch cache key.
    pub fn key(&self) -> SymbolKey {
        SymbolKey(Arc::new(self.clone()))
    }

    /// The `type` tag this symbol is written with in a map document.
    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::SimpleMarker { .. } => "simple_marker",
            Symbol::SimpleLine { .. } => "simple_line",
            Symbol::SimpleFill { .. } => "simple_fill",
            Symbol::PictureMarker { .. } => "picture_marker",
        }
    }
}

/// Structural identity of a [`Symbol`]: equality and hashing go through
/// the whole definition, so keys are equal exactly when symbols are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolKey(Arc<Symbol>);

impl SymbolKey {
    pub fn symbol(&self) -> &Symbol {
        &self.0
    }
}

impl std::fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.symbol() {
            Symbol::PictureMarker { path } => write!(f, "picture_marker {}", path.display()),
            other => f.write_str(other.kind()),
        }
    }
}
