//! Core model – content tree, symbols, swatch rendering, and the row model.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Renderers and render results are `Send` so swatches can be drawn on
//! worker threads; the row model itself stays on the thread that owns it.

pub mod content;
pub mod document;
pub mod rows;
pub mod swatch;
pub mod symbol;
