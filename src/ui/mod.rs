//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* row model and turns it into cells on the
//! terminal.  No document I/O or swatch rendering happens here.

pub mod contents_widget;
pub mod layout;
pub mod popup;
pub mod spinner;
pub mod swatch;
pub mod theme;
