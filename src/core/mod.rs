//! Session Core Module
//!
//! Platform-independent display state. This module contains:
//! - Cell representation with colors and graphic renditions
//! - Cursor state
//! - Screen buffer with resize, incremental update and erase
//! - Status indicator strip
//! - Deterministic snapshot generation
//!
//! The core is deterministic: given the same sequence of indications it
//! always produces the same state.

mod cell;
mod cursor;
mod screen;
mod snapshot;
mod status;

pub use cell::Cell;
pub use cursor::Cursor;
pub use screen::{Screen, ScreenError, ScreenResult};
pub use snapshot::{CellSnapshot, Snapshot};
pub use status::{connection_glyph, StatusField, StatusLine, READY};
