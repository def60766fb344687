//! term3270 Display Session Library
//!
//! Client-side state for a remote 3270 session host that speaks a JSON
//! message protocol. This crate provides:
//!
//! - `protocol`: inbound indications and outbound operations
//! - `core`: screen buffer, cells, cursor, status strip, snapshots
//! - `session`: the indication dispatcher
//! - `render`: the presentation-layer contract
//! - `input`: key press to host action translation
//! - `connection`: connection lifecycle, reconnect backoff, tokio driver
//! - `app`: configuration

pub mod app;
pub mod connection;
pub mod core;
pub mod input;
pub mod protocol;
pub mod render;
pub mod session;

pub use crate::core::{Cell, Cursor, Screen, Snapshot, StatusField, StatusLine};
pub use connection::{Lifecycle, UserInput};
pub use protocol::{Indication, Operation};
pub use render::RenderSink;
pub use session::Session;
