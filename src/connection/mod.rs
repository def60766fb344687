//! Host Connection Module
//!
//! The connection to the session host is a newline-delimited stream of JSON
//! messages. This module provides:
//! - [`Lifecycle`]: the `Connecting -> Open -> Closed` state machine with
//!   reconnect backoff and attach/detach of the presentation sink
//! - [`Driver`]: the tokio event loop that feeds the lifecycle from a socket
//!   and a user input channel
//! - [`TraceLog`]: JSONL recording of every inbound message

mod driver;
mod lifecycle;

pub use driver::{Driver, TraceLog};
pub use lifecycle::{Backoff, Lifecycle, LinkState, ReconnectDelay};

use crate::input::KeyPress;
use crate::protocol::Action;

/// Input destined for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// A key press, translated before sending
    Key(KeyPress),
    /// A ready-made batch of actions
    Actions(Vec<Action>),
}

/// Error type for connection operations
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode operation: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("connection is not open")]
    NotOpen,
}

/// Result type for connection operations
pub type ConnectionResult<T> = Result<T, ConnectionError>;
