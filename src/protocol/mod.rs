//! Host Protocol Module
//!
//! Wire data model for the JSON message protocol spoken with the session
//! host:
//! - Inbound indications, one tagged JSON object per message
//! - Outbound operations (action batches and pass-through replies)
//! - Colors and graphic renditions shared by both directions
//!
//! Decoding is strict about shape but lenient about vocabulary: an unknown
//! top-level tag, OIA field or connection state never fails a message.

mod indication;
mod operation;
mod types;

pub use indication::{
    ActionCause, Change, ChangePayload, CodePage, ComposeType, ConnectAttempt, Connection,
    ConnectionState, Erase, FileTransfer, FileTransferState, Hello, Indication, Model, OiaField,
    Passthru, Popup, PopupType, Proxy, RowChanges, RunResult, ScreenMode, ScreenUpdate, Scroll,
    Setting, Stats, TerminalName, Thumb, Tls, TlsHello, TraceFile, UiError, KNOWN_TAGS,
};
pub use operation::{Action, Operation, PassthruResult, Register, Run};
pub use types::{Color, GraphicRendition};

/// Error decoding an inbound message
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message is not a single-key tagged object")]
    NotTagged,

    #[error("malformed '{tag}' indication: {source}")]
    Malformed {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}
