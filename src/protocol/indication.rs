//! Inbound indications
//!
//! Each message from the host is a JSON object with exactly one key naming
//! the indication. Tags this client has never heard of decode to
//! [`Indication::Other`] instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::types::Color;
use super::DecodeError;
use crate::core::Cursor;

/// Every indication tag this client understands
pub const KNOWN_TAGS: &[&str] = &[
    "bell",
    "code-pages",
    "connect-attempt",
    "connection",
    "erase",
    "flipped",
    "font",
    "formatted",
    "ft",
    "hello",
    "icon",
    "initialize",
    "models",
    "oia",
    "passthru",
    "popup",
    "prefixes",
    "proxies",
    "run-result",
    "screen",
    "screen-mode",
    "scroll",
    "setting",
    "stats",
    "terminal-name",
    "thumb",
    "tls",
    "tls-hello",
    "trace-file",
    "ui-error",
    "window-title",
];

/// A decoded host indication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Indication {
    /// Ring the terminal bell
    Bell {},
    /// Supported code pages (initialize only)
    CodePages(Vec<CodePage>),
    /// A new host connection is being attempted
    ConnectAttempt(ConnectAttempt),
    /// The host connection changed state
    Connection(Connection),
    /// Clear the screen, optionally with new colors and dimensions
    Erase(Erase),
    /// Display switched between LTR and RTL
    Flipped { value: bool },
    /// An xterm escape sequence requested a new font
    Font { text: String },
    /// Whether the screen has at least one field
    Formatted { state: bool },
    /// File transfer progress
    #[serde(rename = "ft")]
    FileTransfer(FileTransfer),
    /// Emulator version banner (initialize only)
    Hello(Hello),
    /// An xterm escape sequence requested a new icon name
    Icon { text: String },
    /// Batch of indications delivered together, first message of a session
    Initialize(#[serde(deserialize_with = "decode_batch")] Vec<Indication>),
    /// Supported 3270 models (initialize only)
    Models(Vec<Model>),
    /// One status-line field changed
    Oia(OiaField),
    /// A pass-through action was invoked
    Passthru(Passthru),
    /// Asynchronous message for the user
    Popup(Popup),
    /// Supported action prefixes (initialize only)
    Prefixes { value: String },
    /// Supported proxies (initialize only)
    Proxies(Vec<Proxy>),
    /// Result of a run operation
    RunResult(RunResult),
    /// Incremental change to screen contents
    Screen(ScreenUpdate),
    /// Screen dimensions or model changed
    ScreenMode(ScreenMode),
    /// Screen scrolled up by one row
    Scroll(Scroll),
    /// A setting changed
    Setting(Setting),
    /// I/O statistics
    Stats(Stats),
    /// Terminal name sent during TELNET negotiation (initialize only)
    TerminalName(TerminalName),
    /// Scrollbar thumb changed
    Thumb(Thumb),
    /// TLS state changed
    Tls(Tls),
    /// Build-time TLS support (initialize only)
    TlsHello(TlsHello),
    /// Name of the trace file
    TraceFile(TraceFile),
    /// The emulator rejected input from its UI
    UiError(UiError),
    /// Xterm escape sequence requested a new window title
    WindowTitle { text: String },
    /// A tag this client does not know; kept verbatim
    #[serde(skip)]
    Other { tag: String, body: Value },
}

impl Indication {
    /// Decode one message body into an indication
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let tag = match &value {
            Value::Object(map) if map.len() == 1 => map.keys().next().cloned(),
            _ => None,
        };
        let Some(tag) = tag else {
            return Err(DecodeError::NotTagged);
        };

        if !KNOWN_TAGS.contains(&tag.as_str()) {
            let body = match value {
                Value::Object(mut map) => map.remove(&tag).unwrap_or(Value::Null),
                _ => Value::Null,
            };
            return Ok(Indication::Other { tag, body });
        }

        serde_json::from_value(value).map_err(|source| DecodeError::Malformed { tag, source })
    }

    /// Wire tag of this indication
    pub fn tag(&self) -> &str {
        match self {
            Indication::Bell {} => "bell",
            Indication::CodePages(_) => "code-pages",
            Indication::ConnectAttempt(_) => "connect-attempt",
            Indication::Connection(_) => "connection",
            Indication::Erase(_) => "erase",
            Indication::Flipped { .. } => "flipped",
            Indication::Font { .. } => "font",
            Indication::Formatted { .. } => "formatted",
            Indication::FileTransfer(_) => "ft",
            Indication::Hello(_) => "hello",
            Indication::Icon { .. } => "icon",
            Indication::Initialize(_) => "initialize",
            Indication::Models(_) => "models",
            Indication::Oia(_) => "oia",
            Indication::Passthru(_) => "passthru",
            Indication::Popup(_) => "popup",
            Indication::Prefixes { .. } => "prefixes",
            Indication::Proxies(_) => "proxies",
            Indication::RunResult(_) => "run-result",
            Indication::Screen(_) => "screen",
            Indication::ScreenMode(_) => "screen-mode",
            Indication::Scroll(_) => "scroll",
            Indication::Setting(_) => "setting",
            Indication::Stats(_) => "stats",
            Indication::TerminalName(_) => "terminal-name",
            Indication::Thumb(_) => "thumb",
            Indication::Tls(_) => "tls",
            Indication::TlsHello(_) => "tls-hello",
            Indication::TraceFile(_) => "trace-file",
            Indication::UiError(_) => "ui-error",
            Indication::WindowTitle { .. } => "window-title",
            Indication::Other { tag, .. } => tag,
        }
    }
}

/// Batch members go through the same tolerant decoding as top-level messages
fn decode_batch<'de, D>(deserializer: D) -> Result<Vec<Indication>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|value| Indication::from_value(value).map_err(serde::de::Error::custom))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionCause {
    Command,
    Default,
    FileTransfer,
    Httpd,
    Idle,
    Keymap,
    Macro,
    None,
    Password,
    Paste,
    Peek,
    ScreenRedraw,
    Script,
    Typeahead,
    Ui,
    #[serde(other)]
    Unknown,
}

/// Host connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    NotConnected,
    Reconnecting,
    Resolving,
    TcpPending,
    TlsPending,
    TelnetPending,
    ConnectedNvt,
    ConnectedNvtCharmode,
    #[serde(rename = "connected-3270")]
    Connected3270,
    ConnectedUnbound,
    ConnectedENvt,
    ConnectedSscp,
    ConnectedTn3270e,
    /// A state added by a newer host
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub state: ConnectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<ActionCause>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectAttempt {
    pub host_ip: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodePage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Erase indication; every part is optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Erase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_rows: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_cols: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub version: String,
    pub build: String,
    pub copyright: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub model: u8,
    pub rows: u16,
    pub columns: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComposeType {
    Std,
    Ge,
}

/// A single status-line field update, tagged by `field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "field")]
pub enum OiaField {
    /// Composite character in progress
    Compose {
        value: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        char: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_: Option<ComposeType>,
    },
    /// Insert mode
    Insert { value: bool },
    /// Keyboard lock reason; absent when unlocked
    Lock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// Host session logical unit, plus printer session LU if one is bound
    Lu {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lu: Option<String>,
    },
    /// Communication pending
    NotUndera { value: bool },
    /// Reverse input mode
    ReverseInput { value: bool },
    /// Screen trace count
    ScreenTrace {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<u64>,
    },
    Script { value: bool },
    /// Host command timer (minutes:seconds)
    Timing {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Typeahead { value: bool },
    /// Field added by a newer host
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    pub name: String,
    pub username: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<ActionCause>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenMode {
    pub model: u8,
    pub rows: u16,
    pub columns: u16,
    #[serde(default)]
    pub color: bool,
    #[serde(default)]
    pub oversize: bool,
    #[serde(default)]
    pub extended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsHello {
    pub supported: bool,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Tls {
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_cert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTransfer {
    #[serde(flatten)]
    pub state: FileTransferState,
    pub cause: ActionCause,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum FileTransferState {
    Awaiting,
    Running { bytes: u64 },
    Aborting,
    Complete { text: String, success: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Passthru {
    pub p_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_r_tag: Option<String>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    #[serde(rename = "type")]
    pub type_: PopupType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopupType {
    ConnectError,
    Error,
    Info,
    Result,
    Printer,
    Child,
}

/// Span payload of a change: a literal run of text, or a cell count that
/// only repaints attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangePayload {
    Count(usize),
    Text(String),
}

/// One change record within a screen row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// 1-indexed starting column
    pub column: u16,
    #[serde(flatten)]
    pub payload: ChangePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    /// Rendition spec: `"none"` or a comma-joined list of flag names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gr: Option<String>,
}

impl Change {
    /// A text change with no attribute overrides
    pub fn text(column: u16, text: impl Into<String>) -> Self {
        Self {
            column,
            payload: ChangePayload::Text(text.into()),
            fg: None,
            bg: None,
            gr: None,
        }
    }

    /// An attribute-only change over `count` cells
    pub fn count(column: u16, count: usize) -> Self {
        Self {
            column,
            payload: ChangePayload::Count(count),
            fg: None,
            bg: None,
            gr: None,
        }
    }

    pub fn with_fg(mut self, fg: Color) -> Self {
        self.fg = Some(fg);
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn with_gr(mut self, gr: impl Into<String>) -> Self {
        self.gr = Some(gr.into());
        self
    }
}

/// All changes for a single 1-indexed row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChanges {
    pub row: u16,
    pub changes: Vec<Change>,
}

/// Screen indication body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<RowChanges>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_tag: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort: Option<bool>,
    /// Execution time in seconds
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scroll {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Stats {
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub records_received: u64,
    pub records_sent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalName {
    pub text: String,
    #[serde(rename = "override")]
    pub override_: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thumb {
    /// Fraction of scrollbar to top of thumb
    pub top: f32,
    /// Fraction of scrollbar covered by the thumb
    pub shown: f32,
    /// Number of rows saved
    pub saved: u64,
    /// Size of a screen in rows
    pub screen: u64,
    /// Number of rows scrolled back
    pub back: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiError {
    pub fatal: bool,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u64>,
}
