//! Status indicator strip (OIA)
//!
//! Fixed set of independently settable fields, each holding its rendered
//! text. Fields keep their last value until the host changes them.

use std::fmt;

use super::cursor::Cursor;
use crate::protocol::{ComposeType, ConnectionState, OiaField};
use crate::render::RenderSink;

/// Rendered text of the lock field when the keyboard is unlocked
pub const READY: &str = "READY";

/// One field of the status strip, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusField {
    NotUndera,
    Connection,
    Lock,
    Compose,
    Typeahead,
    ReverseInput,
    Insert,
    Printer,
    ScreenTrace,
    Script,
    Lu,
    Timing,
    Position,
}

impl StatusField {
    pub const COUNT: usize = 13;

    /// All fields in display order
    pub const ALL: [StatusField; Self::COUNT] = [
        StatusField::NotUndera,
        StatusField::Connection,
        StatusField::Lock,
        StatusField::Compose,
        StatusField::Typeahead,
        StatusField::ReverseInput,
        StatusField::Insert,
        StatusField::Printer,
        StatusField::ScreenTrace,
        StatusField::Script,
        StatusField::Lu,
        StatusField::Timing,
        StatusField::Position,
    ];

    /// Stable name, used in snapshots
    pub fn name(self) -> &'static str {
        match self {
            StatusField::NotUndera => "not-undera",
            StatusField::Connection => "connection",
            StatusField::Lock => "lock",
            StatusField::Compose => "compose",
            StatusField::Typeahead => "typeahead",
            StatusField::ReverseInput => "reverse-input",
            StatusField::Insert => "insert",
            StatusField::Printer => "printer",
            StatusField::ScreenTrace => "screen-trace",
            StatusField::Script => "script",
            StatusField::Lu => "lu",
            StatusField::Timing => "timing",
            StatusField::Position => "position",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display glyph for a connection state; `None` for states this client
/// does not know
pub fn connection_glyph(state: ConnectionState) -> Option<&'static str> {
    let glyph = match state {
        ConnectionState::NotConnected => " ",
        ConnectionState::Reconnecting => "~",
        ConnectionState::Resolving => "?",
        ConnectionState::TcpPending => "-",
        ConnectionState::TlsPending => "=",
        ConnectionState::TelnetPending => "t",
        ConnectionState::ConnectedNvt => "n",
        ConnectionState::ConnectedNvtCharmode => "C",
        ConnectionState::Connected3270 => "3",
        ConnectionState::ConnectedUnbound => "!",
        ConnectionState::ConnectedENvt => "N",
        ConnectionState::ConnectedSscp => "S",
        ConnectionState::ConnectedTn3270e => "E",
        ConnectionState::Unknown => return None,
    };
    Some(glyph)
}

fn flag(on: bool, glyph: &str) -> String {
    let text = if on { glyph } else { " " };
    text.to_string()
}

/// Current rendered value of every status field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    fields: [String; StatusField::COUNT],
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLine {
    /// All fields blank except reverse-input, which shows normal mode
    pub fn new() -> Self {
        let mut fields: [String; StatusField::COUNT] = Default::default();
        fields[StatusField::ReverseInput.index()] = ">".to_string();
        Self { fields }
    }

    /// Rendered text of one field
    pub fn get(&self, field: StatusField) -> &str {
        &self.fields[field.index()]
    }

    /// Iterate fields and their text in display order
    pub fn iter(&self) -> impl Iterator<Item = (StatusField, &str)> + '_ {
        StatusField::ALL.iter().map(move |&field| (field, self.get(field)))
    }

    fn set(&mut self, field: StatusField, text: String, sink: &mut dyn RenderSink) {
        sink.render_status_field_changed(field, &text);
        self.fields[field.index()] = text;
    }

    /// Apply one OIA indication to the field it targets
    pub fn apply_oia(&mut self, oia: &OiaField, sink: &mut dyn RenderSink) {
        match oia {
            OiaField::Compose { value, char, type_ } => {
                let text = if *value {
                    let marker = match type_ {
                        Some(ComposeType::Ge) => 'G',
                        _ => ' ',
                    };
                    format!("{marker}{}", char.as_deref().unwrap_or(" "))
                } else {
                    " ".repeat(7)
                };
                self.set(StatusField::Compose, text, sink);
            }
            OiaField::Insert { value } => self.set(StatusField::Insert, flag(*value, "^"), sink),
            OiaField::Lock { value } => {
                let text = value.clone().unwrap_or_else(|| READY.to_string());
                self.set(StatusField::Lock, text, sink);
            }
            OiaField::Lu { value, lu } => {
                self.set(StatusField::Lu, value.clone(), sink);
                self.set(StatusField::Printer, flag(lu.is_some(), "P"), sink);
            }
            OiaField::NotUndera { value } => self.set(StatusField::NotUndera, flag(!*value, "B"), sink),
            OiaField::ReverseInput { value } => {
                let glyph = if *value { "<" } else { ">" };
                self.set(StatusField::ReverseInput, glyph.to_string(), sink);
            }
            OiaField::ScreenTrace { value } => {
                let tracing = value.is_some_and(|count| count > 0);
                self.set(StatusField::ScreenTrace, flag(tracing, "t"), sink);
            }
            OiaField::Script { value } => self.set(StatusField::Script, flag(*value, "s"), sink),
            OiaField::Timing { value } => {
                let text = value.clone().unwrap_or_else(|| " ".repeat(6));
                self.set(StatusField::Timing, text, sink);
            }
            OiaField::Typeahead { value } => self.set(StatusField::Typeahead, flag(*value, "T"), sink),
            OiaField::Unknown => tracing::debug!("ignoring unknown oia field"),
        }
    }

    /// Show the glyph for a connection state; unknown states leave the
    /// field as it was
    pub fn set_connection_state(&mut self, state: ConnectionState, sink: &mut dyn RenderSink) {
        match connection_glyph(state) {
            Some(glyph) => self.set(StatusField::Connection, glyph.to_string(), sink),
            None => tracing::debug!(?state, "no glyph for connection state"),
        }
    }

    /// Show the cursor position; a disabled cursor leaves the field as it was
    pub fn set_position(&mut self, cursor: Cursor, sink: &mut dyn RenderSink) {
        if let Some(text) = cursor.position_text() {
            self.set(StatusField::Position, text, sink);
        }
    }

    /// All fields joined by single spaces, blank fields included
    pub fn render_line(&self) -> String {
        self.fields.join(" ")
    }
}
