//! Cursor state
//!
//! The host either hides the cursor or places it at a 1-indexed row and
//! column. Updates always replace the cursor wholesale; there is no relative
//! movement on the client side.

use serde::{Deserialize, Serialize};

/// Cursor as last reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CursorWire", into = "CursorWire")]
pub enum Cursor {
    /// No cursor is displayed
    Disabled,
    /// Cursor shown at a 1-indexed position
    Enabled { row: u16, column: u16 },
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::Enabled { row: 1, column: 1 }
    }
}

impl Cursor {
    /// Create an enabled cursor at a 1-indexed position
    pub fn at(row: u16, column: u16) -> Self {
        Cursor::Enabled { row, column }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Cursor::Enabled { .. })
    }

    /// Zero-indexed (row, col) if the cursor is enabled and addresses a cell
    /// inside a grid of the given size
    pub fn cell_index(&self, rows: usize, cols: usize) -> Option<(usize, usize)> {
        match *self {
            Cursor::Disabled => None,
            Cursor::Enabled { row, column } => {
                let (row, col) = (row as usize, column as usize);
                (row >= 1 && row <= rows && col >= 1 && col <= cols).then(|| (row - 1, col - 1))
            }
        }
    }

    /// Status-line position text: column then row, zero padded to three digits
    pub fn position_text(&self) -> Option<String> {
        match *self {
            Cursor::Disabled => None,
            Cursor::Enabled { row, column } => Some(format!("{:03}/{:03}", column, row)),
        }
    }
}

/// Flat wire shape: `{"enabled":false}` or `{"enabled":true,"row":r,"column":c}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CursorWire {
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    row: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<u16>,
}

impl TryFrom<CursorWire> for Cursor {
    type Error = String;

    fn try_from(wire: CursorWire) -> Result<Self, Self::Error> {
        match wire {
            CursorWire { enabled: false, .. } => Ok(Cursor::Disabled),
            CursorWire {
                enabled: true,
                row: Some(row),
                column: Some(column),
            } => Ok(Cursor::Enabled { row, column }),
            _ => Err("enabled cursor requires row and column".to_string()),
        }
    }
}

impl From<Cursor> for CursorWire {
    fn from(cursor: Cursor) -> Self {
        match cursor {
            Cursor::Disabled => CursorWire {
                enabled: false,
                row: None,
                column: None,
            },
            Cursor::Enabled { row, column } => CursorWire {
                enabled: true,
                row: Some(row),
                column: Some(column),
            },
        }
    }
}
