//! Deterministic snapshot generation
//!
//! Snapshots capture the screen and status strip in a serializable format
//! for testing, replay and debugging. Replaying the same message stream
//! must produce identical snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::cursor::Cursor;
use super::screen::Screen;
use super::status::StatusLine;
use crate::protocol::Color;

/// A complete snapshot of the session display state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub rows: usize,
    pub cols: usize,
    /// Grid content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    /// Cursor state
    pub cursor: Cursor,
    /// Status fields keyed by name
    pub status: BTreeMap<String, String>,
    /// The status strip as one line
    pub status_line: String,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Character content
    pub content: String,
    pub fg: Color,
    pub bg: Color,
    /// Graphic renditions, `"none"` when empty
    pub gr: String,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            content: cell.content.clone(),
            fg: cell.fg,
            bg: cell.bg,
            gr: cell.gr.to_string(),
        }
    }
}

impl Snapshot {
    /// Capture the current screen and status strip
    pub fn capture(screen: &Screen, status: &StatusLine) -> Self {
        let grid = (0..screen.rows())
            .map(|row| {
                screen
                    .row(row)
                    .unwrap_or_default()
                    .iter()
                    .map(CellSnapshot::from)
                    .collect()
            })
            .collect();

        Snapshot {
            rows: screen.rows(),
            cols: screen.cols(),
            grid,
            cursor: screen.cursor(),
            status: status
                .iter()
                .map(|(field, text)| (field.name().to_string(), text.to_string()))
                .collect(),
            status_line: status.render_line(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text rendering: grid rows then the status line
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row {
                result.push_str(&cell.content);
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        let status = self.status_line.trim_end();
        if !status.is_empty() {
            result.push_str(status);
            result.push('\n');
        }

        result
    }

    /// Compare grid contents and cursor, ignoring the status strip
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.cursor == other.cursor && self.grid == other.grid
    }
}
