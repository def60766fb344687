//! Presentation contract
//!
//! The session core never reads from whatever draws the screen. It only
//! pushes notifications through a [`RenderSink`] after each mutation, and
//! the connection lifecycle uses the same handle to attach and detach the
//! rendered view across reconnects.

use std::ops::Range;

use crate::core::{Cell, Cursor, StatusField};
use crate::protocol::Indication;

/// Receiver of state-change notifications
///
/// Every method has an empty default so a frontend only implements what it
/// draws.
pub trait RenderSink {
    /// Cells in `columns` of the 0-indexed `row` changed; `cells` holds their
    /// new contents
    fn render_cells_changed(&mut self, row: usize, columns: Range<usize>, cells: &[Cell]) {
        let _ = (row, columns, cells);
    }

    /// The cursor was replaced
    fn render_cursor_moved(&mut self, cursor: Cursor) {
        let _ = cursor;
    }

    /// A status-line field has new rendered text
    fn render_status_field_changed(&mut self, field: StatusField, text: &str) {
        let _ = (field, text);
    }

    /// The connection is open; the view should show the buffer
    fn attach(&mut self) {}

    /// The connection dropped; stop showing the buffer but keep it
    fn detach(&mut self) {}

    /// An indication outside the modeled core (bell, popup, title, ...)
    fn passthrough(&mut self, indication: &Indication) {
        let _ = indication;
    }
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn render_cells_changed(&mut self, row: usize, columns: Range<usize>, cells: &[Cell]) {
        (**self).render_cells_changed(row, columns, cells)
    }

    fn render_cursor_moved(&mut self, cursor: Cursor) {
        (**self).render_cursor_moved(cursor)
    }

    fn render_status_field_changed(&mut self, field: StatusField, text: &str) {
        (**self).render_status_field_changed(field, text)
    }

    fn attach(&mut self) {
        (**self).attach()
    }

    fn detach(&mut self) {
        (**self).detach()
    }

    fn passthrough(&mut self, indication: &Indication) {
        (**self).passthrough(indication)
    }
}

/// Sink that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {}

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    CellsChanged { row: usize, columns: Range<usize> },
    CursorMoved(Cursor),
    StatusChanged { field: StatusField, text: String },
    Attach,
    Detach,
    Passthrough(String),
}

/// Sink that keeps every notification in order, for tests and tracing
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<RenderEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events
    pub fn take(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of individual cells reported as changed
    pub fn cells_touched(&self) -> usize {
        self.events
            .iter()
            .map(|event| match event {
                RenderEvent::CellsChanged { columns, .. } => columns.len(),
                _ => 0,
            })
            .sum()
    }
}

impl RenderSink for RecordingSink {
    fn render_cells_changed(&mut self, row: usize, columns: Range<usize>, _cells: &[Cell]) {
        self.events.push(RenderEvent::CellsChanged { row, columns });
    }

    fn render_cursor_moved(&mut self, cursor: Cursor) {
        self.events.push(RenderEvent::CursorMoved(cursor));
    }

    fn render_status_field_changed(&mut self, field: StatusField, text: &str) {
        self.events.push(RenderEvent::StatusChanged {
            field,
            text: text.to_string(),
        });
    }

    fn attach(&mut self) {
        self.events.push(RenderEvent::Attach);
    }

    fn detach(&mut self) {
        self.events.push(RenderEvent::Detach);
    }

    fn passthrough(&mut self, indication: &Indication) {
        self.events.push(RenderEvent::Passthrough(indication.tag().to_string()));
    }
}
