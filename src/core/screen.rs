//! Screen buffer implementation
//!
//! The screen is a rows x columns grid of cells plus the host cursor and the
//! default colors used for freshly created cells. The host addresses rows and
//! columns from 1; the grid is stored 0-indexed.
//!
//! Resizing never preserves content. Screen updates are validated in full
//! before any cell changes, so a rejected update leaves the grid untouched.

use unicode_segmentation::UnicodeSegmentation;

use super::cell::Cell;
use super::cursor::Cursor;
use crate::protocol::{Change, ChangePayload, Color, Erase, GraphicRendition, ScreenUpdate};
use crate::render::RenderSink;

/// A screen update addressed cells outside the grid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    #[error("row {row} outside screen of {rows} rows")]
    RowOutOfBounds { row: u16, rows: usize },

    #[error("row {row}: span at column {column} of {len} cells exceeds {cols} columns")]
    ColumnOutOfBounds {
        row: u16,
        column: u16,
        len: usize,
        cols: usize,
    },

    #[error("cursor at {row},{column} outside {rows}x{cols} screen")]
    CursorOutOfBounds {
        row: u16,
        column: u16,
        rows: usize,
        cols: usize,
    },
}

/// Result type for screen operations
pub type ScreenResult<T> = Result<T, ScreenError>;

/// The host screen
#[derive(Debug, Clone)]
pub struct Screen {
    /// Number of rows
    rows: usize,
    /// Number of columns
    cols: usize,
    /// Row-major cell grid
    grid: Vec<Vec<Cell>>,
    /// Foreground for newly created cells
    default_fg: Color,
    /// Background for newly created cells
    default_bg: Color,
    /// Host cursor
    cursor: Cursor,
}

impl Screen {
    /// Create a blank screen with the given dimensions and default colors
    pub fn new(rows: usize, cols: usize, default_fg: Color, default_bg: Color) -> Self {
        Self {
            rows,
            cols,
            grid: Self::blank_grid(rows, cols, default_fg, default_bg),
            default_fg,
            default_bg,
            cursor: Cursor::default(),
        }
    }

    fn blank_grid(rows: usize, cols: usize, fg: Color, bg: Color) -> Vec<Vec<Cell>> {
        (0..rows).map(|_| vec![Cell::blank(fg, bg); cols]).collect()
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn default_fg(&self) -> Color {
        self.default_fg
    }

    pub fn default_bg(&self) -> Color {
        self.default_bg
    }

    /// Get a cell by 0-indexed position
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|r| r.get(col))
    }

    /// Get a row by 0-indexed position
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.grid.get(row).map(Vec::as_slice)
    }

    /// Text of a 0-indexed row, one grapheme per cell
    pub fn row_text(&self, row: usize) -> String {
        self.row(row)
            .map(|cells| cells.iter().map(|cell| cell.content.as_str()).collect())
            .unwrap_or_default()
    }

    /// The cell under an enabled, in-bounds cursor
    pub fn cursor_cell(&self) -> Option<&Cell> {
        let (row, col) = self.cursor.cell_index(self.rows, self.cols)?;
        self.cell(row, col)
    }

    /// Rebuild the grid at the given size with default attributes.
    ///
    /// The cursor is kept as-is even if it no longer addresses a cell.
    pub fn resize(&mut self, rows: usize, cols: usize, sink: &mut dyn RenderSink) {
        self.rows = rows;
        self.cols = cols;
        self.grid = Self::blank_grid(rows, cols, self.default_fg, self.default_bg);
        self.redraw(sink);
    }

    /// Report every cell and the cursor to the sink
    pub fn redraw(&self, sink: &mut dyn RenderSink) {
        for (row, cells) in self.grid.iter().enumerate() {
            sink.render_cells_changed(row, 0..cells.len(), cells);
        }
        sink.render_cursor_moved(self.cursor);
    }

    /// Replace the cursor and report it
    pub fn set_cursor(&mut self, cursor: Cursor, sink: &mut dyn RenderSink) {
        self.cursor = cursor;
        sink.render_cursor_moved(cursor);
    }

    /// Apply an incremental screen update.
    ///
    /// Rows and the changes within each row apply in the order given; later
    /// changes win where spans overlap. The whole update is rejected, with no
    /// cell touched, if any span or the cursor falls outside the grid.
    pub fn apply_update(&mut self, update: &ScreenUpdate, sink: &mut dyn RenderSink) -> ScreenResult<()> {
        self.validate(update)?;

        for row_changes in &update.rows {
            let row = row_changes.row as usize - 1;
            for change in &row_changes.changes {
                self.apply_change(row, change, sink);
            }
        }

        if let Some(cursor) = update.cursor {
            self.set_cursor(cursor, sink);
        }
        Ok(())
    }

    fn validate(&self, update: &ScreenUpdate) -> ScreenResult<()> {
        for row_changes in &update.rows {
            let row = row_changes.row;
            if row == 0 || row as usize > self.rows {
                return Err(ScreenError::RowOutOfBounds { row, rows: self.rows });
            }
            for change in &row_changes.changes {
                let len = span_len(&change.payload);
                let column = change.column;
                let fits = (column as usize)
                    .checked_sub(1)
                    .and_then(|start| start.checked_add(len))
                    .is_some_and(|end| end <= self.cols);
                if !fits || column as usize > self.cols {
                    return Err(ScreenError::ColumnOutOfBounds {
                        row,
                        column,
                        len,
                        cols: self.cols,
                    });
                }
            }
        }

        if let Some(cursor @ Cursor::Enabled { row, column }) = update.cursor {
            if cursor.cell_index(self.rows, self.cols).is_none() {
                return Err(ScreenError::CursorOutOfBounds {
                    row,
                    column,
                    rows: self.rows,
                    cols: self.cols,
                });
            }
        }
        Ok(())
    }

    /// Apply one validated change record to a 0-indexed row
    fn apply_change(&mut self, row: usize, change: &Change, sink: &mut dyn RenderSink) {
        let start = change.column as usize - 1;
        let gr = change.gr.as_deref().map(GraphicRendition::from_spec);
        let cells = &mut self.grid[row];

        let end = match &change.payload {
            ChangePayload::Count(n) => {
                for cell in &mut cells[start..start + n] {
                    cell.repaint(change.fg, change.bg, gr);
                }
                start + n
            }
            ChangePayload::Text(text) => {
                let mut end = start;
                for (cell, grapheme) in cells[start..].iter_mut().zip(text.graphemes(true)) {
                    cell.repaint(change.fg, change.bg, gr);
                    cell.content.clear();
                    cell.content.push_str(grapheme);
                    end += 1;
                }
                end
            }
        };

        sink.render_cells_changed(row, start..end, &cells[start..end]);
    }

    /// Clear the screen, optionally switching default colors and size.
    ///
    /// New defaults only affect cells created by this and later resizes.
    pub fn erase(&mut self, erase: &Erase, sink: &mut dyn RenderSink) {
        if let Some(fg) = erase.fg {
            self.default_fg = fg;
        }
        if let Some(bg) = erase.bg {
            self.default_bg = bg;
        }

        let rows = erase.logical_rows.map_or(self.rows, usize::from);
        let cols = erase.logical_cols.map_or(self.cols, usize::from);
        self.resize(rows, cols, sink);
    }
}

/// Number of cells a change covers
fn span_len(payload: &ChangePayload) -> usize {
    match payload {
        ChangePayload::Count(n) => *n,
        ChangePayload::Text(text) => text.graphemes(true).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Snapshot, StatusLine};
    use crate::protocol::RowChanges;
    use crate::render::{NullSink, RecordingSink, RenderEvent};

    fn screen(rows: usize, cols: usize) -> Screen {
        Screen::new(rows, cols, Color::NeutralWhite, Color::NeutralBlack)
    }

    fn update(row: u16, changes: Vec<Change>) -> ScreenUpdate {
        ScreenUpdate {
            cursor: None,
            rows: vec![RowChanges { row, changes }],
        }
    }

    #[test]
    fn test_screen_new() {
        let screen = screen(24, 80);
        assert_eq!(screen.rows(), 24);
        assert_eq!(screen.cols(), 80);
        assert!(screen.cell(23, 79).unwrap().is_blank());
        assert!(screen.cell(24, 0).is_none());
    }

    #[test]
    fn test_resize_redraws_everything() {
        let mut screen = screen(2, 2);
        let mut sink = RecordingSink::new();
        screen.resize(3, 4, &mut sink);

        assert_eq!(screen.rows(), 3);
        assert_eq!(screen.cols(), 4);
        assert_eq!(sink.cells_touched(), 12);
        assert_eq!(sink.events.last(), Some(&RenderEvent::CursorMoved(Cursor::default())));
    }

    #[test]
    fn test_resize_discards_content() {
        let mut screen = screen(2, 5);
        screen
            .apply_update(&update(1, vec![Change::text(1, "AB")]), &mut NullSink)
            .unwrap();
        screen.resize(2, 5, &mut NullSink);
        assert_eq!(screen.row_text(0), "     ");
    }

    #[test]
    fn test_resize_same_size_is_idempotent() {
        let mut screen = screen(4, 12);
        let status = StatusLine::new();
        screen.resize(6, 20, &mut NullSink);
        let first = Snapshot::capture(&screen, &status);
        screen.resize(6, 20, &mut NullSink);
        let second = Snapshot::capture(&screen, &status);
        assert!(first.content_equals(&second));
        assert_eq!(first.to_text(), second.to_text());
    }

    #[test]
    fn test_resize_keeps_cursor() {
        let mut screen = screen(24, 80);
        screen.set_cursor(Cursor::at(20, 70), &mut NullSink);
        screen.resize(10, 40, &mut NullSink);
        assert_eq!(screen.cursor(), Cursor::at(20, 70));
        assert!(screen.cursor_cell().is_none());
    }

    #[test]
    fn test_text_change_sets_exact_span() {
        let mut screen = screen(3, 10);
        let mut sink = RecordingSink::new();
        screen
            .apply_update(&update(2, vec![Change::text(3, "HEY")]), &mut sink)
            .unwrap();

        assert_eq!(screen.row_text(1), "  HEY     ");
        assert_eq!(
            sink.events,
            vec![RenderEvent::CellsChanged { row: 1, columns: 2..5 }]
        );
    }

    #[test]
    fn test_count_change_keeps_characters() {
        let mut screen = screen(1, 6);
        screen
            .apply_update(&update(1, vec![Change::text(1, "ABCDEF")]), &mut NullSink)
            .unwrap();
        screen
            .apply_update(
                &update(1, vec![Change::count(2, 3).with_fg(Color::Red).with_gr("reverse")]),
                &mut NullSink,
            )
            .unwrap();

        assert_eq!(screen.row_text(0), "ABCDEF");
        assert_eq!(screen.cell(0, 0).unwrap().fg, Color::NeutralWhite);
        for col in 1..4 {
            let cell = screen.cell(0, col).unwrap();
            assert_eq!(cell.fg, Color::Red);
            assert_eq!(cell.gr, GraphicRendition::REVERSE);
        }
        assert_eq!(screen.cell(0, 4).unwrap().fg, Color::NeutralWhite);
    }

    #[test]
    fn test_absent_attributes_untouched() {
        let mut screen = screen(1, 4);
        screen
            .apply_update(
                &update(
                    1,
                    vec![Change::text(1, "ab")
                        .with_fg(Color::Yellow)
                        .with_bg(Color::Blue)
                        .with_gr("underline")],
                ),
                &mut NullSink,
            )
            .unwrap();
        screen
            .apply_update(&update(1, vec![Change::text(1, "cd")]), &mut NullSink)
            .unwrap();

        let cell = screen.cell(0, 0).unwrap();
        assert_eq!(cell.content, "c");
        assert_eq!(cell.fg, Color::Yellow);
        assert_eq!(cell.bg, Color::Blue);
        assert_eq!(cell.gr, GraphicRendition::UNDERLINE);
    }

    #[test]
    fn test_rendition_none_clears() {
        let mut screen = screen(1, 4);
        screen
            .apply_update(&update(1, vec![Change::count(1, 4).with_gr("blink,highlight")]), &mut NullSink)
            .unwrap();
        screen
            .apply_update(&update(1, vec![Change::count(1, 2).with_gr("none")]), &mut NullSink)
            .unwrap();

        assert!(screen.cell(0, 0).unwrap().gr.is_empty());
        assert!(screen.cell(0, 1).unwrap().gr.is_empty());
        assert_eq!(
            screen.cell(0, 2).unwrap().gr,
            GraphicRendition::BLINK | GraphicRendition::HIGHLIGHT
        );
    }

    #[test]
    fn test_overlapping_changes_later_wins() {
        let mut screen = screen(1, 8);
        screen
            .apply_update(
                &update(
                    1,
                    vec![
                        Change::text(1, "AAAAA").with_fg(Color::Red),
                        Change::text(4, "BBB").with_fg(Color::Green),
                    ],
                ),
                &mut NullSink,
            )
            .unwrap();

        assert_eq!(screen.row_text(0), "AAABBB  ");
        assert_eq!(screen.cell(0, 2).unwrap().fg, Color::Red);
        assert_eq!(screen.cell(0, 3).unwrap().fg, Color::Green);
        assert_eq!(screen.cell(0, 5).unwrap().fg, Color::Green);
    }

    #[test]
    fn test_text_payload_counts_graphemes() {
        let mut screen = screen(1, 4);
        screen
            .apply_update(&update(1, vec![Change::text(1, "e\u{301}x")]), &mut NullSink)
            .unwrap();
        assert_eq!(screen.cell(0, 0).unwrap().content, "e\u{301}");
        assert_eq!(screen.cell(0, 1).unwrap().content, "x");
        assert!(screen.cell(0, 2).unwrap().is_blank());
    }

    #[test]
    fn test_update_moves_cursor() {
        let mut screen = screen(24, 80);
        let mut sink = RecordingSink::new();
        let update = ScreenUpdate {
            cursor: Some(Cursor::at(5, 6)),
            rows: Vec::new(),
        };
        screen.apply_update(&update, &mut sink).unwrap();
        assert_eq!(screen.cursor(), Cursor::at(5, 6));
        assert_eq!(sink.events, vec![RenderEvent::CursorMoved(Cursor::at(5, 6))]);

        let disable = ScreenUpdate {
            cursor: Some(Cursor::Disabled),
            rows: Vec::new(),
        };
        screen.apply_update(&disable, &mut sink).unwrap();
        assert_eq!(screen.cursor(), Cursor::Disabled);
    }

    #[test]
    fn test_out_of_bounds_rejects_whole_update() {
        let mut screen = screen(2, 5);
        let bad = ScreenUpdate {
            cursor: None,
            rows: vec![
                RowChanges {
                    row: 1,
                    changes: vec![Change::text(1, "OK")],
                },
                RowChanges {
                    row: 2,
                    changes: vec![Change::text(4, "TOO LONG")],
                },
            ],
        };
        let mut sink = RecordingSink::new();
        let err = screen.apply_update(&bad, &mut sink).unwrap_err();

        assert!(matches!(err, ScreenError::ColumnOutOfBounds { row: 2, column: 4, .. }));
        assert_eq!(screen.row_text(0), "     ");
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_out_of_bounds_row_and_cursor() {
        let mut screen = screen(2, 5);
        assert_eq!(
            screen.apply_update(&update(3, vec![Change::count(1, 1)]), &mut NullSink),
            Err(ScreenError::RowOutOfBounds { row: 3, rows: 2 })
        );
        assert!(screen.apply_update(&update(0, vec![]), &mut NullSink).is_err());
        assert!(screen.apply_update(&update(1, vec![Change::count(0, 1)]), &mut NullSink).is_err());

        let cursor = ScreenUpdate {
            cursor: Some(Cursor::at(3, 1)),
            rows: Vec::new(),
        };
        assert!(matches!(
            screen.apply_update(&cursor, &mut NullSink),
            Err(ScreenError::CursorOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_huge_count_is_rejected() {
        let mut screen = screen(2, 5);
        let err = screen
            .apply_update(&update(1, vec![Change::count(2, usize::MAX)]), &mut NullSink)
            .unwrap_err();
        assert!(matches!(err, ScreenError::ColumnOutOfBounds { row: 1, column: 2, .. }));
        assert_eq!(screen.row_text(0), "     ");
    }

    #[test]
    fn test_erase_changes_defaults_and_size() {
        let mut screen = screen(24, 80);
        let erase = Erase {
            logical_rows: Some(43),
            logical_cols: Some(80),
            fg: Some(Color::Green),
            bg: Some(Color::Blue),
        };
        screen.erase(&erase, &mut NullSink);

        assert_eq!(screen.rows(), 43);
        assert_eq!(screen.default_fg(), Color::Green);
        let cell = screen.cell(42, 79).unwrap();
        assert_eq!(cell.fg, Color::Green);
        assert_eq!(cell.bg, Color::Blue);
    }

    #[test]
    fn test_erase_without_arguments_clears_in_place() {
        let mut screen = screen(3, 3);
        screen
            .apply_update(&update(2, vec![Change::text(1, "XYZ")]), &mut NullSink)
            .unwrap();
        let mut sink = RecordingSink::new();
        screen.erase(&Erase::default(), &mut sink);

        assert_eq!(screen.rows(), 3);
        assert_eq!(screen.cols(), 3);
        assert_eq!(screen.row_text(1), "   ");
        assert_eq!(sink.cells_touched(), 9);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_resize_yields_blank_grid(rows in 1usize..60, cols in 1usize..140) {
                let mut screen = screen(24, 80);
                let mut sink = RecordingSink::new();
                screen.resize(rows, cols, &mut sink);

                prop_assert_eq!(screen.rows(), rows);
                prop_assert_eq!(screen.cols(), cols);
                prop_assert_eq!(sink.cells_touched(), rows * cols);
                for row in 0..rows {
                    let cells = screen.row(row).unwrap();
                    prop_assert_eq!(cells.len(), cols);
                    prop_assert!(cells.iter().all(|cell| *cell == Cell::default()));
                }
            }

            #[test]
            fn prop_text_sets_exact_span(col in 1u16..=40, text in "[A-Z]{1,20}") {
                let mut screen = screen(2, 60);
                screen
                    .apply_update(&update(1, vec![Change::text(col, text.clone())]), &mut NullSink)
                    .unwrap();

                let start = col as usize - 1;
                let row = screen.row_text(0);
                prop_assert_eq!(&row[start..start + text.len()], text.as_str());
                prop_assert!(row[..start].chars().all(|c| c == ' '));
                prop_assert!(row[start + text.len()..].chars().all(|c| c == ' '));
                let second = screen.row_text(1);
                prop_assert_eq!(second.trim(), "");
            }

            #[test]
            fn prop_count_never_changes_text(col in 1u16..=30, n in 0usize..=30, fg in 0usize..16) {
                let colors = [
                    Color::NeutralBlack, Color::Blue, Color::Red, Color::Pink,
                    Color::Green, Color::Turquoise, Color::Yellow, Color::NeutralWhite,
                    Color::Black, Color::DeepBlue, Color::Orange, Color::Purple,
                    Color::PaleGreen, Color::PaleTurquoise, Color::Gray, Color::White,
                ];
                let mut screen = screen(1, 60);
                let text = "0123456789".repeat(6);
                screen.apply_update(&update(1, vec![Change::text(1, text.clone())]), &mut NullSink).unwrap();
                screen
                    .apply_update(
                        &update(1, vec![Change::count(col, n).with_fg(colors[fg]).with_gr("none")]),
                        &mut NullSink,
                    )
                    .unwrap();

                prop_assert_eq!(screen.row_text(0), text);
                let start = col as usize - 1;
                for c in start..start + n {
                    prop_assert_eq!(screen.cell(0, c).unwrap().fg, colors[fg]);
                }
            }
        }
    }
}
