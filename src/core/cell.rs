//! Screen Cell
//!
//! Represents a single character position in the 3270 grid together with
//! its colors and graphic rendition flags.

use crate::protocol::{Color, GraphicRendition};

/// A single cell in the screen grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// One grapheme cluster; a space for a blank cell
    pub content: String,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Graphic rendition flags
    pub gr: GraphicRendition,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Color::DEFAULT_FG, Color::DEFAULT_BG)
    }
}

impl Cell {
    /// A space with the given colors and no renditions
    pub fn blank(fg: Color, bg: Color) -> Self {
        Self {
            content: " ".to_string(),
            fg,
            bg,
            gr: GraphicRendition::empty(),
        }
    }

    /// Create a cell holding `content` with explicit attributes
    pub fn with_attrs(content: impl Into<String>, fg: Color, bg: Color, gr: GraphicRendition) -> Self {
        Self {
            content: content.into(),
            fg,
            bg,
            gr,
        }
    }

    /// Check whether the cell still shows a space
    pub fn is_blank(&self) -> bool {
        self.content == " "
    }

    /// Overwrite only the attributes a change record carries
    pub(crate) fn repaint(&mut self, fg: Option<Color>, bg: Option<Color>, gr: Option<GraphicRendition>) {
        if let Some(fg) = fg {
            self.fg = fg;
        }
        if let Some(bg) = bg {
            self.bg = bg;
        }
        if let Some(gr) = gr {
            self.gr = gr;
        }
    }
}
