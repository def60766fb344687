//! Shared wire types
//!
//! Colors and graphic renditions appear both in screen updates and in erase
//! indications, so they live here rather than with either message.

use std::fmt::{self, Display, Formatter, Write};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// 3270 color as named by the host protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Color {
    NeutralBlack,
    Blue,
    Red,
    Pink,
    Green,
    Turquoise,
    Yellow,
    NeutralWhite,
    Black,
    DeepBlue,
    Orange,
    Purple,
    PaleGreen,
    PaleTurquoise,
    Gray,
    White,
}

impl Color {
    /// Default foreground for a fresh session
    pub const DEFAULT_FG: Color = Color::NeutralWhite;
    /// Default background for a fresh session
    pub const DEFAULT_BG: Color = Color::NeutralBlack;

    /// Wire name of this color
    pub fn name(self) -> &'static str {
        match self {
            Color::NeutralBlack => "neutralBlack",
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Pink => "pink",
            Color::Green => "green",
            Color::Turquoise => "turquoise",
            Color::Yellow => "yellow",
            Color::NeutralWhite => "neutralWhite",
            Color::Black => "black",
            Color::DeepBlue => "deepBlue",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::PaleGreen => "paleGreen",
            Color::PaleTurquoise => "paleTurquoise",
            Color::Gray => "gray",
            Color::White => "white",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of graphic rendition flags applied to a cell
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct GraphicRendition: u16 {
        const UNDERLINE   = 0x001;
        const BLINK       = 0x002;
        const HIGHLIGHT   = 0x004;
        const SELECTABLE  = 0x008;
        const REVERSE     = 0x010;
        const WIDE        = 0x020;
        const ORDER       = 0x040;
        const PRIVATE_USE = 0x080;
        const NO_COPY     = 0x100;
        const WRAP        = 0x200;
    }
}

static FLAG_NAMES: &[(GraphicRendition, &str)] = &[
    (GraphicRendition::UNDERLINE, "underline"),
    (GraphicRendition::BLINK, "blink"),
    (GraphicRendition::HIGHLIGHT, "highlight"),
    (GraphicRendition::SELECTABLE, "selectable"),
    (GraphicRendition::REVERSE, "reverse"),
    (GraphicRendition::WIDE, "wide"),
    (GraphicRendition::ORDER, "order"),
    (GraphicRendition::PRIVATE_USE, "private-use"),
    (GraphicRendition::NO_COPY, "no-copy"),
    (GraphicRendition::WRAP, "wrap"),
];

impl GraphicRendition {
    /// Look up a single flag by its wire name
    pub fn from_wire_name(name: &str) -> Option<Self> {
        FLAG_NAMES
            .iter()
            .find(|(_, flag_name)| *flag_name == name)
            .map(|(flag, _)| *flag)
    }

    /// Parse a rendition spec from a screen change.
    ///
    /// `"none"` (and the older `"default"`) clear every flag; anything else is
    /// a comma-joined list of flag names. Unrecognized names are skipped so a
    /// newer host cannot break an older client.
    pub fn from_spec(spec: &str) -> Self {
        if spec == "none" || spec == "default" {
            return Self::empty();
        }
        spec.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .fold(Self::empty(), |acc, name| match Self::from_wire_name(name) {
                Some(flag) => acc | flag,
                None => {
                    tracing::debug!(name, "Ignoring unknown graphic rendition");
                    acc
                }
            })
    }

    /// Wire names of the flags in this set, in protocol order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        FLAG_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

impl Display for GraphicRendition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (n, name) in self.names().enumerate() {
            if n != 0 {
                f.write_char(',')?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_list() {
        assert_eq!(
            GraphicRendition::from_spec("underline,blink"),
            GraphicRendition::BLINK | GraphicRendition::UNDERLINE
        );
        assert_eq!(
            GraphicRendition::from_spec("private-use,no-copy"),
            GraphicRendition::PRIVATE_USE | GraphicRendition::NO_COPY
        );
    }

    #[test]
    fn test_wire_name_lookup() {
        assert_eq!(
            GraphicRendition::from_wire_name("private-use"),
            Some(GraphicRendition::PRIVATE_USE)
        );
        assert_eq!(GraphicRendition::from_wire_name("PRIVATE_USE"), None);
        assert_eq!(GraphicRendition::from_wire_name("sparkle"), None);
    }

    #[test]
    fn test_spec_none() {
        assert!(GraphicRendition::from_spec("none").is_empty());
        assert!(GraphicRendition::from_spec("default").is_empty());
    }

    #[test]
    fn test_spec_skips_unknown() {
        assert_eq!(
            GraphicRendition::from_spec("highlight,sparkle"),
            GraphicRendition::HIGHLIGHT
        );
    }

    #[test]
    fn test_display() {
        let gr = GraphicRendition::SELECTABLE | GraphicRendition::HIGHLIGHT;
        assert_eq!(gr.to_string(), "highlight,selectable");
        assert_eq!(GraphicRendition::empty().to_string(), "none");
    }

    #[test]
    fn test_color_wire_names() {
        assert_eq!(serde_json::to_string(&Color::NeutralWhite).unwrap(), r#""neutralWhite""#);
        let color: Color = serde_json::from_str(r#""paleTurquoise""#).unwrap();
        assert_eq!(color, Color::PaleTurquoise);
        assert_eq!(Color::DeepBlue.to_string(), "deepBlue");
    }
}
