//! Input Translation Module
//!
//! Translates key presses into host actions. Key identity uses DOM-style
//! names: a printable key is the text it types (`"a"`, `"%"`), named keys
//! use their name (`"Enter"`, `"ArrowUp"`, `"F3"`).
//!
//! # Translation order
//!
//! 1. A single printable character without Ctrl or Alt types that
//!    character. Shift alone is allowed since it is already reflected in
//!    the character.
//! 2. The modifier-prefixed key name (`C+`, `M+`, `S+`, then the key) is
//!    looked up in a fixed key map.
//! 3. `F<n>` sends program function key `n`, or `n + 13` with Shift.
//! 4. Anything else is left unhandled.
//!
//! Translation is a pure function of the key press.

use unicode_segmentation::UnicodeSegmentation;

use crate::protocol::Action;

/// Offset added to a function key number while Shift is held
pub const SHIFT_PF_OFFSET: u32 = 13;

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const ALT: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: true,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };

    /// Key map prefix, always in Ctrl, Alt, Shift order
    pub fn prefix(&self) -> String {
        let mut prefix = String::new();
        if self.ctrl {
            prefix.push_str("C+");
        }
        if self.alt {
            prefix.push_str("M+");
        }
        if self.shift {
            prefix.push_str("S+");
        }
        prefix
    }

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// A key-down event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// A key press with no modifiers held
    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Modifier-prefixed name used for key map lookups, e.g. `S+Tab`
    pub fn composite_name(&self) -> String {
        format!("{}{}", self.modifiers.prefix(), self.key)
    }

    /// The typed character, if this is a single printable grapheme
    fn printable(&self) -> Option<&str> {
        let mut graphemes = self.key.graphemes(true);
        let first = graphemes.next()?;
        if graphemes.next().is_some() || first.chars().any(char::is_control) {
            return None;
        }
        Some(first)
    }

    /// Number of an `F<digits>` key
    fn function_key(&self) -> Option<u32> {
        let digits = self.key.strip_prefix('F')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// How far the event should stop travelling once handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Stop propagation only
    Stop,
    /// Stop propagation and suppress the default handling
    StopAndPreventDefault,
    /// Stop every other handler, including ones on the same target
    StopImmediate,
}

/// Outcome of translating a handled key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub action: Action,
    pub propagation: Propagation,
}

/// Fixed key map: composite key name to action and arguments
const KEYMAP: &[(&str, &str, &[&str])] = &[
    ("PageUp", "Scroll", &["backward"]),
    ("PageDown", "Scroll", &["forward"]),
    ("Backspace", "Backspace", &[]),
    ("Enter", "Enter", &[]),
    ("Tab", "Tab", &[]),
    ("S+Tab", "Backtab", &[]),
    ("ArrowUp", "Up", &[]),
    ("ArrowDown", "Down", &[]),
    ("ArrowRight", "Right", &[]),
    ("ArrowLeft", "Left", &[]),
    ("M+r", "Reset", &[]),
    ("M+a", "Attn", &[]),
    ("M+c", "Reconnect", &[]),
    ("Insert", "Toggle", &["insertMode"]),
];

fn lookup(composite: &str) -> Option<Action> {
    KEYMAP
        .iter()
        .find(|(name, _, _)| *name == composite)
        .map(|(_, action, args)| Action::with_args(*action, args.iter().copied()))
}

/// Translate a key press into at most one action
pub fn translate(press: &KeyPress) -> Option<Translation> {
    let modifiers = press.modifiers;

    if !modifiers.ctrl && !modifiers.alt {
        if let Some(text) = press.printable() {
            return Some(Translation {
                action: Action::with_args("Key", [text]),
                propagation: Propagation::Stop,
            });
        }
    }

    let composite = press.composite_name();
    if let Some(action) = lookup(&composite) {
        return Some(Translation {
            action,
            propagation: Propagation::StopAndPreventDefault,
        });
    }

    // An offset past u32::MAX names no key
    let number = press.function_key().and_then(|number| {
        if modifiers.shift {
            number.checked_add(SHIFT_PF_OFFSET)
        } else {
            Some(number)
        }
    });
    if let Some(number) = number {
        return Some(Translation {
            action: Action::with_args("PF", [number.to_string()]),
            propagation: Propagation::StopImmediate,
        });
    }

    tracing::trace!(key = %composite, "unmapped key");
    None
}

/// Key presses for a line of typed text followed by Enter
pub fn type_line(line: &str) -> Vec<KeyPress> {
    line.graphemes(true)
        .map(KeyPress::plain)
        .chain(std::iter::once(KeyPress::plain("Enter")))
        .collect()
}
