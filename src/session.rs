//! Indication Dispatcher
//!
//! Ties the decoded host protocol to the display state. A [`Session`] owns
//! the screen buffer and the status strip as one unit and routes every
//! indication to whichever of them it targets, reporting changes to a
//! [`RenderSink`]. Anything outside the modeled core is handed to the sink
//! untouched.

use crate::core::{Screen, ScreenError, Snapshot, StatusLine};
use crate::protocol::{Color, Connection, DecodeError, Indication, ScreenMode};
use crate::render::RenderSink;

/// A well-formed indication could not be applied
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("'{tag}' indication rejected: {source}")]
    Screen {
        tag: &'static str,
        #[source]
        source: ScreenError,
    },
}

/// Display state for one host session
#[derive(Debug, Clone)]
pub struct Session {
    /// The host screen
    screen: Screen,
    /// The status strip
    status: StatusLine,
    /// Last connection indication
    connection: Option<Connection>,
    /// Last screen-mode indication
    screen_mode: Option<ScreenMode>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(24, 80, Color::DEFAULT_FG, Color::DEFAULT_BG)
    }
}

impl Session {
    /// Create a session with a blank screen of the given size
    pub fn new(rows: usize, cols: usize, fg: Color, bg: Color) -> Self {
        Self {
            screen: Screen::new(rows, cols, fg, bg),
            status: StatusLine::new(),
            connection: None,
            screen_mode: None,
        }
    }

    /// Get a reference to the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Get a reference to the status strip
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn screen_mode(&self) -> Option<&ScreenMode> {
        self.screen_mode.as_ref()
    }

    /// Capture the current display state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.screen, &self.status)
    }

    /// Decode one message and dispatch it.
    ///
    /// Decode failures are returned before any state changes.
    pub fn process(&mut self, text: &str, sink: &mut dyn RenderSink) -> Result<(), ProcessError> {
        let indication = Indication::decode(text)?;
        self.dispatch(&indication, sink)?;
        Ok(())
    }

    /// Route one indication to the state it targets
    pub fn dispatch(&mut self, indication: &Indication, sink: &mut dyn RenderSink) -> Result<(), DispatchError> {
        match indication {
            Indication::Initialize(batch) => {
                for member in batch {
                    self.dispatch(member, sink)?;
                }
            }
            Indication::ScreenMode(mode) => {
                self.screen_mode = Some(*mode);
                self.screen.resize(mode.rows as usize, mode.columns as usize, sink);
            }
            Indication::Screen(update) => {
                self.screen
                    .apply_update(update, sink)
                    .map_err(|source| DispatchError::Screen { tag: "screen", source })?;
                if let Some(cursor) = update.cursor {
                    self.status.set_position(cursor, sink);
                }
            }
            Indication::Erase(erase) => self.screen.erase(erase, sink),
            Indication::Connection(connection) => {
                tracing::debug!(state = ?connection.state, host = ?connection.host, "host connection changed");
                self.status.set_connection_state(connection.state, sink);
                self.connection = Some(connection.clone());
            }
            Indication::Oia(field) => self.status.apply_oia(field, sink),
            other => {
                tracing::debug!(tag = other.tag(), "passing indication through");
                sink.passthrough(other);
            }
        }
        Ok(())
    }
}

/// Error from [`Session::process`]
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
