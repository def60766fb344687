//! Connection lifecycle state machine
//!
//! States cycle `Connecting -> Open -> Closed -> Connecting` until shutdown.
//! Entering `Connecting` grows the backoff, reaching `Open` resets it and
//! attaches the presentation sink, and `Closed` detaches the sink and
//! yields the delay before the next attempt. Display state survives every
//! transition; only indications from the host change it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConnectionError, ConnectionResult, UserInput};
use crate::input;
use crate::protocol::{Indication, Operation};
use crate::render::RenderSink;
use crate::session::{DispatchError, Session};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closed,
}

/// How long to wait after a close before reconnecting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconnectDelay {
    /// Wait the current backoff value
    #[default]
    Backoff,
    /// Wait the backoff value capped at one second
    Constant,
}

/// Longest wait between reconnect attempts, in seconds
pub const MAX_BACKOFF_SECS: f64 = 24.0 * 60.0 * 60.0;

/// Reconnect backoff, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    current: f64,
    floor: f64,
    factor: f64,
    max: f64,
    delay: ReconnectDelay,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(1.0, 1.5, 30.0, ReconnectDelay::Backoff)
    }
}

impl Backoff {
    /// Start at `floor`, grow by `factor` per attempt, never exceed `max`.
    ///
    /// Both bounds are capped at [`MAX_BACKOFF_SECS`].
    pub fn new(floor: f64, factor: f64, max: f64, delay: ReconnectDelay) -> Self {
        let floor = floor.max(0.0).min(MAX_BACKOFF_SECS);
        Self {
            current: floor,
            floor,
            factor,
            max: max.max(floor).min(MAX_BACKOFF_SECS),
            delay,
        }
    }

    /// Current backoff in seconds
    pub fn seconds(&self) -> f64 {
        self.current
    }

    /// Grow before a connection attempt
    pub fn grow(&mut self) {
        self.current = (self.current * self.factor).clamp(self.floor, self.max);
    }

    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// Wait before the next attempt under the configured delay policy
    pub fn delay(&self) -> Duration {
        let secs = match self.delay {
            ReconnectDelay::Backoff => self.current,
            ReconnectDelay::Constant => self.current.min(1.0),
        };
        Duration::try_from_secs_f64(secs).unwrap_or_else(|_| Duration::from_secs_f64(self.max))
    }
}

/// Connection state machine owning the display state and its sink
#[derive(Debug)]
pub struct Lifecycle<S: RenderSink> {
    state: LinkState,
    backoff: Backoff,
    session: Session,
    sink: S,
    /// Whether the sink currently shows the screen
    attached: bool,
}

impl<S: RenderSink> Lifecycle<S> {
    pub fn new(session: Session, sink: S, backoff: Backoff) -> Self {
        Self {
            state: LinkState::Closed,
            backoff,
            session,
            sink,
            attached: false,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Enter `Connecting`, growing the backoff
    pub fn begin_connect(&mut self) {
        self.backoff.grow();
        self.state = LinkState::Connecting;
        tracing::info!(backoff = self.backoff.seconds(), "connecting");
    }

    /// The connection is up: reset backoff and attach the sink
    pub fn opened(&mut self) {
        self.state = LinkState::Open;
        self.backoff.reset();
        if !self.attached {
            self.attached = true;
            self.sink.attach();
        }
        tracing::info!("connection open");
    }

    /// The connection went away; returns the delay before reconnecting
    pub fn closed(&mut self) -> Duration {
        self.state = LinkState::Closed;
        self.detach();
        let delay = self.backoff.delay();
        tracing::info!(?delay, "connection closed, reconnect scheduled");
        delay
    }

    /// Stop for good
    pub fn shutdown(&mut self) {
        self.state = LinkState::Closed;
        self.detach();
        tracing::info!("shut down");
    }

    fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.sink.detach();
        }
    }

    /// Handle one inbound message.
    ///
    /// Undecodable messages are logged and dropped. A message that cannot be
    /// applied means the session is out of sync with the host; the caller
    /// should drop the connection so the host resends full state.
    pub fn receive(&mut self, text: &str) -> Result<(), DispatchError> {
        let indication = match Indication::decode(text) {
            Ok(indication) => indication,
            Err(err) => {
                tracing::warn!(error = %err, "dropping undecodable message");
                return Ok(());
            }
        };

        self.session.dispatch(&indication, &mut self.sink).map_err(|err| {
            tracing::error!(error = %err, "session out of sync with host");
            err
        })
    }

    /// Encode user input for the host; `None` when the input maps to no
    /// action
    pub fn outbound(&self, msg: &UserInput) -> ConnectionResult<Option<String>> {
        if self.state != LinkState::Open {
            return Err(ConnectionError::NotOpen);
        }

        let actions = match msg {
            UserInput::Key(press) => match input::translate(press) {
                Some(translation) => vec![translation.action],
                None => return Ok(None),
            },
            UserInput::Actions(actions) if actions.is_empty() => return Ok(None),
            UserInput::Actions(actions) => actions.clone(),
        };

        Ok(Some(Operation::run(actions).encode()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cursor, StatusField};
    use crate::input::KeyPress;
    use crate::protocol::Action;
    use crate::render::{RecordingSink, RenderEvent};

    fn lifecycle() -> Lifecycle<RecordingSink> {
        Lifecycle::new(Session::default(), RecordingSink::new(), Backoff::default())
    }

    fn close_enough(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_backoff_grows_and_clamps() {
        let mut backoff = Backoff::default();
        assert_eq!(backoff.seconds(), 1.0);
        for n in 1..=20 {
            backoff.grow();
            let expected = 1.5f64.powi(n).min(30.0);
            assert!(close_enough(backoff.seconds(), expected), "n={n}");
        }
        assert_eq!(backoff.seconds(), 30.0);

        backoff.reset();
        assert_eq!(backoff.seconds(), 1.0);
    }

    #[test]
    fn test_backoff_floor() {
        let mut backoff = Backoff::new(1.0, 0.5, 30.0, ReconnectDelay::Backoff);
        backoff.grow();
        assert_eq!(backoff.seconds(), 1.0);
    }

    #[test]
    fn test_backoff_ceiling() {
        let mut backoff = Backoff::new(1.0, 1.5, 1e30, ReconnectDelay::Backoff);
        for _ in 0..200 {
            backoff.grow();
        }
        assert_eq!(backoff.seconds(), MAX_BACKOFF_SECS);
        assert_eq!(backoff.delay(), Duration::from_secs_f64(MAX_BACKOFF_SECS));

        let huge_floor = Backoff::new(1e300, 2.0, 1e300, ReconnectDelay::Backoff);
        assert_eq!(huge_floor.delay(), Duration::from_secs_f64(MAX_BACKOFF_SECS));

        let mut nan_factor = Backoff::new(1.0, f64::NAN, 30.0, ReconnectDelay::Backoff);
        nan_factor.grow();
        assert_eq!(nan_factor.delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_reconnect_delay_policies() {
        let mut backoff = Backoff::default();
        backoff.grow();
        backoff.grow();
        assert_eq!(backoff.delay(), Duration::from_secs_f64(2.25));

        let mut constant = Backoff::new(1.0, 1.5, 30.0, ReconnectDelay::Constant);
        constant.grow();
        constant.grow();
        assert_eq!(constant.delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_failed_attempts_then_open() {
        let mut lc = lifecycle();
        for _ in 0..3 {
            lc.begin_connect();
            assert_eq!(lc.state(), LinkState::Connecting);
            lc.closed();
        }
        assert!(close_enough(lc.backoff().seconds(), 1.5f64.powi(3)));
        assert!(lc.sink().events.is_empty());

        lc.begin_connect();
        lc.opened();
        assert_eq!(lc.state(), LinkState::Open);
        assert_eq!(lc.backoff().seconds(), 1.0);
        assert_eq!(lc.sink().events, vec![RenderEvent::Attach]);
        assert!(lc.is_attached());
    }

    #[test]
    fn test_close_detaches_and_keeps_screen() {
        let mut lc = lifecycle();
        lc.begin_connect();
        lc.opened();
        lc.receive(r#"{"screen":{"rows":[{"row":1,"changes":[{"column":1,"text":"KEEP"}]}]}}"#)
            .unwrap();
        lc.sink_mut().take();

        let delay = lc.closed();
        assert_eq!(delay, Duration::from_secs(1));
        assert_eq!(lc.sink().events, vec![RenderEvent::Detach]);
        assert!(!lc.is_attached());
        assert!(lc.session().screen().row_text(0).starts_with("KEEP"));

        lc.begin_connect();
        lc.opened();
        assert!(lc.session().screen().row_text(0).starts_with("KEEP"));
    }

    #[test]
    fn test_receive_drops_garbage() {
        let mut lc = lifecycle();
        assert!(lc.receive("{{{{").is_ok());
        assert!(lc.receive(r#"{"screen-mode":{"rows":"x"}}"#).is_ok());
        assert_eq!(lc.session().screen().rows(), 24);
    }

    #[test]
    fn test_receive_reports_desync() {
        let mut lc = lifecycle();
        let result = lc.receive(r#"{"screen":{"cursor":{"enabled":true,"row":99,"column":1}}}"#);
        assert!(result.is_err());
        assert_eq!(lc.session().screen().cursor(), Cursor::default());
    }

    #[test]
    fn test_receive_routes_status() {
        let mut lc = lifecycle();
        lc.receive(r#"{"oia":{"field":"lock"}}"#).unwrap();
        assert_eq!(lc.session().status().get(StatusField::Lock), "READY");
    }

    #[test]
    fn test_outbound_requires_open() {
        let mut lc = lifecycle();
        let key = UserInput::Key(KeyPress::plain("a"));
        assert!(matches!(lc.outbound(&key), Err(ConnectionError::NotOpen)));

        lc.begin_connect();
        assert!(matches!(lc.outbound(&key), Err(ConnectionError::NotOpen)));

        lc.opened();
        assert_eq!(
            lc.outbound(&key).unwrap().as_deref(),
            Some(r#"{"run":{"actions":[{"action":"Key","args":["a"]}]}}"#)
        );
    }

    #[test]
    fn test_outbound_unmapped_and_batches() {
        let mut lc = lifecycle();
        lc.begin_connect();
        lc.opened();
        assert_eq!(lc.outbound(&UserInput::Key(KeyPress::plain("Shift"))).unwrap(), None);
        assert_eq!(lc.outbound(&UserInput::Actions(Vec::new())).unwrap(), None);

        let batch = UserInput::Actions(vec![Action::new("Clear"), Action::with_args("String", ["logon"])]);
        assert_eq!(
            lc.outbound(&batch).unwrap().as_deref(),
            Some(r#"{"run":{"actions":[{"action":"Clear","args":[]},{"action":"String","args":["logon"]}]}}"#)
        );
    }

    #[test]
    fn test_shutdown_detaches_once() {
        let mut lc = lifecycle();
        lc.begin_connect();
        lc.opened();
        lc.shutdown();
        lc.shutdown();
        assert_eq!(lc.sink().events, vec![RenderEvent::Attach, RenderEvent::Detach]);
    }
}
