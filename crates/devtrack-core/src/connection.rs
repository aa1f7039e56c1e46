//! Connection state machine.
//!
//! Owns one logical connection to a named server-side action and decides
//! when to reopen it. The transport itself (a WebSocket in practice) lives
//! in the driver; this module only sees its events.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods take the event data (generation, payload, entropy) as arguments
//! - Methods return `Vec<ConnectionAction>`
//! - Driver code executes actions (open a socket, arm a timer, ...)
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐  open   ┌────────────┐  on_open  ┌──────┐
//! │ Idle │────────>│ Connecting │──────────>│ Open │
//! └──────┘         └────────────┘           └──────┘
//!                     ↑     │ on_close          │ on_close
//!       reconnect     │     ↓                   ↓
//!       timer         │  ┌────────┐<────────────┘
//!                     └──│ Closed │
//!                        └────────┘
//! ```
//!
//! `dispose()` moves any state to `Disposed`, after which every event is
//! ignored.
//!
//! # Generations
//!
//! Every open attempt gets a new generation number. Events and timers carry
//! the generation they belong to, so a late close from a replaced socket or
//! a timer armed before `dispose()` cannot trigger a second reconnect.
//!
//! # Retry
//!
//! Each close of the current attempt schedules exactly one reconnect. The
//! default policy waits a fixed 2 seconds and never gives up.

use std::time::Duration;

use devtrack_proto::{Envelope, ProtocolError};
use tracing::{debug, info, warn};

use crate::error::ConnectionError;

/// Actions returned by the connection state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Open a new transport connection for `action`, replacing any prior one.
    Open {
        /// Server-side action (channel) name.
        action: String,
        /// Generation the resulting transport events must carry.
        generation: u64,
    },

    /// Send a text frame over the open connection.
    Send(String),

    /// Call back `on_reconnect_timer(generation)` after `delay`.
    ScheduleReconnect {
        /// Time to wait before reopening.
        delay: Duration,
        /// Generation of the attempt that closed.
        generation: u64,
    },

    /// A decoded envelope for the owner to apply.
    Dispatch(Envelope),
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never opened
    Idle,
    /// Open requested, transport not yet confirmed
    Connecting,
    /// Transport confirmed open
    Open,
    /// Transport closed, reconnect pending
    Closed,
    /// Owner is gone, all events ignored
    Disposed,
}

/// Delay between a close and the next open attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Same delay after every close, forever.
    Fixed(Duration),

    /// Doubling delay starting at `initial`, capped at `max`, reset after a
    /// successful open. With `jitter` the delay is drawn uniformly from the
    /// upper half of the computed value.
    Exponential {
        /// Delay after the first close.
        initial: Duration,
        /// Ceiling for the delay.
        max: Duration,
        /// Randomize within `[delay / 2, delay]`.
        jitter: bool,
    },
}

impl ReconnectPolicy {
    /// Delay used by the default fixed policy.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

    /// Delay before reconnect number `attempt` (zero based).
    ///
    /// `entropy` is only consulted when jitter is enabled.
    pub fn delay(&self, attempt: u32, entropy: u64) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { initial, max, jitter } => {
                let factor = 1u32 << attempt.min(31);
                let delay = initial.saturating_mul(factor).min(max);
                if !jitter || delay.is_zero() {
                    return delay;
                }

                let floor = delay / 2;
                let span = (delay - floor).as_millis() as u64;
                floor + Duration::from_millis(entropy % (span + 1))
            },
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::Fixed(Self::DEFAULT_DELAY)
    }
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server-side action (channel) name passed to the transport on open.
    pub action: String,
    /// Retry policy after a close.
    pub reconnect: ReconnectPolicy,
}

impl ConnectionConfig {
    /// Config for `action` with the default retry policy.
    pub fn new(action: impl Into<String>) -> Self {
        Self { action: action.into(), reconnect: ReconnectPolicy::default() }
    }
}

/// Connection state machine
///
/// Pure state: no sockets, no timers. See the module docs for the lifecycle.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    config: ConnectionConfig,
    state: ConnectionState,
    /// Generation of the most recent open attempt (0 before the first).
    generation: u64,
    /// Generation whose reconnect timer is armed.
    pending_reconnect: Option<u64>,
    /// Closes since the last successful open.
    retries: u32,
}

impl ConnectionManager {
    /// Create a manager in `Idle` state.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Idle,
            generation: 0,
            pending_reconnect: None,
            retries: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Generation of the most recent open attempt.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Server-side action name.
    pub fn action(&self) -> &str {
        &self.config.action
    }

    /// Generation whose reconnect timer is armed, if any.
    pub fn pending_reconnect(&self) -> Option<u64> {
        self.pending_reconnect
    }

    /// Start a new open attempt, superseding any previous one.
    pub fn open(&mut self) -> Vec<ConnectionAction> {
        if self.state == ConnectionState::Disposed {
            return vec![];
        }

        self.generation += 1;
        self.state = ConnectionState::Connecting;
        self.pending_reconnect = None;

        debug!(action = %self.config.action, generation = self.generation, "opening connection");
        vec![ConnectionAction::Open {
            action: self.config.action.clone(),
            generation: self.generation,
        }]
    }

    /// Transport for `generation` reports open.
    pub fn on_open(&mut self, generation: u64) -> Vec<ConnectionAction> {
        if !self.is_current(generation) || self.state != ConnectionState::Connecting {
            debug!(generation, state = ?self.state, "ignoring stale open");
            return vec![];
        }

        self.state = ConnectionState::Open;
        self.retries = 0;
        info!(action = %self.config.action, generation, "connection open");
        vec![]
    }

    /// Raw text frame received on `generation`.
    ///
    /// Malformed frames and unknown kinds are logged and dropped; the
    /// connection stays up.
    pub fn on_message(&mut self, generation: u64, raw: &str) -> Vec<ConnectionAction> {
        if !self.is_current(generation) || !self.is_live() {
            debug!(generation, state = ?self.state, "ignoring message from stale connection");
            return vec![];
        }

        match Envelope::decode(raw) {
            Ok(envelope) => vec![ConnectionAction::Dispatch(envelope)],
            Err(ProtocolError::UnknownKind { kind }) => {
                info!(%kind, "unknown message type");
                vec![]
            },
            Err(error) => {
                warn!(%error, payload = raw, "dropping undecodable message");
                vec![]
            },
        }
    }

    /// Transport for `generation` closed.
    ///
    /// Schedules one reconnect. Repeated or stale closes schedule nothing.
    pub fn on_close(
        &mut self,
        generation: u64,
        reason: &str,
        entropy: u64,
    ) -> Vec<ConnectionAction> {
        if !self.is_current(generation) || !self.is_live() {
            debug!(generation, state = ?self.state, "ignoring stale close");
            return vec![];
        }

        let delay = self.config.reconnect.delay(self.retries, entropy);
        self.retries = self.retries.saturating_add(1);
        self.state = ConnectionState::Closed;
        self.pending_reconnect = Some(generation);

        info!(reason, generation, delay_ms = delay.as_millis() as u64, "connection closed");
        vec![ConnectionAction::ScheduleReconnect { delay, generation }]
    }

    /// Reconnect timer armed for `generation` fired.
    pub fn on_reconnect_timer(&mut self, generation: u64) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Closed || self.pending_reconnect != Some(generation) {
            debug!(generation, state = ?self.state, "ignoring stale reconnect timer");
            return vec![];
        }

        self.open()
    }

    /// Queue a text frame on the open connection.
    pub fn send(&self, text: impl Into<String>) -> Result<ConnectionAction, ConnectionError> {
        if self.state != ConnectionState::Open {
            return Err(ConnectionError::NotOpen { state: self.state });
        }
        Ok(ConnectionAction::Send(text.into()))
    }

    /// Stop reacting to events. Pending timers become no-ops.
    pub fn dispose(&mut self) {
        self.state = ConnectionState::Disposed;
        self.pending_reconnect = None;
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn is_live(&self) -> bool {
        matches!(self.state, ConnectionState::Connecting | ConnectionState::Open)
    }
}
