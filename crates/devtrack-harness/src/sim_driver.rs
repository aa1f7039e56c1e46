//! Scripted driver with virtual time.
//!
//! The server is a queue of [`Session`]s. Each `connect` consumes the next
//! one: a refused session fails the connect, an accepted session yields its
//! events to `recv` and then reports a close. `sleep` advances the virtual
//! clock instantly.

use std::{collections::VecDeque, future::Future, time::Duration};

use devtrack_app::{Driver, TransportEvent};
use devtrack_core::MemoryDocument;
use devtrack_proto::Envelope;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::trace;
use url::Url;

/// Errors reported by [`SimDriver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Scripted refusal.
    #[error("connection refused: {0}")]
    Refused(String),

    /// No session left in the script.
    #[error("no server scripted")]
    NoServer,

    /// Send without an open session.
    #[error("not connected")]
    NotConnected,

    /// Scripted present failure.
    #[error("present failed")]
    PresentFailed,
}

/// One scripted connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Connect fails with this reason.
    Refused(String),
    /// Connect succeeds; these events are delivered in order, then the
    /// connection closes.
    Accepted(VecDeque<TransportEvent>),
}

impl Session {
    /// Accepted session delivering `frames` as text messages.
    pub fn frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Accepted(frames.into_iter().map(|f| TransportEvent::Message(f.into())).collect())
    }

    /// Accepted session delivering `envelopes`.
    pub fn envelopes<'a>(envelopes: impl IntoIterator<Item = &'a Envelope>) -> Self {
        Self::Accepted(
            envelopes
                .into_iter()
                .filter_map(|envelope| envelope.encode().ok())
                .map(TransportEvent::Message)
                .collect(),
        )
    }
}

/// Deterministic [`Driver`] for tests.
#[derive(Debug)]
pub struct SimDriver {
    script: VecDeque<Session>,
    current: Option<VecDeque<TransportEvent>>,
    clock: Duration,
    rng: ChaCha8Rng,
    document: MemoryDocument,
    connects: Vec<(Duration, String)>,
    sleeps: Vec<Duration>,
    sent: Vec<String>,
    presents: usize,
    fail_present: bool,
}

impl SimDriver {
    /// Conventional page location for the simulated document.
    pub const LOCATION: &'static str = "http://localhost:8000/";

    /// Driver rendering a page at `location`, with an empty script and seed 0.
    pub fn new(location: Url) -> Self {
        Self::with_seed(location, 0)
    }

    /// Driver rendering a page at `location`, with an empty script and the
    /// given RNG seed.
    pub fn with_seed(location: Url, seed: u64) -> Self {
        Self {
            script: VecDeque::new(),
            current: None,
            clock: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
            document: MemoryDocument::new(location),
            connects: Vec::new(),
            sleeps: Vec::new(),
            sent: Vec::new(),
            presents: 0,
            fail_present: false,
        }
    }

    /// Append a session to the script.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.script.push_back(session);
        self
    }

    /// Append a session to the script.
    pub fn push_session(&mut self, session: Session) {
        self.script.push_back(session);
    }

    /// Make every `present` fail.
    pub fn set_fail_present(&mut self, fail: bool) {
        self.fail_present = fail;
    }

    /// Virtual time elapsed.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Virtual time and action of every connect attempt.
    pub fn connects(&self) -> &[(Duration, String)] {
        &self.connects
    }

    /// Every sleep requested.
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    /// Frames sent by the client.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// Number of successful presents.
    pub fn presents(&self) -> usize {
        self.presents
    }

    /// Whether a session is open.
    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    /// The rendered document.
    pub fn rendered(&self) -> &MemoryDocument {
        &self.document
    }

    fn connect_now(&mut self, action: &str) -> Result<(), SimError> {
        self.connects.push((self.clock, action.to_owned()));
        self.current = None;

        match self.script.pop_front() {
            Some(Session::Accepted(events)) => {
                trace!(action, events = events.len(), "sim session accepted");
                self.current = Some(events);
                Ok(())
            },
            Some(Session::Refused(reason)) => Err(SimError::Refused(reason)),
            None => Err(SimError::NoServer),
        }
    }

    fn recv_now(&mut self) -> TransportEvent {
        let Some(events) = self.current.as_mut() else {
            return TransportEvent::Closed { reason: "not connected".to_owned() };
        };

        match events.pop_front() {
            Some(TransportEvent::Closed { reason }) => {
                self.current = None;
                TransportEvent::Closed { reason }
            },
            Some(event) => event,
            None => {
                self.current = None;
                TransportEvent::Closed { reason: "session ended".to_owned() }
            },
        }
    }
}

impl Driver for SimDriver {
    type Error = SimError;
    type Document = MemoryDocument;

    fn connect(&mut self, action: &str) -> impl Future<Output = Result<(), SimError>> + Send {
        std::future::ready(self.connect_now(action))
    }

    fn recv(&mut self) -> impl Future<Output = TransportEvent> + Send {
        std::future::ready(self.recv_now())
    }

    fn send(&mut self, text: String) -> impl Future<Output = Result<(), SimError>> + Send {
        let result = if self.current.is_some() {
            self.sent.push(text);
            Ok(())
        } else {
            Err(SimError::NotConnected)
        };
        std::future::ready(result)
    }

    fn sleep(&mut self, delay: Duration) -> impl Future<Output = ()> + Send {
        self.clock += delay;
        self.sleeps.push(delay);
        std::future::ready(())
    }

    fn entropy(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn document(&mut self) -> &mut MemoryDocument {
        &mut self.document
    }

    fn present(&mut self) -> Result<(), SimError> {
        if self.fail_present {
            return Err(SimError::PresentFailed);
        }
        self.presents += 1;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.current = None;
    }
}
