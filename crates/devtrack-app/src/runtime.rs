//! Generic runtime
//!
//! Executes [`TrackerAction`]s against a [`Driver`] and feeds the resulting
//! transport events back into the tracker. Everything happens on one task:
//! at any moment the runtime is either waiting on the open connection or
//! sleeping until a pending reconnect, never both, so no select is needed.
//!
//! Failures never stop the loop. A failed connect is turned into a close
//! so the regular retry path applies; failed sends and presents are logged.

use std::{collections::VecDeque, time::Duration};

use devtrack_core::{
    ConnectionAction, DeviceTable, DeviceTracker, TrackerAction, TrackerError, TrackerEvent,
    TrackerState,
};
use tracing::{debug, warn};

use crate::{Driver, TransportEvent};

/// Drives one tracker over one driver.
pub struct Runtime<D, T> {
    driver: D,
    tracker: DeviceTracker<T>,
    pending: VecDeque<TrackerAction>,
    reconnect: Option<(Duration, u64)>,
}

impl<D: Driver, T: DeviceTable> Runtime<D, T> {
    /// Wrap a freshly created tracker and the actions it returned.
    ///
    /// Applies the page chrome to the driver's document.
    pub fn new(mut driver: D, tracker: DeviceTracker<T>, initial: Vec<TrackerAction>) -> Self {
        tracker.bootstrap(driver.document());
        Self { driver, tracker, pending: initial.into(), reconnect: None }
    }

    /// The tracker.
    pub fn tracker(&self) -> &DeviceTracker<T> {
        &self.tracker
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Delay and generation of the armed reconnect timer.
    pub fn pending_reconnect(&self) -> Option<(Duration, u64)> {
        self.reconnect
    }

    /// Queue a text frame for the server.
    pub fn send(&mut self, text: impl Into<String>) -> Result<(), TrackerError> {
        let action = self.tracker.send(text)?;
        self.pending.push_back(action);
        Ok(())
    }

    /// Execute queued actions, then wait for and process one external event.
    ///
    /// Returns `false` once the tracker is disposed.
    pub async fn step(&mut self) -> bool {
        self.drain().await;
        if self.tracker.state() == TrackerState::Disposed {
            return false;
        }

        let generation = self.tracker.connection().generation();
        if let Some((delay, timer_generation)) = self.reconnect.take() {
            debug!(
                delay_ms = delay.as_millis() as u64,
                generation = timer_generation,
                "waiting to reconnect"
            );
            self.driver.sleep(delay).await;
            self.feed(TrackerEvent::ReconnectTimer { generation: timer_generation });
        } else {
            match self.driver.recv().await {
                TransportEvent::Message(text) => {
                    self.feed(TrackerEvent::Message { generation, text });
                },
                TransportEvent::Closed { reason } => {
                    let entropy = self.driver.entropy();
                    self.feed(TrackerEvent::Closed { generation, reason, entropy });
                },
            }
        }

        self.drain().await;
        true
    }

    /// Step until the tracker is disposed.
    pub async fn run(&mut self) {
        while self.step().await {}
    }

    /// Dispose the tracker and drop the connection.
    pub fn shutdown(&mut self) {
        self.tracker.dispose();
        self.pending.clear();
        self.reconnect = None;
        self.driver.disconnect();
    }

    fn feed(&mut self, event: TrackerEvent) {
        let actions = self.tracker.handle_event(event);
        self.pending.extend(actions);
    }

    async fn drain(&mut self) {
        while let Some(action) = self.pending.pop_front() {
            self.execute(action).await;
        }
    }

    async fn execute(&mut self, action: TrackerAction) {
        match action {
            TrackerAction::Render => {
                self.tracker.render(self.driver.document());
                if let Err(error) = self.driver.present() {
                    warn!(%error, "failed to present device table");
                }
            },
            TrackerAction::Connection(ConnectionAction::Open { action, generation }) => {
                match self.driver.connect(&action).await {
                    Ok(()) => self.feed(TrackerEvent::Opened { generation }),
                    Err(error) => {
                        warn!(%error, %action, generation, "connect failed");
                        let entropy = self.driver.entropy();
                        self.feed(TrackerEvent::Closed {
                            generation,
                            reason: error.to_string(),
                            entropy,
                        });
                    },
                }
            },
            TrackerAction::Connection(ConnectionAction::Send(text)) => {
                if let Err(error) = self.driver.send(text).await {
                    warn!(%error, "send failed");
                }
            },
            TrackerAction::Connection(ConnectionAction::ScheduleReconnect {
                delay,
                generation,
            }) => {
                self.reconnect = Some((delay, generation));
            },
            TrackerAction::Connection(ConnectionAction::Dispatch(envelope)) => {
                // The tracker applies envelopes itself
                debug!(kind = envelope.kind(), "ignoring undispatched envelope");
            },
        }
    }
}
