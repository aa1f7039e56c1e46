//! Device tracker state machine.
//!
//! Combines a [`ConnectionManager`], a [`DeviceCollection`] and a
//! [`DeviceTable`]. Transport events go in, actions come out: connection
//! actions for the driver and a render request after every change to the
//! collection.
//!
//! # State Machine
//!
//! ```text
//!                 devicelist                 device / devicelist
//! ┌────────────┐ ───────────> ┌────────┐ <──────────────────┐
//! │ Connecting │              │ Synced │ ───────────────────┘
//! └────────────┘ <───┐        └────────┘
//!       │ close      │ timer       │ close
//!       ↓            │             ↓
//! ┌──────────────┐   │    ┌──────────────┐
//! │ Reconnecting │───┘<───│ Reconnecting │
//! └──────────────┘        └──────────────┘
//! ```
//!
//! A close never clears the collection. The last known devices stay on
//! screen until the next snapshot replaces them.

use devtrack_proto::{DeviceDescriptor, Envelope};
use tracing::{debug, info};

use crate::{
    collection::{DeviceCollection, Upsert},
    connection::{ConnectionAction, ConnectionConfig, ConnectionManager, ReconnectPolicy},
    dom::Document,
    error::TrackerError,
    table::{DeviceTable, TableHandle},
};

/// External events fed to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// Transport for `generation` is open.
    Opened {
        /// Attempt the event belongs to.
        generation: u64,
    },

    /// Text frame received.
    Message {
        /// Attempt the event belongs to.
        generation: u64,
        /// Raw frame payload.
        text: String,
    },

    /// Transport closed (or failed to open).
    Closed {
        /// Attempt the event belongs to.
        generation: u64,
        /// Close reason for logging.
        reason: String,
        /// Random input for reconnect jitter.
        entropy: u64,
    },

    /// Reconnect timer fired.
    ReconnectTimer {
        /// Attempt the timer was armed for.
        generation: u64,
    },
}

/// Actions for the runtime to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerAction {
    /// Transport-level action.
    Connection(ConnectionAction),
    /// Redraw the device table.
    Render,
}

/// Tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Waiting for the first snapshot on the current attempt.
    Connecting,
    /// A snapshot has been applied.
    Synced,
    /// Connection closed, reconnect pending.
    Reconnecting,
    /// Tracker shut down.
    Disposed,
}

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Retry policy after a close.
    pub reconnect: ReconnectPolicy,
    /// Page title set by [`DeviceTracker::bootstrap`].
    pub title: String,
    /// Body class set by [`DeviceTracker::bootstrap`].
    pub body_class: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            title: "Device list".to_owned(),
            body_class: "list".to_owned(),
        }
    }
}

/// Device tracker
#[derive(Debug)]
pub struct DeviceTracker<T> {
    config: TrackerConfig,
    connection: ConnectionManager,
    devices: DeviceCollection,
    handle: TableHandle,
    table: T,
    state: TrackerState,
}

impl<T: DeviceTable> DeviceTracker<T> {
    /// Create a tracker and the action opening its first connection.
    pub fn new(config: TrackerConfig, handle: TableHandle, table: T) -> (Self, Vec<TrackerAction>) {
        let connection = ConnectionManager::new(ConnectionConfig {
            action: table.action().to_owned(),
            reconnect: config.reconnect,
        });

        let mut tracker = Self {
            config,
            connection,
            devices: DeviceCollection::new(),
            handle,
            table,
            state: TrackerState::Connecting,
        };
        let actions =
            tracker.connection.open().into_iter().map(TrackerAction::Connection).collect();
        (tracker, actions)
    }

    /// Current state
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Tracked devices in display order.
    pub fn devices(&self) -> &DeviceCollection {
        &self.devices
    }

    /// Underlying connection state machine.
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Table this tracker draws into.
    pub fn handle(&self) -> &TableHandle {
        &self.handle
    }

    /// Device table implementation.
    pub fn table(&self) -> &T {
        &self.table
    }

    /// Process one external event.
    pub fn handle_event(&mut self, event: TrackerEvent) -> Vec<TrackerAction> {
        if self.state == TrackerState::Disposed {
            return vec![];
        }

        let actions = match event {
            TrackerEvent::Opened { generation } => self.connection.on_open(generation),
            TrackerEvent::Message { generation, text } => {
                self.connection.on_message(generation, &text)
            },
            TrackerEvent::Closed { generation, reason, entropy } => {
                let actions = self.connection.on_close(generation, &reason, entropy);
                if !actions.is_empty() {
                    self.state = TrackerState::Reconnecting;
                }
                actions
            },
            TrackerEvent::ReconnectTimer { generation } => {
                let actions = self.connection.on_reconnect_timer(generation);
                if !actions.is_empty() {
                    self.state = TrackerState::Connecting;
                }
                actions
            },
        };

        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                ConnectionAction::Dispatch(envelope) => {
                    self.apply(envelope);
                    out.push(TrackerAction::Render);
                },
                other => out.push(TrackerAction::Connection(other)),
            }
        }
        out
    }

    /// Apply a decoded envelope to the collection.
    pub fn apply(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::DeviceList(devices) => {
                debug!(count = devices.len(), "applying device list");
                self.devices.replace(devices);
                self.state = TrackerState::Synced;
            },
            Envelope::Device(device) => self.apply_delta(device),
        }
    }

    fn apply_delta(&mut self, device: DeviceDescriptor) {
        let udid = device.udid.clone();
        match self.devices.upsert(device) {
            Upsert::Updated(index) => debug!(%udid, index, "device updated"),
            Upsert::Appended(index) => debug!(%udid, index, "device added"),
        }
    }

    /// Redraw the table from the current collection.
    pub fn render<D: Document>(&self, doc: &mut D) {
        self.table.build_device_table(doc, &self.handle, self.devices.as_slice());
    }

    /// Apply page title and body class.
    pub fn bootstrap<D: Document>(&self, doc: &mut D) {
        doc.set_title(&self.config.title);
        doc.add_body_class(&self.config.body_class);
    }

    /// Send a text frame on the open connection.
    pub fn send(&self, text: impl Into<String>) -> Result<TrackerAction, TrackerError> {
        Ok(TrackerAction::Connection(self.connection.send(text)?))
    }

    /// Stop tracking. Later events and timers are ignored.
    pub fn dispose(&mut self) {
        info!(action = self.connection.action(), "tracker disposed");
        self.connection.dispose();
        self.state = TrackerState::Disposed;
    }
}
