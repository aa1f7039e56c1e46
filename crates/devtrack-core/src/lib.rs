//! devtrack core logic
//!
//! Pure state machines for keeping a rendered device table in sync with a
//! server that pushes device state over a long-lived connection. Nothing in
//! this crate performs I/O, reads the clock or schedules timers.
//!
//! # Architecture
//!
//! State transitions return declarative actions (open a connection, arm a
//! reconnect timer, render) instead of executing them. A runtime interprets
//! the actions; tests inspect them directly.
//!
//! Rendering goes through the [`dom::Document`] trait, a minimal model of the
//! browser DOM. [`dom::MemoryDocument`] implements it in memory and can
//! serialize itself to HTML.
//!
//! # Components
//!
//! - [`connection`]: Connection lifecycle and retry
//! - [`collection`]: Device set with update-or-append merge
//! - [`tracker`]: Tracker state machine tying connection, collection and table
//! - [`table`]: Table reconciliation and concrete device tables
//! - [`link`]: Deep links for device actions
//! - [`error`]: Error types

pub mod collection;
pub mod connection;
pub mod dom;
pub mod error;
pub mod link;
pub mod table;
pub mod tracker;

pub use collection::{DeviceCollection, Upsert};
pub use connection::{
    ConnectionAction, ConnectionConfig, ConnectionManager, ConnectionState, ReconnectPolicy,
};
pub use dom::{Document, MemoryDocument, NodeId};
pub use error::{ConnectionError, TrackerError};
pub use table::{DeviceTable, RowSpec, TableHandle, TableRegistry};
pub use tracker::{DeviceTracker, TrackerAction, TrackerConfig, TrackerEvent, TrackerState};
