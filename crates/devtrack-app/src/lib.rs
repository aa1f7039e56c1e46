//! Application layer for devtrack
//!
//! A generic runtime that executes tracker actions against a platform
//! [`Driver`], so the same orchestration runs over a real WebSocket and in
//! deterministic simulation.
//!
//! # Components
//!
//! - [`TransportEvent`]: What a driver reports from its connection
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Orchestration loop using a Driver

mod driver;
mod event;
mod runtime;

pub use driver::Driver;
pub use event::TransportEvent;
pub use runtime::Runtime;
