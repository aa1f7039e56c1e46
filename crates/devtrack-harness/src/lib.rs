//! Deterministic simulation harness for devtrack testing.
//!
//! [`SimDriver`] implements [`devtrack_app::Driver`] over a scripted server,
//! a virtual clock and a seeded RNG, so runtime behavior (reconnect timing
//! included) is reproducible without sockets or real sleeps. The [`model`]
//! module holds a reference tracker and operation type for model-based
//! tests and fuzzing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_driver;

pub use model::{ModelTracker, Operation, SmallDevice};
pub use sim_driver::{Session, SimDriver, SimError};
