//! Command-line device tracker
//!
//! A thin shell over [`devtrack_app::Driver`] that connects to the device
//! server over WebSocket and writes the rendered device table to an HTML
//! file. All orchestration logic lives in the generic
//! [`devtrack_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod args;
pub mod error;
pub mod ws_driver;

pub use args::{Args, Variant};
pub use devtrack_app::{Driver, Runtime};
pub use error::{CliError, WsError};
pub use ws_driver::WsDriver;
