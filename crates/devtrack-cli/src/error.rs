//! CLI errors

use std::io;

use devtrack_core::TrackerError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors reported by [`crate::WsDriver`].
#[derive(Debug, Error)]
pub enum WsError {
    /// WebSocket handshake or transport failure.
    #[error("websocket: {0}")]
    Transport(#[from] Box<tungstenite::Error>),

    /// Send without an open connection.
    #[error("not connected")]
    NotConnected,

    /// Writing the rendered page failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Output path.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Top-level errors of the `devtrack` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Tracker setup failed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Installing the interrupt handler failed.
    #[error("signal handler: {0}")]
    Signal(#[source] io::Error),
}
