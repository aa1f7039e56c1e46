//! Error types for connection and tracker state machines.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors from the connection state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Operation requires an open connection.
    #[error("connection is not open (state: {state:?})")]
    NotOpen {
        /// State at the time of the call.
        state: ConnectionState,
    },
}

/// Errors from tracker construction and operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Another tracker already owns this table identifier.
    #[error("table id already claimed: {table_id}")]
    DuplicateTable {
        /// The contested identifier.
        table_id: String,
    },

    /// Underlying connection rejected the operation.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
