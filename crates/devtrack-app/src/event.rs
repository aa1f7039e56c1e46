//! Transport events
//!
//! What a driver reports from its connection once it is open.

/// Event read from an open transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Text frame from the server.
    Message(String),

    /// Connection ended, by either side or by failure.
    Closed {
        /// Human-readable close reason.
        reason: String,
    },
}
