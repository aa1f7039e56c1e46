//! Protocol errors.

use thiserror::Error;

/// Errors produced while decoding envelopes or action parameters.
///
/// None of these are fatal to a connection. The connection layer logs them
/// and drops the offending frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame is not a JSON object with a string `type` field.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Envelope is well-formed but its `type` is not one we handle.
    #[error("unknown message type: {kind}")]
    UnknownKind {
        /// The `type` value as received.
        kind: String,
    },

    /// Envelope kind is known but `data` has the wrong shape.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        /// Envelope kind whose payload failed to decode.
        kind: &'static str,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// Envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// Link fragment lacks a required key.
    #[error("missing parameter: {0}")]
    MissingParam(&'static str),

    /// Link fragment names an action we do not know.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// Link fragment carries a port that is not a valid `u16`.
    #[error("invalid port: {0}")]
    InvalidPort(String),
}

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;
