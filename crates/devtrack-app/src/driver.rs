//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from specific I/O
//! implementations. Each frontend implements the trait to provide a
//! transport, a timer, randomness and a document, while the generic
//! [`crate::Runtime`] handles all orchestration.

use std::{future::Future, time::Duration};

use devtrack_core::Document;

use crate::TransportEvent;

/// Abstracts I/O operations for the runtime.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Document the device table is rendered into.
    type Document: Document;

    /// Open a connection to the server-side `action`, replacing any existing
    /// one.
    ///
    /// Resolves once the transport is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn connect(&mut self, action: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next event from the open connection.
    ///
    /// Returns [`TransportEvent::Closed`] if there is no open connection.
    fn recv(&mut self) -> impl Future<Output = TransportEvent> + Send;

    /// Send a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or send fails.
    fn send(&mut self, text: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Wait for `delay`. Simulations may advance virtual time instead.
    fn sleep(&mut self, delay: Duration) -> impl Future<Output = ()> + Send;

    /// Random value for reconnect jitter.
    fn entropy(&mut self) -> u64;

    /// Document to render into.
    fn document(&mut self) -> &mut Self::Document;

    /// Make the current document visible (flush to screen, file, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if presenting fails.
    fn present(&mut self) -> Result<(), Self::Error>;

    /// Drop the connection and clean up resources.
    fn disconnect(&mut self);
}
