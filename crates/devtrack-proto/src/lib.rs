//! Wire format for the devtrack device list protocol.
//!
//! The server pushes JSON envelopes over a message-oriented connection. Each
//! envelope carries a `type` discriminator and a `data` payload:
//!
//! ```text
//! { "type": "devicelist", "data": [ DeviceDescriptor, ... ] }
//! { "type": "device",     "data": DeviceDescriptor }
//! ```
//!
//! Decoding is split in two stages so that a frame which is not JSON at all
//! can be told apart from a well-formed envelope of a kind this client does
//! not understand. Both are recoverable; callers log and drop.
//!
//! Device actions (streaming, shell, devtools) are expressed as navigable
//! links. [`ActionParams`] is the parameter object carried in the fragment
//! of such a link and round-trips through `application/x-www-form-urlencoded`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod descriptor;
pub mod envelope;
pub mod errors;
pub mod params;

pub use descriptor::DeviceDescriptor;
pub use envelope::{ACTION_DEVICE, ACTION_LIST, Envelope};
pub use errors::{ProtocolError, Result};
pub use params::{ActionParams, FRAGMENT_PREFIX, StreamParams};
