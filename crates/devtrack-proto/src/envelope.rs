//! Message envelopes.
//!
//! # Decoding
//!
//! 1. Parse `{ "type": string, "data": any }`. Anything else is
//!    [`ProtocolError::Malformed`].
//! 2. Match `type`. Unknown kinds are [`ProtocolError::UnknownKind`] and carry
//!    the offending value for logging.
//! 3. Decode `data` for the matched kind. A shape mismatch is
//!    [`ProtocolError::InvalidPayload`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DeviceDescriptor, ProtocolError, Result};

/// `type` of a full device list snapshot.
pub const ACTION_LIST: &str = "devicelist";

/// `type` of a single device delta.
pub const ACTION_DEVICE: &str = "device";

/// A decoded server message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Envelope {
    /// Authoritative device set. Replaces local state.
    #[serde(rename = "devicelist")]
    DeviceList(Vec<DeviceDescriptor>),

    /// Current state of one device. Merged into local state.
    #[serde(rename = "device")]
    Device(DeviceDescriptor),
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    /// Decode a raw text frame.
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

        match raw.kind.as_str() {
            ACTION_LIST => serde_json::from_value(raw.data)
                .map(Self::DeviceList)
                .map_err(|source| ProtocolError::InvalidPayload { kind: ACTION_LIST, source }),
            ACTION_DEVICE => serde_json::from_value(raw.data)
                .map(Self::Device)
                .map_err(|source| ProtocolError::InvalidPayload { kind: ACTION_DEVICE, source }),
            _ => Err(ProtocolError::UnknownKind { kind: raw.kind }),
        }
    }

    /// Encode into the wire representation.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Wire `type` of this envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeviceList(_) => ACTION_LIST,
            Self::Device(_) => ACTION_DEVICE,
        }
    }
}
