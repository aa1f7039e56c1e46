//! Device descriptors.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One tracked device, keyed by `udid`.
///
/// Everything besides `udid` is opaque to the tracking core and only matters
/// to whichever device table renders it. Extra attributes are kept verbatim
/// so that a round trip through the wire format is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Unique device identifier.
    pub udid: String,

    /// Remaining attributes, flattened into the descriptor object on the wire.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DeviceDescriptor {
    /// Descriptor with no attributes beyond `udid`.
    pub fn new(udid: impl Into<String>) -> Self {
        Self { udid: udid.into(), fields: Map::new() }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Raw attribute value. `"udid"` resolves to the identifier.
    pub fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        if name == "udid" {
            return Some(Cow::Owned(Value::String(self.udid.clone())));
        }
        self.fields.get(name).map(Cow::Borrowed)
    }

    /// Attribute rendered as display text.
    ///
    /// Strings are returned unquoted, `null` and missing attributes as the
    /// empty string, anything else as compact JSON. `"udid"` resolves to the
    /// identifier.
    pub fn display(&self, name: &str) -> String {
        match self.field(name).as_deref() {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Connection state reported by the server (`device`, `offline`, ...).
    pub fn state(&self) -> Option<&str> {
        self.fields.get("state").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extra_fields_are_flattened() {
        let device: DeviceDescriptor =
            serde_json::from_value(json!({ "udid": "A", "name": "x", "pid": 7 })).unwrap();

        assert_eq!(device.udid, "A");
        assert_eq!(device.field("name").as_deref(), Some(&json!("x")));
        assert_eq!(device.field("pid").as_deref(), Some(&json!(7)));

        let back = serde_json::to_value(&device).unwrap();
        assert_eq!(back, json!({ "udid": "A", "name": "x", "pid": 7 }));
    }

    #[test]
    fn missing_udid_is_rejected() {
        let result = serde_json::from_value::<DeviceDescriptor>(json!({ "name": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn udid_field_resolves_to_identifier() {
        let device = DeviceDescriptor::new("A").with_field("name", "pixel");
        assert_eq!(device.field("udid").as_deref(), Some(&json!("A")));
        assert_eq!(device.field("absent"), None);
    }

    #[test]
    fn display_formats_values() {
        let device = DeviceDescriptor::new("A")
            .with_field("name", "pixel")
            .with_field("pid", 42)
            .with_field("gone", Value::Null);

        assert_eq!(device.display("udid"), "A");
        assert_eq!(device.display("name"), "pixel");
        assert_eq!(device.display("pid"), "42");
        assert_eq!(device.display("gone"), "");
        assert_eq!(device.display("absent"), "");
    }

    #[test]
    fn state_is_read_from_fields() {
        let device = DeviceDescriptor::new("A").with_field("state", "device");
        assert_eq!(device.state(), Some("device"));
        assert_eq!(DeviceDescriptor::new("B").state(), None);
    }
}
