//! Reference model for model-based testing.
//!
//! [`ModelTracker`] is a deliberately naive restatement of the tracker's
//! merge and reconnect rules. Tests drive it and the real
//! [`devtrack_core::DeviceTracker`] with the same [`Operation`] sequence and
//! compare the results after every step.

use arbitrary::Arbitrary;
use devtrack_core::TrackerEvent;
use devtrack_proto::{DeviceDescriptor, Envelope};

/// Number of distinct udids a [`SmallDevice`] can take.
///
/// Kept small so snapshots and deltas collide often.
pub const UDID_SPACE: u8 = 6;

/// Compact device description that maps onto a [`DeviceDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallDevice {
    /// Selects the udid, modulo [`UDID_SPACE`].
    pub udid_seed: u8,
    /// Selects the `name` field; absent when `None`.
    pub name_seed: Option<u8>,
    /// Whether the device is in the ready (`device`) state.
    pub ready: bool,
}

impl SmallDevice {
    /// Udid this device maps to.
    pub fn udid(&self) -> String {
        format!("dev-{}", self.udid_seed % UDID_SPACE)
    }

    /// Full descriptor.
    pub fn to_descriptor(&self) -> DeviceDescriptor {
        let state = if self.ready { "device" } else { "offline" };
        let descriptor = DeviceDescriptor::new(self.udid()).with_field("state", state);
        match self.name_seed {
            Some(seed) => descriptor.with_field("name", format!("name-{seed}")),
            None => descriptor,
        }
    }
}

/// One externally observable step.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Full device list on the current connection.
    Snapshot(Vec<SmallDevice>),
    /// Single device update on the current connection.
    Delta(SmallDevice),
    /// Device list delivered on a superseded connection.
    StaleSnapshot(Vec<SmallDevice>),
    /// Text that is not a valid envelope.
    Garbage(String),
    /// Well-formed envelope of a kind the client does not know.
    UnknownKind(u8),
    /// Transport for the current connection closes.
    Close,
    /// The armed reconnect timer fires.
    ReconnectTimer,
}

impl Operation {
    /// Event fed to a tracker whose current generation is `generation`.
    pub fn to_event(&self, generation: u64, entropy: u64) -> TrackerEvent {
        match self {
            Self::Snapshot(devices) => {
                TrackerEvent::Message { generation, text: snapshot_frame(devices) }
            },
            Self::Delta(device) => TrackerEvent::Message {
                generation,
                text: encode(&Envelope::Device(device.to_descriptor())),
            },
            Self::StaleSnapshot(devices) => TrackerEvent::Message {
                generation: generation.wrapping_sub(1),
                text: snapshot_frame(devices),
            },
            Self::Garbage(text) => TrackerEvent::Message { generation, text: format!("#{text}") },
            Self::UnknownKind(n) => TrackerEvent::Message {
                generation,
                text: format!(r#"{{"type":"unknown-{n}","data":{{}}}}"#),
            },
            Self::Close => TrackerEvent::Closed {
                generation,
                reason: "closed by model".to_owned(),
                entropy,
            },
            Self::ReconnectTimer => TrackerEvent::ReconnectTimer { generation },
        }
    }
}

fn snapshot_frame(devices: &[SmallDevice]) -> String {
    encode(&Envelope::DeviceList(devices.iter().map(SmallDevice::to_descriptor).collect()))
}

fn encode(envelope: &Envelope) -> String {
    // Descriptors built from SmallDevice always serialize
    envelope.encode().unwrap_or_default()
}

/// Reference tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTracker {
    devices: Vec<DeviceDescriptor>,
    live: bool,
    reconnect_armed: bool,
    opens: u64,
}

impl ModelTracker {
    /// Tracker right after creation: one open issued, connection live.
    pub fn new() -> Self {
        Self { devices: Vec::new(), live: true, reconnect_armed: false, opens: 1 }
    }

    /// Expected devices in display order.
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// Whether a reconnect timer is expected to be armed.
    pub fn reconnect_armed(&self) -> bool {
        self.reconnect_armed
    }

    /// Expected number of open attempts so far.
    pub fn opens(&self) -> u64 {
        self.opens
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Snapshot(devices) if self.live => {
                let incoming: Vec<DeviceDescriptor> =
                    devices.iter().map(SmallDevice::to_descriptor).collect();
                self.devices = last_wins(&incoming);
            },
            Operation::Delta(device) if self.live => {
                let descriptor = device.to_descriptor();
                let existing = self.devices.iter_mut().find(|d| d.udid == descriptor.udid);
                match existing {
                    Some(slot) => *slot = descriptor,
                    None => self.devices.push(descriptor),
                }
            },
            Operation::Close if self.live => {
                self.live = false;
                self.reconnect_armed = true;
            },
            Operation::ReconnectTimer if self.reconnect_armed => {
                self.reconnect_armed = false;
                self.live = true;
                self.opens += 1;
            },
            _ => {},
        }
    }
}

impl Default for ModelTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique udids in order of first appearance, each carrying its last
/// occurrence.
fn last_wins(incoming: &[DeviceDescriptor]) -> Vec<DeviceDescriptor> {
    let mut order: Vec<&str> = Vec::new();
    for device in incoming {
        if !order.contains(&device.udid.as_str()) {
            order.push(&device.udid);
        }
    }

    order
        .into_iter()
        .filter_map(|udid| incoming.iter().rev().find(|d| d.udid == udid).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(udid_seed: u8, name_seed: Option<u8>) -> SmallDevice {
        SmallDevice { udid_seed, name_seed, ready: true }
    }

    #[test]
    fn udids_wrap_into_small_space() {
        assert_eq!(device(1, None).udid(), device(1 + UDID_SPACE, None).udid());
    }

    #[test]
    fn snapshot_keeps_first_position_and_last_content() {
        let mut model = ModelTracker::new();
        model.apply(&Operation::Snapshot(vec![
            device(0, Some(1)),
            device(1, None),
            device(0, Some(2)),
        ]));

        let names: Vec<String> = model.devices().iter().map(|d| d.display("name")).collect();
        assert_eq!(model.devices()[0].udid, "dev-0");
        assert_eq!(names, ["name-2", ""]);
    }

    #[test]
    fn messages_after_close_are_ignored_until_reconnect() {
        let mut model = ModelTracker::new();
        model.apply(&Operation::Close);
        model.apply(&Operation::Delta(device(3, None)));
        assert!(model.devices().is_empty());
        assert!(model.reconnect_armed());

        model.apply(&Operation::ReconnectTimer);
        model.apply(&Operation::Delta(device(3, None)));
        assert_eq!(model.devices().len(), 1);
        assert_eq!(model.opens(), 2);
    }

    #[test]
    fn garbage_is_not_an_envelope() {
        let event = Operation::Garbage("anything".into()).to_event(1, 0);
        let TrackerEvent::Message { text, .. } = event else {
            panic!("expected message");
        };
        assert!(Envelope::decode(&text).is_err());
    }
}
