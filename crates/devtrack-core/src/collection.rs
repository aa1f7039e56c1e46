//! Device collection.
//!
//! An ordered set of descriptors holding at most one entry per `udid`.
//! Snapshots replace the whole set, deltas update in place or append. A
//! device only ever disappears through a snapshot that omits it.

use devtrack_proto::DeviceDescriptor;
use tracing::warn;

/// Outcome of merging one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// Replaced the existing entry at this position.
    Updated(usize),
    /// Appended as a new last entry at this position.
    Appended(usize),
}

/// Ordered device set keyed by `udid`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceCollection {
    devices: Vec<DeviceDescriptor>,
}

impl DeviceCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set with a snapshot.
    ///
    /// Repeated `udid`s in the snapshot collapse onto the first position,
    /// carrying the content of the last occurrence.
    pub fn replace(&mut self, snapshot: Vec<DeviceDescriptor>) {
        let total = snapshot.len();
        self.devices = Vec::with_capacity(total);
        for descriptor in snapshot {
            self.upsert(descriptor);
        }

        if self.devices.len() != total {
            warn!(
                received = total,
                kept = self.devices.len(),
                "snapshot contained duplicate udids"
            );
        }
    }

    /// Update the entry with the same `udid`, or append.
    ///
    /// The entry is replaced wholesale, not field-merged.
    pub fn upsert(&mut self, descriptor: DeviceDescriptor) -> Upsert {
        match self.position(&descriptor.udid) {
            Some(index) => {
                self.devices[index] = descriptor;
                Upsert::Updated(index)
            },
            None => {
                self.devices.push(descriptor);
                Upsert::Appended(self.devices.len() - 1)
            },
        }
    }

    /// Position of `udid`, if tracked.
    pub fn position(&self, udid: &str) -> Option<usize> {
        self.devices.iter().position(|device| device.udid == udid)
    }

    /// Descriptor for `udid`, if tracked.
    pub fn get(&self, udid: &str) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|device| device.udid == udid)
    }

    /// Descriptors in display order.
    pub fn as_slice(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// Iterate in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, DeviceDescriptor> {
        self.devices.iter()
    }

    /// Number of tracked devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether no devices are tracked.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<'a> IntoIterator for &'a DeviceCollection {
    type Item = &'a DeviceDescriptor;
    type IntoIter = std::slice::Iter<'a, DeviceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
