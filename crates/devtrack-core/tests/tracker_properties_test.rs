//! Property tests for the snapshot/delta merge protocol.
//!
//! Messages are fed through the full tracker (wire decode included) and the
//! resulting collection is checked against the merge rules:
//!
//! - a snapshot replaces everything
//! - a delta for a known udid replaces that entry in place
//! - a delta for a new udid is appended
//! - a delta applied twice equals the delta applied once
//! - undecodable frames change nothing, rendered output included

use devtrack_core::{
    DeviceTable, DeviceTracker, MemoryDocument, TableRegistry, TrackerAction, TrackerConfig,
    TrackerEvent, table::DroidTable,
};
use devtrack_proto::{DeviceDescriptor, Envelope};
use proptest::prelude::*;
use url::Url;

fn descriptor_strategy() -> impl Strategy<Value = DeviceDescriptor> {
    ("[A-F]", proptest::option::of("[a-z]{1,6}"), proptest::option::of("device|offline"))
        .prop_map(|(udid, name, state)| {
            let mut device = DeviceDescriptor::new(udid);
            if let Some(name) = name {
                device = device.with_field("ro.product.model", name);
            }
            if let Some(state) = state {
                device = device.with_field("state", state);
            }
            device
        })
}

/// Snapshot payloads with unique udids.
fn snapshot_strategy() -> impl Strategy<Value = Vec<DeviceDescriptor>> {
    proptest::collection::vec(descriptor_strategy(), 0..6).prop_map(|devices| {
        let mut seen = Vec::new();
        devices
            .into_iter()
            .filter(|device| {
                if seen.contains(&device.udid) {
                    return false;
                }
                seen.push(device.udid.clone());
                true
            })
            .collect()
    })
}

fn open_tracker() -> DeviceTracker<DroidTable> {
    let handle = TableRegistry::new().claim(DroidTable::TABLE_ID).expect("valid fixture");
    let (mut tracker, _) = DeviceTracker::new(TrackerConfig::default(), handle, DroidTable::new());
    tracker.handle_event(TrackerEvent::Opened { generation: 1 });
    tracker
}

fn deliver(tracker: &mut DeviceTracker<DroidTable>, envelope: &Envelope) -> Vec<TrackerAction> {
    let text = envelope.encode().expect("valid fixture");
    tracker.handle_event(TrackerEvent::Message { generation: 1, text })
}

fn rendered(tracker: &DeviceTracker<DroidTable>) -> String {
    let mut doc =
        MemoryDocument::new(Url::parse("http://localhost/").expect("valid fixture"));
    tracker.render(&mut doc);
    doc.to_html()
}

proptest! {
    #[test]
    fn prop_last_snapshot_wins(snapshots in proptest::collection::vec(snapshot_strategy(), 1..5)) {
        let mut tracker = open_tracker();
        for snapshot in &snapshots {
            let actions = deliver(&mut tracker, &Envelope::DeviceList(snapshot.clone()));
            prop_assert_eq!(actions, vec![TrackerAction::Render]);
        }

        let last = snapshots.last().cloned().unwrap_or_default();
        prop_assert_eq!(tracker.devices().as_slice(), last.as_slice());
    }

    #[test]
    fn prop_known_delta_updates_in_place(
        snapshot in snapshot_strategy(),
        index in any::<prop::sample::Index>(),
        update in descriptor_strategy(),
    ) {
        prop_assume!(!snapshot.is_empty());
        let mut tracker = open_tracker();
        deliver(&mut tracker, &Envelope::DeviceList(snapshot.clone()));

        let position = index.index(snapshot.len());
        let mut delta = update;
        delta.udid = snapshot[position].udid.clone();
        deliver(&mut tracker, &Envelope::Device(delta.clone()));

        let devices = tracker.devices().as_slice();
        prop_assert_eq!(devices.len(), snapshot.len());
        prop_assert_eq!(&devices[position], &delta);
        for (i, (after, before)) in devices.iter().zip(&snapshot).enumerate() {
            if i != position {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn prop_novel_delta_appends(snapshot in snapshot_strategy(), update in descriptor_strategy()) {
        let mut tracker = open_tracker();
        deliver(&mut tracker, &Envelope::DeviceList(snapshot.clone()));

        let mut delta = update;
        delta.udid = "Z-new".to_owned();
        deliver(&mut tracker, &Envelope::Device(delta.clone()));

        let devices = tracker.devices().as_slice();
        prop_assert_eq!(devices.len(), snapshot.len() + 1);
        prop_assert_eq!(&devices[..snapshot.len()], snapshot.as_slice());
        prop_assert_eq!(devices.last(), Some(&delta));
    }

    #[test]
    fn prop_delta_is_idempotent(snapshot in snapshot_strategy(), delta in descriptor_strategy()) {
        let mut once = open_tracker();
        deliver(&mut once, &Envelope::DeviceList(snapshot.clone()));
        deliver(&mut once, &Envelope::Device(delta.clone()));

        let mut twice = open_tracker();
        deliver(&mut twice, &Envelope::DeviceList(snapshot));
        deliver(&mut twice, &Envelope::Device(delta.clone()));
        deliver(&mut twice, &Envelope::Device(delta));

        prop_assert_eq!(once.devices(), twice.devices());
        prop_assert_eq!(rendered(&once), rendered(&twice));
    }

    #[test]
    fn prop_undecodable_frames_change_nothing(
        snapshot in snapshot_strategy(),
        cut in any::<prop::sample::Index>(),
        noise in "[^{}]*",
    ) {
        let mut tracker = open_tracker();
        let envelope = Envelope::DeviceList(snapshot);
        let text = envelope.encode().expect("valid fixture");
        deliver(&mut tracker, &envelope);

        let devices_before = tracker.devices().clone();
        let html_before = rendered(&tracker);

        // Every strict prefix of a JSON object is invalid JSON
        let truncated: String = text.chars().take(cut.index(text.len())).collect();
        for frame in [truncated, noise] {
            let actions =
                tracker.handle_event(TrackerEvent::Message { generation: 1, text: frame });
            prop_assert!(actions.is_empty());
        }

        prop_assert_eq!(tracker.devices(), &devices_before);
        prop_assert_eq!(rendered(&tracker), html_before);
    }
}

#[test]
fn droid_table_columns_are_stable() {
    let titles: Vec<_> = DroidTable::new().columns().iter().map(|c| c.title.clone()).collect();
    assert_eq!(titles, ["Model", "Serial", "State", "Stream", "Shell", "Devtools"]);
}
