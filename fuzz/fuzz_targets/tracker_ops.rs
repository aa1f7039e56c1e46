#![no_main]

use devtrack_core::{
    DeviceTracker, MemoryDocument, TableRegistry, TrackerAction, TrackerConfig, table::DroidTable,
};
use devtrack_harness::{ModelTracker, Operation};
use libfuzzer_sys::fuzz_target;
use url::Url;

fuzz_target!(|ops: Vec<Operation>| {
    let handle = TableRegistry::new().claim(DroidTable::TABLE_ID).expect("fresh registry");
    let (mut tracker, _) = DeviceTracker::new(TrackerConfig::default(), handle, DroidTable::new());
    let mut document = MemoryDocument::new(Url::parse("http://localhost/").expect("valid url"));
    let mut model = ModelTracker::new();

    for (entropy, op) in ops.iter().enumerate() {
        model.apply(op);
        let event = op.to_event(tracker.connection().generation(), entropy as u64);
        for action in tracker.handle_event(event) {
            if matches!(action, TrackerAction::Render) {
                tracker.render(&mut document);
            }
        }

        assert_eq!(tracker.devices().as_slice(), model.devices());
        assert_eq!(tracker.connection().pending_reconnect().is_some(), model.reconnect_armed());
    }
});
