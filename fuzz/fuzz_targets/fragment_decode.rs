#![no_main]

use devtrack_proto::ActionParams;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(params) = ActionParams::from_fragment(text) {
        let fragment = params.to_fragment();
        assert_eq!(ActionParams::from_fragment(&fragment).ok(), Some(params));
    }
});
