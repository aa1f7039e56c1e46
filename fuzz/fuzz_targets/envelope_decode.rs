#![no_main]

use devtrack_proto::Envelope;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Anything that decodes must survive a re-encode unchanged
    if let Ok(envelope) = Envelope::decode(text) {
        let encoded = envelope.encode().expect("decoded envelope encodes");
        let again = Envelope::decode(&encoded).expect("re-encoded envelope decodes");
        assert_eq!(envelope, again);
    }
});
