#![no_main]

use hostdialog::BridgeMessage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that decodes must decode again after a re-encode.
    if let Some(message) = BridgeMessage::decode(text) {
        let encoded = message.encode().expect("bridge messages always encode");
        assert!(BridgeMessage::decode(&encoded).is_some());
    }
});
