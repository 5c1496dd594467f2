#![no_main]

use hostdialog::html_encode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let encoded = html_encode(text);
    let stripped = encoded.replace("<br />", "");
    assert!(!stripped.contains(['<', '>', '"', '\'']));
    if !text.contains(['<', '>', '&', '"', '\'', '\n']) {
        assert_eq!(encoded, text);
    }
});
