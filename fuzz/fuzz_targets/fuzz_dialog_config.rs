#![no_main]

use hostdialog::DialogConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = DialogConfig::from_json_str(text);
});
