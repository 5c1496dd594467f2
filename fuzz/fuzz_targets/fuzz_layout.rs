#![no_main]

use arbitrary::Arbitrary;
use hostdialog::{DialogConfig, DialogLayout};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    width: u32,
    height: u32,
    padding: u32,
    has_buttons: bool,
    has_title: bool,
}

fuzz_target!(|input: Input| {
    let config = DialogConfig::default();
    let layout = DialogLayout::compute(
        &config,
        input.width,
        input.height,
        input.padding,
        input.has_buttons,
        input.has_title,
    );
    assert!(layout.message_max_height <= i64::from(input.height));
    assert_eq!(layout.top_aligned, input.height > config.tall_content_threshold);
    assert!(layout.margin_top() <= 0.0 && layout.margin_left() <= 0.0);
});
