#![no_main]

use libfuzzer_sys::fuzz_target;
use espray_formats::image::segments;
use espray_formats::{discover_kind, parse_app_image, parse_bootloader_image, FirmwareImage};

fuzz_target!(|data: &[u8]| {
    // Parsing should never panic
    if let Ok(app) = parse_app_image(data) {
        let _ = app.entry_point();
        let _ = app.version();
        for segment in segments(data, app.header()) {
            let _ = segment.data(data);
        }
    }

    if let Ok(bootloader) = parse_bootloader_image(data) {
        let _ = bootloader.idf_version();
        let _ = bootloader.header().min_revision().to_string();
    }

    let _ = discover_kind(data);
});
