#![no_main]

use libfuzzer_sys::fuzz_target;
use espray_codec::{format, parse, to_text, Encoding, FormatOptions};

fuzz_target!(|data: &[u8]| {
    // Bytes survive a trip through every encoding
    for encoding in Encoding::ALL {
        let options = FormatOptions::for_encoding(encoding);
        let text = format(&to_text(data, encoding, false), encoding, &options);
        assert_eq!(parse(&text, encoding), data, "{encoding}");
    }

    // Arbitrary text never panics the tokenizers
    if let Ok(text) = std::str::from_utf8(data) {
        for encoding in Encoding::ALL {
            let _ = parse(text, encoding);
        }
    }
});
