//! Property-based tests for the byte codec.
//!
//! These tests verify that every encoding round-trips arbitrary bytes and
//! that decoding arbitrary text never panics.

use proptest::prelude::*;

use espray_codec::base64::{self, Base64Options};
use espray_codec::{clear_string, format, is_valid, parse, split, to_text, Encoding, FormatOptions};

fn any_encoding() -> impl Strategy<Value = Encoding> {
    prop::sample::select(Encoding::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// parse(format(to_text(b))) == b for every encoding, padded or not.
    #[test]
    fn round_trip(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
        encoding in any_encoding(),
        pad in any::<bool>(),
    ) {
        let mut options = FormatOptions::for_encoding(encoding);
        options.pad = pad;
        let text = format(&to_text(&bytes, encoding, pad), encoding, &options);
        prop_assert_eq!(parse(&text, encoding), bytes);
    }

    /// Fully padded digit tokens need no separator.
    #[test]
    fn padded_tokens_round_trip_without_separator(
        bytes in prop::collection::vec(any::<u8>(), 0..128),
        encoding in prop::sample::select(vec![
            Encoding::Binary, Encoding::Octal, Encoding::Decimal, Encoding::Hexa,
        ]),
    ) {
        let options = FormatOptions { separator: String::new(), pad: true };
        let text = format(&to_text(&bytes, encoding, true), encoding, &options);
        prop_assert_eq!(parse(&text, encoding), bytes);
    }

    /// Decoding arbitrary text never panics and split tokens stay in range.
    #[test]
    fn parse_never_panics(text in ".{0,200}", encoding in any_encoding()) {
        let _ = parse(&text, encoding);
        let _ = split(&text, encoding);
    }

    /// Stripped text is always valid.
    #[test]
    fn clear_string_yields_valid_text(text in ".{0,200}", encoding in any_encoding()) {
        prop_assert!(is_valid(&clear_string(&text, encoding), encoding));
    }

    /// Wrapped, unpadded base64 decodes to the same bytes as the default form.
    #[test]
    fn base64_options_do_not_change_payload(
        bytes in prop::collection::vec(any::<u8>(), 0..300),
        line_break in any::<bool>(),
        padding in any::<bool>(),
    ) {
        let encoded = base64::encode(&bytes, Base64Options { line_break, padding });
        prop_assert_eq!(base64::decode(&encoded), bytes);
    }
}

#[test]
fn empty_input_round_trips_everywhere() {
    for encoding in Encoding::ALL {
        let tokens = to_text(&[], encoding, false);
        assert!(tokens.is_empty());
        let text = format(&tokens, encoding, &FormatOptions::for_encoding(encoding));
        assert!(parse(&text, encoding).is_empty());
    }
}
