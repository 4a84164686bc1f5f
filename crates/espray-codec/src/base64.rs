//! RFC 4648 base64.
//!
//! Decoding is lenient: characters outside the alphabet (whitespace,
//! line breaks, `=`) are skipped, so padded and unpadded input decode to
//! the same bytes. A trailing group of a single character carries fewer
//! than 8 bits and is dropped.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Output column at which encoded text is wrapped when line breaks are on.
pub const LINE_LENGTH: usize = 76;

const INVALID: u8 = 0xFF;

const DECODE_TABLE: [u8; 256] = build_decode_table();

const fn build_decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Options for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64Options {
    /// Wrap output every [`LINE_LENGTH`] characters.
    pub line_break: bool,
    /// Append `=` so the output length is a multiple of 4.
    pub padding: bool,
}

impl Default for Base64Options {
    fn default() -> Self {
        Self {
            line_break: false,
            padding: true,
        }
    }
}

/// Returns the 6-bit value of a base64 character, if it is one.
pub fn sextet(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    match DECODE_TABLE[c as usize] {
        INVALID => None,
        value => Some(value),
    }
}

/// Encode bytes as base64.
pub fn encode(data: &[u8], options: Base64Options) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b0 = chunk[0] as u32;
        let b1 = chunk.get(1).copied().unwrap_or(0) as u32;
        let b2 = chunk.get(2).copied().unwrap_or(0) as u32;
        let group = (b0 << 16) | (b1 << 8) | b2;

        // chunk.len() + 1 output characters carry data
        let significant = chunk.len() + 1;
        for i in 0..4 {
            if i < significant {
                let index = (group >> (18 - 6 * i)) & 0x3F;
                out.push(ALPHABET[index as usize] as char);
            } else if options.padding {
                out.push('=');
            }
        }
    }

    if options.line_break {
        wrap(&out, LINE_LENGTH)
    } else {
        out
    }
}

fn wrap(text: &str, width: usize) -> String {
    let mut wrapped = String::with_capacity(text.len() + text.len() / width);
    for (i, c) in text.chars().enumerate() {
        if i > 0 && i % width == 0 {
            wrapped.push('\n');
        }
        wrapped.push(c);
    }
    wrapped
}

/// Decode base64 text into bytes.
///
/// `=` ends the current quantum, so concatenated padded groups decode
/// independently.
pub fn decode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() / 4 * 3 + 2);
    let mut group = [0u8; 4];
    let mut len = 0;

    for c in text.chars() {
        if c == '=' {
            flush(&group[..len], &mut out);
            len = 0;
            continue;
        }
        if let Some(value) = sextet(c) {
            group[len] = value;
            len += 1;
            if len == 4 {
                flush(&group, &mut out);
                len = 0;
            }
        }
    }
    flush(&group[..len], &mut out);

    out
}

fn flush(group: &[u8], out: &mut Vec<u8>) {
    let mut acc = 0u32;
    for (i, value) in group.iter().enumerate() {
        acc |= (*value as u32) << (18 - 6 * i);
    }
    let bytes = [(acc >> 16) as u8, (acc >> 8) as u8, acc as u8];
    // 4 chars -> 3 bytes, 3 -> 2, 2 -> 1, 1 -> nothing
    let produced = group.len().saturating_sub(1);
    out.extend_from_slice(&bytes[..produced]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        let opts = Base64Options::default();
        assert_eq!(encode(&[], opts), "");
        assert_eq!(encode(b"f", opts), "Zg==");
        assert_eq!(encode(b"fo", opts), "Zm8=");
        assert_eq!(encode(&[0x66, 0x6F, 0x6F], opts), "Zm9v");
        assert_eq!(encode(b"foobar", opts), "Zm9vYmFy");
        assert_eq!(decode("Zm9v"), vec![0x66, 0x6F, 0x6F]);
        assert_eq!(decode("Zm9vYg=="), b"foob");
    }

    #[test]
    fn test_padding_is_optional_on_decode() {
        assert_eq!(decode("Zm8="), decode("Zm8"));
        assert_eq!(decode("Zg=="), b"f");
        assert_eq!(decode("Zg"), b"f");
    }

    #[test]
    fn test_padding_ends_quantum() {
        assert_eq!(decode("Zg==Zg=="), vec![0x66, 0x66]);
        assert_eq!(decode("Zm8=Zm9v"), b"fofoo");
        assert_eq!(decode("Zg==\nZm8="), b"ffo");
        assert_eq!(decode("===="), Vec::<u8>::new());
    }

    #[test]
    fn test_padding_suppression() {
        let opts = Base64Options {
            line_break: false,
            padding: false,
        };
        assert_eq!(encode(b"f", opts), "Zg");
        assert_eq!(encode(b"fo", opts), "Zm8");
    }

    #[test]
    fn test_line_break_at_76_columns() {
        let data = vec![0xABu8; 120];
        let opts = Base64Options {
            line_break: true,
            padding: true,
        };
        let encoded = encode(&data, opts);
        let lines: Vec<&str> = encoded.split('\n').collect();
        assert_eq!(lines[0].len(), LINE_LENGTH);
        assert!(lines.iter().all(|l| l.len() <= LINE_LENGTH));
        assert_eq!(decode(&encoded), data);
    }

    #[test]
    fn test_decode_skips_foreign_characters() {
        assert_eq!(decode(" Zm\n9v\t"), b"foo");
        assert_eq!(decode("Z"), Vec::<u8>::new());
        assert_eq!(sextet('-'), None);
        assert_eq!(sextet('/'), Some(63));
    }
}
