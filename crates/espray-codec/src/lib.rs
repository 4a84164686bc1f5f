//! # espray-codec
//!
//! Lossless transcoding between raw bytes and six textual encodings:
//! - `binary`, `octal`, `decimal`, `hexa` - one digit group per byte
//! - `text` - printable ASCII with backslash escapes
//! - `base64` - RFC 4648
//!
//! For every byte sequence `b` and encoding `e`,
//! `parse(&format(&to_text(b, e, false), e, &FormatOptions::for_encoding(e)), e) == b`.

pub mod base64;
pub mod encoding;
pub mod error;
mod token;

pub use base64::Base64Options;
pub use encoding::{check_encoding, Encoding};
pub use error::CodecError;
pub use token::split;

/// Options controlling how tokens are joined into display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Inserted between consecutive tokens.
    pub separator: String,
    /// Left-pad digit tokens with zeros to the full byte width.
    pub pad: bool,
}

impl FormatOptions {
    /// Defaults for an encoding: digit encodings are space separated,
    /// `text` and `base64` are joined directly.
    pub fn for_encoding(encoding: Encoding) -> Self {
        let separator = match encoding {
            Encoding::Text | Encoding::Base64 => "",
            _ => " ",
        };
        Self {
            separator: separator.to_string(),
            pad: false,
        }
    }
}

/// Decode text in the given encoding into bytes.
///
/// Characters outside the encoding's alphabet are ignored.
pub fn parse(text: &str, encoding: Encoding) -> Vec<u8> {
    let tokens = split(text, encoding);
    match encoding {
        Encoding::Base64 => tokens.iter().flat_map(|t| base64::decode(t)).collect(),
        Encoding::Text => tokens.iter().flat_map(|t| parse_text_token(t)).collect(),
        _ => tokens
            .iter()
            .filter_map(|t| parse_digit_token(t, encoding))
            .collect(),
    }
}

fn parse_digit_token(token: &str, encoding: Encoding) -> Option<u8> {
    let radix = encoding.radix()?;
    let value = token
        .chars()
        .try_fold(0u32, |acc, c| Some(acc * radix + c.to_digit(radix)?))?;
    u8::try_from(value).ok()
}

fn parse_text_token(token: &str) -> Vec<u8> {
    match token {
        "\\n" => vec![b'\n'],
        "\\r" => vec![b'\r'],
        "\\0" => vec![0],
        "\\\\" => vec![b'\\'],
        _ => match token.strip_prefix("\\x").filter(|h| h.len() == 2) {
            Some(hex) => u8::from_str_radix(hex, 16)
                .map(|b| vec![b])
                .unwrap_or_else(|_| token.as_bytes().to_vec()),
            // non-ASCII characters contribute their UTF-8 bytes
            None => token.as_bytes().to_vec(),
        },
    }
}

/// Render bytes as tokens, one per byte (a single token for base64).
///
/// `pad` zero-pads digit tokens to the full byte width. It has no effect on
/// `text` and `base64`.
pub fn to_text(bytes: &[u8], encoding: Encoding, pad: bool) -> Vec<String> {
    match encoding {
        Encoding::Base64 => {
            if bytes.is_empty() {
                Vec::new()
            } else {
                vec![base64::encode(bytes, Base64Options::default())]
            }
        }
        Encoding::Text => bytes.iter().map(|b| escape_byte(*b)).collect(),
        Encoding::Binary => bytes
            .iter()
            .map(|b| if pad { format!("{b:08b}") } else { format!("{b:b}") })
            .collect(),
        Encoding::Octal => bytes
            .iter()
            .map(|b| if pad { format!("{b:03o}") } else { format!("{b:o}") })
            .collect(),
        Encoding::Decimal => bytes
            .iter()
            .map(|b| if pad { format!("{b:03}") } else { b.to_string() })
            .collect(),
        Encoding::Hexa => bytes
            .iter()
            .map(|b| if pad { format!("{b:02x}") } else { format!("{b:x}") })
            .collect(),
    }
}

fn escape_byte(byte: u8) -> String {
    match byte {
        b'\n' => "\\n".to_string(),
        b'\r' => "\\r".to_string(),
        0 => "\\0".to_string(),
        b'\\' => "\\\\".to_string(),
        0x20..=0x7E => (byte as char).to_string(),
        _ => format!("\\x{byte:02x}"),
    }
}

/// Join tokens into display text.
pub fn format<S: AsRef<str>>(tokens: &[S], encoding: Encoding, options: &FormatOptions) -> String {
    let width = encoding.width().filter(|_| options.pad);
    tokens
        .iter()
        .map(|t| match width {
            Some(w) => format!("{:0>w$}", t.as_ref()),
            None => t.as_ref().to_string(),
        })
        .collect::<Vec<_>>()
        .join(&options.separator)
}

/// Re-encode text from one encoding into another.
pub fn convert(text: &str, from: Encoding, to: Encoding) -> String {
    let bytes = parse(text, from);
    format(&to_text(&bytes, to, false), to, &FormatOptions::for_encoding(to))
}

/// Returns true if every character of `text` is in the encoding's
/// alphabet or is whitespace.
pub fn is_valid(text: &str, encoding: Encoding) -> bool {
    text.chars()
        .all(|c| encoding.accepts(c) || c.is_whitespace())
}

/// Strip characters that are neither in the encoding's alphabet nor
/// whitespace.
pub fn clear_string(text: &str, encoding: Encoding) -> String {
    text.chars()
        .filter(|c| encoding.accepts(*c) || c.is_whitespace())
        .collect()
}

/// Lowercase, unseparated hex rendering of `bytes`.
pub fn hex_string(bytes: &[u8]) -> String {
    to_text(bytes, Encoding::Hexa, true).concat()
}
