//! The six textual encodings and their alphabets.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::CodecError;

/// A textual representation of a byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Base 2, 8 characters per byte.
    Binary,
    /// Base 8, 3 characters per byte.
    Octal,
    /// Base 10, 3 characters per byte.
    Decimal,
    /// Base 16, 2 characters per byte.
    Hexa,
    /// Printable ASCII with `\n`, `\r`, `\0`, `\\` and `\xHH` escapes.
    Text,
    /// RFC 4648 base64 with `=` padding.
    Base64,
}

impl Encoding {
    /// All supported encodings.
    pub const ALL: [Encoding; 6] = [
        Encoding::Binary,
        Encoding::Octal,
        Encoding::Decimal,
        Encoding::Hexa,
        Encoding::Text,
        Encoding::Base64,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Octal => "octal",
            Self::Decimal => "decimal",
            Self::Hexa => "hexa",
            Self::Text => "text",
            Self::Base64 => "base64",
        }
    }

    /// Numeric radix for the digit encodings.
    pub fn radix(self) -> Option<u32> {
        match self {
            Self::Binary => Some(2),
            Self::Octal => Some(8),
            Self::Decimal => Some(10),
            Self::Hexa => Some(16),
            Self::Text | Self::Base64 => None,
        }
    }

    /// Number of characters a fully padded byte occupies, for the digit
    /// encodings.
    pub fn width(self) -> Option<usize> {
        match self {
            Self::Binary => Some(8),
            Self::Octal | Self::Decimal => Some(3),
            Self::Hexa => Some(2),
            Self::Text | Self::Base64 => None,
        }
    }

    /// Returns true if `c` belongs to this encoding's alphabet.
    pub fn accepts(self, c: char) -> bool {
        match self {
            Self::Binary => matches!(c, '0' | '1'),
            Self::Octal => matches!(c, '0'..='7'),
            Self::Decimal => c.is_ascii_digit(),
            Self::Hexa => c.is_ascii_hexdigit(),
            Self::Text => true,
            Self::Base64 => c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|encoding| encoding.name() == s)
            .ok_or_else(|| CodecError::UnknownEncoding(s.to_string()))
    }
}

/// Resolve an encoding by name.
pub fn check_encoding(name: &str) -> Result<Encoding, CodecError> {
    name.parse()
}
