//! Error types for firmware image and partition table parsing.

use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for firmware image and partition table parsing.
///
/// Every parse error is terminal for the call that produced it; nothing is
/// retried. Observed and expected values are rendered as lowercase hex.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Image header magic byte is not `0xe9`.
    #[error("wrong image header magic byte: got {actual:#04x}, expected {expected:#04x}")]
    WrongMagicByteHeader { actual: u8, expected: u8 },

    /// App description magic word is not `0xabcd5432`.
    #[error("wrong app description magic word: got {actual:#010x}, expected {expected:#010x}")]
    WrongMagicWordApp { actual: u32, expected: u32 },

    /// Bootloader description magic byte is not `0x50`.
    #[error("wrong bootloader description magic byte: got {actual:#04x}, expected {expected:#04x}")]
    WrongMagicByteBootloader { actual: u8, expected: u8 },

    /// Neither a partition entry nor the checksum entry at this offset.
    #[error("wrong partition table magic word at offset {offset:#x}: got {actual:#06x}")]
    WrongMagicWordPartitionTable { offset: usize, actual: u16 },

    /// A recomputed digest differs from the one embedded in the data.
    #[error("{algorithm} mismatch: calculated {calculated}, expected {expected}")]
    HashMismatch {
        algorithm: &'static str,
        calculated: String,
        expected: String,
    },

    /// No digest implementation is available.
    #[error("digest unavailable")]
    DigestUnavailable,

    /// A companion file is missing.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Not enough bytes for a fixed-size structure.
    #[error("buffer too small for {context}: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ParseError {
    /// Creates a new BufferTooSmall error.
    pub fn too_small(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::BufferTooSmall {
            context,
            expected,
            actual,
        }
    }

    /// Creates a new HashMismatch error.
    pub fn hash_mismatch(
        algorithm: &'static str,
        calculated: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::HashMismatch {
            algorithm,
            calculated: calculated.into(),
            expected: expected.into(),
        }
    }

    /// Stable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WrongMagicByteHeader { .. } => "WrongMagicByteHeader",
            Self::WrongMagicWordApp { .. } => "WrongMagicWordApp",
            Self::WrongMagicByteBootloader { .. } => "WrongMagicByteBootloader",
            Self::WrongMagicWordPartitionTable { .. } => "WrongMagicWordPartitionTable",
            Self::HashMismatch { .. } => "HashMismatch",
            Self::DigestUnavailable => "DigestUnavailable",
            Self::FileNotFound(_) => "FileNotFound",
            Self::BufferTooSmall { .. } => "BufferTooSmall",
        }
    }

    /// Stable numeric code of the error kind.
    pub fn code(&self) -> u8 {
        match self {
            Self::WrongMagicByteHeader { .. } => 1,
            Self::WrongMagicWordApp { .. } => 2,
            Self::WrongMagicByteBootloader { .. } => 3,
            Self::WrongMagicWordPartitionTable { .. } => 4,
            Self::HashMismatch { .. } => 5,
            Self::DigestUnavailable => 6,
            Self::FileNotFound(_) => 7,
            Self::BufferTooSmall { .. } => 8,
        }
    }
}

impl Serialize for ParseError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParseError", 3)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("detail", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_detail_is_hex() {
        let err = ParseError::WrongMagicByteHeader {
            actual: 0x00,
            expected: 0xE9,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x00"));
        assert!(msg.contains("0xe9"));

        let err = ParseError::WrongMagicWordApp {
            actual: 0xDEADBEEF,
            expected: 0xABCD5432,
        };
        assert!(err.to_string().contains("0xdeadbeef"));
        assert!(err.to_string().contains("0xabcd5432"));
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            ParseError::WrongMagicByteHeader { actual: 0, expected: 0 },
            ParseError::WrongMagicWordApp { actual: 0, expected: 0 },
            ParseError::WrongMagicByteBootloader { actual: 0, expected: 0 },
            ParseError::WrongMagicWordPartitionTable { offset: 0, actual: 0 },
            ParseError::hash_mismatch("MD5", "a", "b"),
            ParseError::DigestUnavailable,
            ParseError::FileNotFound(PathBuf::from("flasher_args.json")),
            ParseError::too_small("image header", 24, 3),
        ];
        let mut codes: Vec<u8> = errors.iter().map(ParseError::code).collect();
        codes.dedup();
        assert_eq!(codes, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_serialize_renders_kind_and_detail() {
        let err = ParseError::too_small("image header", 24, 3);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "BufferTooSmall");
        assert_eq!(json["code"], 8);
        assert!(json["detail"].as_str().unwrap().contains("image header"));
    }
}
