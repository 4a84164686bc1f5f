//! App and bootloader description blocks.
//!
//! Both sit right after the image header and the first segment header.
//! Apps must carry a valid description; bootloaders gained one later and
//! older images have none.

use espray_codec::hex_string;
use serde::Serialize;

use super::header::{ImageHeader, SegmentHeader};
use crate::macros::c_string;
use crate::ParseError;

/// File offset of the description block.
pub const DESCRIPTION_OFFSET: usize = ImageHeader::SIZE + SegmentHeader::SIZE;

/// App description magic word.
pub const APP_DESC_MAGIC: u32 = 0xABCD5432;

/// Bootloader description magic byte.
pub const BOOTLOADER_DESC_MAGIC: u8 = 0x50;

/// Parsed `esp_app_desc_t`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppDescription {
    pub magic_word: u32,
    pub secure_version: u32,
    /// Application version.
    pub version: String,
    pub project_name: String,
    /// Compile time.
    pub time: String,
    /// Compile date.
    pub date: String,
    /// ESP-IDF version the app was built with.
    pub idf_ver: String,
    /// SHA-256 of the application ELF, lowercase hex.
    pub app_elf_sha256: String,
}

impl AppDescription {
    /// Size of the description block in bytes.
    pub const SIZE: usize = 256;

    /// Parse an app description from the start of `data`.
    ///
    /// The magic word is checked as soon as four bytes are available, so a
    /// short block of another kind still reports the wrong magic.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let Some(magic) = data.get(0..4) else {
            return Err(ParseError::too_small("app description", Self::SIZE, data.len()));
        };
        let magic_word = u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]);
        if magic_word != APP_DESC_MAGIC {
            return Err(ParseError::WrongMagicWordApp {
                actual: magic_word,
                expected: APP_DESC_MAGIC,
            });
        }

        if data.len() < Self::SIZE {
            return Err(ParseError::too_small("app description", Self::SIZE, data.len()));
        }

        Ok(Self {
            magic_word,
            secure_version: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            version: c_string(&data[16..48]),
            project_name: c_string(&data[48..80]),
            time: c_string(&data[80..96]),
            date: c_string(&data[96..112]),
            idf_ver: c_string(&data[112..144]),
            app_elf_sha256: hex_string(&data[144..176]),
        })
    }
}

/// Parsed `esp_bootloader_desc_t`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootloaderDescription {
    pub magic_byte: u8,
    pub version: u32,
    /// ESP-IDF version the bootloader was built with.
    pub idf_ver: String,
    /// Compile date and time.
    pub date_time: String,
}

impl BootloaderDescription {
    /// Size of the description block in bytes.
    pub const SIZE: usize = 80;

    /// Parse a bootloader description from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < Self::SIZE {
            return Err(ParseError::too_small(
                "bootloader description",
                Self::SIZE,
                data.len(),
            ));
        }

        if data[0] != BOOTLOADER_DESC_MAGIC {
            return Err(ParseError::WrongMagicByteBootloader {
                actual: data[0],
                expected: BOOTLOADER_DESC_MAGIC,
            });
        }

        Ok(Self {
            magic_byte: data[0],
            version: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            idf_ver: c_string(&data[8..40]),
            date_time: c_string(&data[40..64]),
        })
    }
}
