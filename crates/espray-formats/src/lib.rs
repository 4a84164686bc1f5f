//! # espray-formats
//!
//! Parsers for the ESP-IDF flash artifacts:
//! - App images - image header, first segment header, app description
//! - Bootloader images - same layout with an optional bootloader description
//! - Partition tables - 32-byte entries closed by an MD5 checksum entry
//!
//! Images with an appended SHA-256 are verified while parsing.

pub mod digest;
pub mod error;
pub mod image;
mod macros;
pub mod partition;
pub mod traits;

pub use digest::{DigestProvider, NoDigest, Sha2Digest};
pub use error::ParseError;
pub use image::{
    parse_app_image, parse_app_image_with, parse_bootloader_image, parse_bootloader_image_with,
    ImageApp, ImageBase, ImageBootloader, ImageHeader,
};
pub use partition::{PartitionEntry, PartitionTable, PartitionType};
pub use traits::FirmwareImage;

use serde::Serialize;
use tracing::debug;

/// Classification of a flash artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageKind {
    App,
    Bootloader,
    PartitionTable,
    Other,
}

impl ImageKind {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Bootloader => "bootloader",
            Self::PartitionTable => "partition-table",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Default flash offsets of the ESP-IDF artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlashOffsets {
    pub bootloader: u32,
    pub partition_table: u32,
    pub otadata: u32,
    pub app: u32,
}

impl FlashOffsets {
    pub const DEFAULT: Self = Self {
        bootloader: 0x1000,
        partition_table: 0x8000,
        otadata: 0xD000,
        app: 0x10000,
    };
}

impl Default for FlashOffsets {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Side information used when the bytes alone don't identify an artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindHint<'a> {
    /// File name the buffer was read from.
    pub filename: Option<&'a str>,
    /// Flash offset the buffer is written to.
    pub offset: Option<u32>,
}

/// Classify a buffer with no side information.
pub fn discover_kind(data: &[u8]) -> ImageKind {
    discover_kind_with_hint(data, &KindHint::default())
}

/// Classify a buffer.
///
/// Structural checks run first: an app parse, then a bootloader parse.
/// Failing both, the partition magic and the hint decide. Never fails.
pub fn discover_kind_with_hint(data: &[u8], hint: &KindHint<'_>) -> ImageKind {
    if parse_app_image(data).is_ok() {
        return ImageKind::App;
    }
    if parse_bootloader_image(data).is_ok() {
        return ImageKind::Bootloader;
    }

    let kind = heuristic_kind(data, hint);
    debug!(%kind, filename = hint.filename, offset = hint.offset, "classified by heuristics");
    kind
}

fn heuristic_kind(data: &[u8], hint: &KindHint<'_>) -> ImageKind {
    let offsets = FlashOffsets::DEFAULT;
    let filename = hint.filename.map(str::to_ascii_lowercase);
    let named = |needle: &str| filename.as_deref().is_some_and(|f| f.contains(needle));

    if data.len() >= 2 && u16::from_le_bytes([data[0], data[1]]) == partition::PARTITION_MAGIC {
        return ImageKind::PartitionTable;
    }
    if named("partition") || hint.offset == Some(offsets.partition_table) {
        return ImageKind::PartitionTable;
    }
    if named("bootloader") || matches!(hint.offset, Some(o) if o == offsets.bootloader || o == 0) {
        return ImageKind::Bootloader;
    }
    if hint.offset == Some(offsets.app) {
        return ImageKind::App;
    }
    ImageKind::Other
}
