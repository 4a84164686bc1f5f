//! ESP application and bootloader image parser.
//!
//! Parsing runs header -> first segment header -> description -> optional
//! hash verification. App images require a valid app description.
//! Bootloader images tolerate a missing or invalid description, since the
//! block was added to the format later.

mod description;
mod header;
mod verify;

pub use description::{
    AppDescription, BootloaderDescription, APP_DESC_MAGIC, BOOTLOADER_DESC_MAGIC,
    DESCRIPTION_OFFSET,
};
pub use header::{
    segments, ChipId, ChipRevision, ImageHeader, Segment, SegmentHeader, Segments, SpiMode,
    SpiPinDrive, SpiSize, SpiSpeed, ESP_IMAGE_MAGIC, WP_PIN_DISABLED,
};
pub use verify::{verify_hash, verify_hash_with};

use serde::Serialize;
use tracing::{debug, warn};

use crate::digest::{DigestProvider, Sha2Digest};
use crate::{FirmwareImage, ImageKind, ParseError};

/// Fields shared by every image kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBase {
    pub header: ImageHeader,
    /// First segment header, immediately after the image header.
    pub header_segment: SegmentHeader,
    /// Verified SHA-256 trailer, when appended and a digest is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// A parsed application image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageApp {
    #[serde(flatten)]
    pub base: ImageBase,
    pub description: AppDescription,
}

/// A parsed bootloader image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBootloader {
    #[serde(flatten)]
    pub base: ImageBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<BootloaderDescription>,
}

/// Parse an application image, verifying its hash with SHA-256.
pub fn parse_app_image(data: &[u8]) -> Result<ImageApp, ParseError> {
    parse_app_image_with(data, &Sha2Digest)
}

/// [`parse_app_image`] with an explicit digest provider.
pub fn parse_app_image_with<D>(data: &[u8], digest: &D) -> Result<ImageApp, ParseError>
where
    D: DigestProvider + ?Sized,
{
    let (header, header_segment) = parse_headers(data)?;
    let description = AppDescription::parse(data.get(DESCRIPTION_OFFSET..).unwrap_or_default())?;
    debug!(
        project = %description.project_name,
        version = %description.version,
        "parsed app description"
    );
    let hash = attach_hash(data, &header, digest)?;

    Ok(ImageApp {
        base: ImageBase {
            header,
            header_segment,
            hash,
        },
        description,
    })
}

/// Parse a bootloader image, verifying its hash with SHA-256.
pub fn parse_bootloader_image(data: &[u8]) -> Result<ImageBootloader, ParseError> {
    parse_bootloader_image_with(data, &Sha2Digest)
}

/// [`parse_bootloader_image`] with an explicit digest provider.
pub fn parse_bootloader_image_with<D>(data: &[u8], digest: &D) -> Result<ImageBootloader, ParseError>
where
    D: DigestProvider + ?Sized,
{
    let (header, header_segment) = parse_headers(data)?;
    let description =
        match BootloaderDescription::parse(data.get(DESCRIPTION_OFFSET..).unwrap_or_default()) {
            Ok(description) => Some(description),
            Err(err) => {
                warn!(%err, "no bootloader description");
                None
            }
        };
    let hash = attach_hash(data, &header, digest)?;

    Ok(ImageBootloader {
        base: ImageBase {
            header,
            header_segment,
            hash,
        },
        description,
    })
}

fn parse_headers(data: &[u8]) -> Result<(ImageHeader, SegmentHeader), ParseError> {
    let header = ImageHeader::parse(data)?;
    header.check_magic()?;
    let segment = SegmentHeader::parse(&data[ImageHeader::SIZE..])?;
    debug!(
        segments = header.segment_count,
        entry = header.entry_addr,
        chip = %header.chip_id,
        "parsed image header"
    );
    Ok((header, segment))
}

/// Digest unavailability leaves the hash out; any other failure is fatal.
fn attach_hash<D>(data: &[u8], header: &ImageHeader, digest: &D) -> Result<Option<String>, ParseError>
where
    D: DigestProvider + ?Sized,
{
    if !header.has_hash() {
        return Ok(None);
    }
    match verify_hash_with(data, digest) {
        Ok(hash) => Ok(Some(hash)),
        Err(ParseError::DigestUnavailable) => {
            warn!("SHA-256 unavailable, image hash not checked");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl FirmwareImage for ImageApp {
    fn kind(&self) -> ImageKind {
        ImageKind::App
    }

    fn base(&self) -> &ImageBase {
        &self.base
    }

    fn version(&self) -> Option<String> {
        Some(self.description.version.clone())
    }

    fn idf_version(&self) -> Option<&str> {
        Some(&self.description.idf_ver)
    }
}

impl FirmwareImage for ImageBootloader {
    fn kind(&self) -> ImageKind {
        ImageKind::Bootloader
    }

    fn base(&self) -> &ImageBase {
        &self.base
    }

    fn version(&self) -> Option<String> {
        self.description.as_ref().map(|d| d.version.to_string())
    }

    fn idf_version(&self) -> Option<&str> {
        self.description.as_ref().map(|d| d.idf_ver.as_str())
    }
}
