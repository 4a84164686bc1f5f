//! Traits shared by the image kinds.

use crate::image::{ImageBase, ImageHeader};
use crate::ImageKind;

/// A parsed firmware image.
///
/// Abstracts over app and bootloader images so callers can render the
/// common header fields without matching on the kind.
pub trait FirmwareImage {
    /// Returns the image kind.
    fn kind(&self) -> ImageKind;

    /// Returns the fields shared by every image kind.
    fn base(&self) -> &ImageBase;

    /// Version string from the description block, if there is one.
    fn version(&self) -> Option<String>;

    /// ESP-IDF version from the description block, if there is one.
    fn idf_version(&self) -> Option<&str>;

    /// Returns the image header.
    fn header(&self) -> &ImageHeader {
        &self.base().header
    }

    /// Returns the entry point address.
    fn entry_point(&self) -> u32 {
        self.header().entry_addr
    }

    /// Verified SHA-256 of the image as lowercase hex.
    fn hash(&self) -> Option<&str> {
        self.base().hash.as_deref()
    }
}
