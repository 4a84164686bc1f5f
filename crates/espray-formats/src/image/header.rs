//! Image header and segment header parsing.

use std::fmt;

use serde::Serialize;

use crate::macros::lookup_enum;
use crate::ParseError;

/// Image header magic byte.
pub const ESP_IMAGE_MAGIC: u8 = 0xE9;

/// Write-protect pin value meaning "disabled".
pub const WP_PIN_DISABLED: u8 = 0xEE;

lookup_enum! {
    /// Flash read mode.
    pub enum SpiMode: u8 {
        Qio = 0 => "QIO",
        Qout = 1 => "QOUT",
        Dio = 2 => "DIO",
        Dout = 3 => "DOUT",
        FastRead = 4 => "FAST_READ",
        SlowRead = 5 => "SLOW_READ",
    }
}

lookup_enum! {
    /// Flash clock frequency (low nibble of header byte 3).
    pub enum SpiSpeed: u8 {
        Speed40M = 0x0 => "40MHz",
        Speed26M = 0x1 => "26MHz",
        Speed20M = 0x2 => "20MHz",
        Speed80M = 0xF => "80MHz",
    }
}

lookup_enum! {
    /// Flash chip size (high nibble of header byte 3).
    pub enum SpiSize: u8 {
        Size1M = 0 => "1MB",
        Size2M = 1 => "2MB",
        Size4M = 2 => "4MB",
        Size8M = 3 => "8MB",
        Size16M = 4 => "16MB",
        Size32M = 5 => "32MB",
        Size64M = 6 => "64MB",
        Size128M = 7 => "128MB",
    }
}

lookup_enum! {
    /// Target chip.
    pub enum ChipId: u16 {
        Esp32 = 0x0000 => "ESP32",
        Esp32s2 = 0x0002 => "ESP32-S2",
        Esp32c3 = 0x0005 => "ESP32-C3",
        Esp32s3 = 0x0009 => "ESP32-S3",
        Esp32c2 = 0x000C => "ESP32-C2",
        Esp32c6 = 0x000D => "ESP32-C6",
        Esp32h2 = 0x0010 => "ESP32-H2",
        Esp32p4 = 0x0012 => "ESP32-P4",
        Esp32c5 = 0x0017 => "ESP32-C5",
        Invalid = 0xFFFF => "Invalid",
    }
}

/// Chip revision in `major * 100 + minor` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChipRevision {
    pub major: u16,
    pub minor: u16,
}

impl From<u16> for ChipRevision {
    fn from(full: u16) -> Self {
        Self {
            major: full / 100,
            minor: full % 100,
        }
    }
}

impl fmt::Display for ChipRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Drive strengths packed into the three SPI pin drive bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpiPinDrive {
    pub clk: u8,
    pub q: u8,
    pub d: u8,
    pub cs: u8,
    pub gd: u8,
    pub wp: u8,
}

/// Parsed 24-byte image header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageHeader {
    /// Magic byte (should be 0xE9).
    pub magic: u8,
    /// Number of memory segments following the header.
    pub segment_count: u8,
    /// Flash read mode.
    pub spi_mode: SpiMode,
    /// Flash frequency.
    pub spi_speed: SpiSpeed,
    /// Flash size.
    pub spi_size: SpiSize,
    /// Entry point address.
    pub entry_addr: u32,
    /// Write-protect pin.
    pub wp_pin: u8,
    /// Raw SPI pin drive settings.
    pub spi_pin_drv: [u8; 3],
    /// Target chip.
    pub chip_id: ChipId,
    /// Legacy 8-bit minimum chip revision.
    pub min_chip_rev: u8,
    /// Minimum chip revision, `major * 100 + minor`.
    pub min_chip_rev_full: u16,
    /// Maximum chip revision, `major * 100 + minor`.
    pub max_chip_rev_full: u16,
    /// Reserved bytes.
    pub reserved: [u8; 4],
    /// 1 if a SHA-256 digest is appended to the image.
    pub hash_appended: u8,
}

impl ImageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 24;

    /// Decode a header from the start of `data`. The magic byte is not
    /// checked; see [`ImageHeader::check_magic`].
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < Self::SIZE {
            return Err(ParseError::too_small("image header", Self::SIZE, data.len()));
        }

        Ok(Self {
            magic: data[0],
            segment_count: data[1],
            spi_mode: SpiMode::from(data[2]),
            spi_speed: SpiSpeed::from(data[3] & 0xF),
            spi_size: SpiSize::from((data[3] >> 4) & 0xF),
            entry_addr: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            wp_pin: data[8],
            spi_pin_drv: [data[9], data[10], data[11]],
            chip_id: ChipId::from(u16::from_le_bytes([data[12], data[13]])),
            min_chip_rev: data[14],
            min_chip_rev_full: u16::from_le_bytes([data[15], data[16]]),
            max_chip_rev_full: u16::from_le_bytes([data[17], data[18]]),
            reserved: [data[19], data[20], data[21], data[22]],
            hash_appended: data[23],
        })
    }

    /// Fails with [`ParseError::WrongMagicByteHeader`] unless the magic is 0xE9.
    pub fn check_magic(&self) -> Result<(), ParseError> {
        if self.magic != ESP_IMAGE_MAGIC {
            return Err(ParseError::WrongMagicByteHeader {
                actual: self.magic,
                expected: ESP_IMAGE_MAGIC,
            });
        }
        Ok(())
    }

    /// Returns true if a SHA-256 digest trails the image.
    pub fn has_hash(&self) -> bool {
        self.hash_appended == 1
    }

    /// Returns true if the write-protect pin is disabled.
    pub fn wp_pin_disabled(&self) -> bool {
        self.wp_pin == WP_PIN_DISABLED
    }

    pub fn min_revision(&self) -> ChipRevision {
        ChipRevision::from(self.min_chip_rev_full)
    }

    pub fn max_revision(&self) -> ChipRevision {
        ChipRevision::from(self.max_chip_rev_full)
    }

    /// Per-pin drive strengths (low nibble first in each byte).
    pub fn pin_drive(&self) -> SpiPinDrive {
        let [clk_q, d_cs, gd_wp] = self.spi_pin_drv;
        SpiPinDrive {
            clk: clk_q & 0xF,
            q: clk_q >> 4,
            d: d_cs & 0xF,
            cs: d_cs >> 4,
            gd: gd_wp & 0xF,
            wp: gd_wp >> 4,
        }
    }
}

/// Parsed 8-byte segment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentHeader {
    /// Address the segment is loaded to.
    pub load_addr: u32,
    /// Length of the segment data following this header.
    pub data_len: u32,
}

impl SegmentHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 8;

    /// Decode a segment header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < Self::SIZE {
            return Err(ParseError::too_small("segment header", Self::SIZE, data.len()));
        }

        Ok(Self {
            load_addr: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            data_len: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        })
    }
}

/// A segment header located in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// File offset of the segment header.
    pub offset: usize,
    #[serde(flatten)]
    pub header: SegmentHeader,
}

impl Segment {
    /// Segment payload, if it lies within `data`.
    pub fn data<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        let start = self.offset.checked_add(SegmentHeader::SIZE)?;
        let end = start.checked_add(self.header.data_len as usize)?;
        data.get(start..end)
    }
}

/// Iterator over the segment headers of an image.
///
/// Stops after `segment_count` headers or when the next header would lie
/// past the end of the buffer.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    data: &'a [u8],
    offset: usize,
    remaining: u8,
}

/// Walk every segment header described by `header`.
pub fn segments<'a>(data: &'a [u8], header: &ImageHeader) -> Segments<'a> {
    Segments {
        data,
        offset: ImageHeader::SIZE,
        remaining: header.segment_count,
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let header = SegmentHeader::parse(self.data.get(self.offset..)?).ok()?;
        let segment = Segment {
            offset: self.offset,
            header,
        };

        self.remaining -= 1;
        self.offset = match self
            .offset
            .checked_add(SegmentHeader::SIZE)
            .and_then(|o| o.checked_add(header.data_len as usize))
        {
            Some(next) => next,
            None => {
                self.remaining = 0;
                self.offset
            }
        };

        Some(segment)
    }
}
