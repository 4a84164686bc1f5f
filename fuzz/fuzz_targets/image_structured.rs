#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use espray_formats::image::{segments, APP_DESC_MAGIC, BOOTLOADER_DESC_MAGIC};
use espray_formats::{parse_app_image, parse_bootloader_image, FirmwareImage};

/// Image with a valid magic so parsing reaches the description and hash
#[derive(Debug, Arbitrary)]
struct FuzzedImage {
    segment_count: u8,
    spi_mode: u8,
    spi_speed_size: u8,
    entry_addr: u32,
    chip_id: u16,
    min_chip_rev_full: u16,
    max_chip_rev_full: u16,
    hash_appended: bool,
    app: bool,
    segments: Vec<FuzzedSegment>,
    description: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
struct FuzzedSegment {
    load_addr: u32,
    data_len: u16,
    data: Vec<u8>,
}

impl FuzzedImage {
    fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; 24];
        data[0] = 0xE9;
        data[1] = self.segment_count;
        data[2] = self.spi_mode;
        data[3] = self.spi_speed_size;
        data[4..8].copy_from_slice(&self.entry_addr.to_le_bytes());
        data[12..14].copy_from_slice(&self.chip_id.to_le_bytes());
        data[15..17].copy_from_slice(&self.min_chip_rev_full.to_le_bytes());
        data[17..19].copy_from_slice(&self.max_chip_rev_full.to_le_bytes());
        data[23] = self.hash_appended as u8;

        let mut description = self.description.clone();
        if self.app {
            description.splice(0..description.len().min(4), APP_DESC_MAGIC.to_le_bytes());
        } else if let Some(first) = description.first_mut() {
            *first = BOOTLOADER_DESC_MAGIC;
        }
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&(description.len() as u32).to_le_bytes());
        data.extend_from_slice(&description);

        for segment in &self.segments {
            data.extend_from_slice(&segment.load_addr.to_le_bytes());
            data.extend_from_slice(&(segment.data_len as u32).to_le_bytes());
            data.extend_from_slice(&segment.data);
        }
        data
    }
}

fuzz_target!(|image: FuzzedImage| {
    let data = image.build();

    if let Ok(app) = parse_app_image(&data) {
        assert_eq!(app.entry_point(), image.entry_addr);
        assert!(segments(&data, app.header()).count() <= image.segment_count as usize);
    }

    if let Ok(bootloader) = parse_bootloader_image(&data) {
        assert_eq!(bootloader.header().segment_count, image.segment_count);
        let _ = bootloader.header().pin_drive();
    }
});
