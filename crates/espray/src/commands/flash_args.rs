//! `espray flash-args`: inspect every artifact of an ESP-IDF build.

use std::path::Path;

use anyhow::Result;
use espray_formats::{
    discover_kind_with_hint, parse_app_image, parse_bootloader_image, FirmwareImage, ImageKind,
    ParseError, PartitionTable,
};
use tracing::debug;

use super::{hint_for, read_file};
use crate::manifest::FlashManifest;

/// Handle `espray flash-args`.
///
/// Every listed file is classified and summarized. A missing file fails the
/// command after the remaining files have been reported.
pub fn handle_flash_args_command(dir: &Path) -> Result<()> {
    let manifest = FlashManifest::load(dir)?;
    let settings = &manifest.flash_settings;

    println!("Flash Arguments");
    println!("===============");
    if let Some(chip) = &manifest.extra_esptool_args.chip {
        println!("Chip:          {chip}");
    }
    if let Some(mode) = &settings.flash_mode {
        println!("Flash Mode:    {mode}");
    }
    if let Some(freq) = &settings.flash_freq {
        println!("Flash Freq:    {freq}");
    }
    if let Some(size) = &settings.flash_size {
        println!("Flash Size:    {size}");
    }
    println!();

    let mut first_error = None;
    for file in manifest.files(dir) {
        let offset = file
            .offset
            .map(|o| format!("{o:#08x}"))
            .unwrap_or_else(|| "?".to_string());

        let data = match read_file(&file.path) {
            Ok(data) => data,
            Err(err) => {
                println!("{offset}  {}  missing", file.path.display());
                first_error.get_or_insert(err);
                continue;
            }
        };

        let kind = discover_kind_with_hint(&data, &hint_for(&file.path, file.offset));
        debug!(path = %file.path.display(), %kind, "classified flash file");
        println!(
            "{offset}  {}  {kind}  {}",
            file.path.display(),
            summarize(kind, &data)
        );
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn summarize(kind: ImageKind, data: &[u8]) -> String {
    match kind {
        ImageKind::App => match parse_app_image(data) {
            Ok(app) => format!(
                "{} {} ({}, IDF {})",
                app.description.project_name,
                app.description.version,
                app.header().chip_id,
                app.description.idf_ver
            ),
            Err(err) => describe_error(&err),
        },
        ImageKind::Bootloader => match parse_bootloader_image(data) {
            Ok(bootloader) => match bootloader.idf_version() {
                Some(idf) => format!("{} (IDF {idf})", bootloader.header().chip_id),
                None => bootloader.header().chip_id.to_string(),
            },
            Err(err) => describe_error(&err),
        },
        ImageKind::PartitionTable => {
            let table = PartitionTable::parse(data);
            match &table.error {
                None => format!("{} entries", table.entries.len()),
                Some(err) => format!("{} entries, {}", table.entries.len(), describe_error(err)),
            }
        }
        ImageKind::Other => format!("{} bytes", data.len()),
    }
}

fn describe_error(err: &ParseError) -> String {
    format!("error[{}]: {}", err.kind(), err)
}
