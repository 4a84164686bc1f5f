//! `espray image`: app and bootloader image inspection.

use std::path::Path;

use anyhow::{bail, Result};
use espray_formats::image::{segments, Segment};
use espray_formats::{
    discover_kind_with_hint, parse_app_image, parse_bootloader_image, FirmwareImage, ImageApp,
    ImageBootloader, ImageKind,
};
use serde::Serialize;

use super::{hint_for, read_file};

/// Wrapper enum to hold either image kind
#[derive(Serialize)]
#[serde(untagged)]
enum Image {
    App(ImageApp),
    Bootloader(ImageBootloader),
}

impl Image {
    fn as_image(&self) -> &dyn FirmwareImage {
        match self {
            Self::App(app) => app,
            Self::Bootloader(bootloader) => bootloader,
        }
    }
}

pub fn forced_kind(app: bool, bootloader: bool) -> Option<ImageKind> {
    match (app, bootloader) {
        (true, _) => Some(ImageKind::App),
        (_, true) => Some(ImageKind::Bootloader),
        _ => None,
    }
}

/// Handle `espray image`.
pub fn handle_image_command(
    path: &Path,
    forced: Option<ImageKind>,
    json: bool,
    show_segments: bool,
) -> Result<()> {
    let data = read_file(path)?;
    let kind = forced.unwrap_or_else(|| discover_kind_with_hint(&data, &hint_for(path, None)));

    let image = match kind {
        ImageKind::Bootloader => Image::Bootloader(parse_bootloader_image(&data)?),
        ImageKind::PartitionTable => {
            bail!("{} is a partition table, use `espray partitions`", path.display())
        }
        // parsing as an app surfaces the most specific error for unknown files
        ImageKind::App | ImageKind::Other => Image::App(parse_app_image(&data)?),
    };

    let segs: Option<Vec<Segment>> =
        show_segments.then(|| segments(&data, image.as_image().header()).collect());

    if json {
        let mut value = serde_json::to_value(&image)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("kind".to_string(), serde_json::to_value(image.as_image().kind())?);
            if let Some(segs) = &segs {
                map.insert("segments".to_string(), serde_json::to_value(segs)?);
            }
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_info(&image);
    if let Some(segs) = &segs {
        print_segments(segs);
    }
    Ok(())
}

fn print_info(image: &Image) {
    let fw = image.as_image();
    let header = fw.header();

    println!("Image Information");
    println!("=================");
    println!("Kind:          {}", fw.kind());
    println!("Chip:          {}", header.chip_id);
    println!("Entry Point:   {:#010x}", fw.entry_point());
    println!("Segments:      {}", header.segment_count);
    println!("Flash Mode:    {}", header.spi_mode);
    println!("Flash Speed:   {}", header.spi_speed);
    println!("Flash Size:    {}", header.spi_size);
    println!("Chip Revision: {} - {}", header.min_revision(), header.max_revision());
    if header.wp_pin_disabled() {
        println!("WP Pin:        disabled");
    } else {
        println!("WP Pin:        {}", header.wp_pin);
    }
    match fw.hash() {
        Some(hash) => println!("SHA-256:       {hash} (verified)"),
        None if header.has_hash() => println!("SHA-256:       not checked"),
        None => println!("SHA-256:       none"),
    }

    match image {
        Image::App(app) => {
            let desc = &app.description;
            println!("\nApp Description");
            println!("---------------");
            println!("Project:       {}", desc.project_name);
            println!("Version:       {}", desc.version);
            println!("Secure Ver:    {}", desc.secure_version);
            println!("Compiled:      {} {}", desc.date, desc.time);
            println!("IDF Version:   {}", desc.idf_ver);
            println!("ELF SHA-256:   {}", desc.app_elf_sha256);
        }
        Image::Bootloader(bootloader) => match &bootloader.description {
            Some(desc) => {
                println!("\nBootloader Description");
                println!("----------------------");
                println!("Version:       {}", desc.version);
                println!("IDF Version:   {}", desc.idf_ver);
                println!("Compiled:      {}", desc.date_time);
            }
            None => println!("\nNo bootloader description"),
        },
    }
}

fn print_segments(segs: &[Segment]) {
    println!("\nSegments");
    println!("--------");
    println!("{:>3}  {:>10}  {:>10}  {:>8}", "#", "Offset", "Load Addr", "Length");
    for (i, seg) in segs.iter().enumerate() {
        println!(
            "{:>3}  {:#010x}  {:#010x}  {:#8x}",
            i, seg.offset, seg.header.load_addr, seg.header.data_len
        );
    }
}
