//! `espray dump`: render a byte range of a file through the codec.

use std::path::Path;

use anyhow::{bail, Result};
use espray_codec::Encoding;

use super::convert::render;
use super::read_file;

/// Bytes per output line for the digit encodings.
const LINE_BYTES: usize = 16;

/// Handle `espray dump`.
pub fn handle_dump_command(
    path: &Path,
    encoding: Encoding,
    offset: usize,
    length: Option<usize>,
    pad: bool,
) -> Result<()> {
    let data = read_file(path)?;
    if offset > data.len() {
        bail!(
            "offset {:#x} is past the end of {} ({} bytes)",
            offset,
            path.display(),
            data.len()
        );
    }

    let end = match length {
        Some(len) => offset.saturating_add(len).min(data.len()),
        None => data.len(),
    };
    let range = &data[offset..end];

    match encoding {
        Encoding::Text | Encoding::Base64 => {
            println!("{}", render(range, encoding, pad, None, encoding == Encoding::Base64));
        }
        _ => {
            for (i, chunk) in range.chunks(LINE_BYTES).enumerate() {
                println!(
                    "{:08x}  {}",
                    offset + i * LINE_BYTES,
                    render(chunk, encoding, pad, None, false)
                );
            }
        }
    }
    Ok(())
}
