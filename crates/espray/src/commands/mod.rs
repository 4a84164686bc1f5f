//! Command handlers for the espray CLI.
//!
//! Each submodule handles one subcommand.

pub mod convert;
pub mod dump;
pub mod flash_args;
pub mod image;
pub mod kind;
pub mod partitions;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use espray_formats::{KindHint, ParseError};

/// Read a whole file, mapping a missing file to [`ParseError::FileNotFound`].
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(ParseError::FileNotFound(path.to_path_buf()).into());
    }
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Kind hint carrying the file name of `path`.
pub fn hint_for(path: &Path, offset: Option<u32>) -> KindHint<'_> {
    KindHint {
        filename: path.file_name().and_then(|n| n.to_str()),
        offset,
    }
}
