//! `espray kind`: artifact classification.

use std::path::Path;

use anyhow::Result;
use espray_formats::discover_kind_with_hint;

use super::{hint_for, read_file};

pub fn handle_kind_command(path: &Path, offset: Option<u32>) -> Result<()> {
    let data = read_file(path)?;
    let kind = discover_kind_with_hint(&data, &hint_for(path, offset));
    println!("{kind}");
    Ok(())
}
