//! ESP-IDF `flasher_args.json` manifest.
//!
//! An ESP-IDF build directory lists every binary to flash, keyed by flash
//! offset, in `flasher_args.json`. Paths are relative to the build
//! directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use espray_formats::ParseError;
use serde::Deserialize;

/// Manifest file name inside a build directory.
pub const MANIFEST_NAME: &str = "flasher_args.json";

/// Flash settings recorded by the build.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashSettings {
    #[serde(default)]
    pub flash_mode: Option<String>,
    #[serde(default)]
    pub flash_size: Option<String>,
    #[serde(default)]
    pub flash_freq: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtraEsptoolArgs {
    #[serde(default)]
    pub chip: Option<String>,
}

/// Parsed `flasher_args.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashManifest {
    /// Flash offset (hex string) to path.
    #[serde(default)]
    pub flash_files: BTreeMap<String, String>,
    #[serde(default)]
    pub flash_settings: FlashSettings,
    #[serde(default)]
    pub extra_esptool_args: ExtraEsptoolArgs,
}

/// One file listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashFile {
    /// Flash offset, if the key parsed as a number.
    pub offset: Option<u32>,
    pub path: PathBuf,
}

impl FlashManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load `flasher_args.json` from a build directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_NAME);
        if !path.is_file() {
            return Err(ParseError::FileNotFound(path).into());
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Listed files, resolved against `dir`, in ascending offset order.
    pub fn files(&self, dir: &Path) -> Vec<FlashFile> {
        let mut files: Vec<FlashFile> = self
            .flash_files
            .iter()
            .map(|(offset, path)| FlashFile {
                offset: parse_offset(offset),
                path: dir.join(path),
            })
            .collect();
        files.sort_by_key(|f| f.offset.unwrap_or(u32::MAX));
        files
    }
}

fn parse_offset(s: &str) -> Option<u32> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
