//! CLI integration tests for espray.
//!
//! These tests write small firmware artifacts into a temporary directory
//! and run the built binary against them.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use sha2::{Digest, Sha256};
use tempfile::TempDir;

/// Get the path to the espray binary.
fn espray_bin() -> String {
    env!("CARGO_BIN_EXE_espray").to_string()
}

/// Run espray with the given arguments.
fn run_espray(args: &[&str]) -> Output {
    Command::new(espray_bin())
        .args(args)
        .output()
        .expect("Failed to execute espray")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Fixtures
// =============================================================================

fn image_header(hash_appended: bool) -> Vec<u8> {
    let mut data = vec![0u8; 24];
    data[0] = 0xE9;
    data[1] = 1;
    data[2] = 0x02; // DIO
    data[3] = 0x20; // 4MB, 40MHz
    data[4..8].copy_from_slice(&0x4008_0000u32.to_le_bytes());
    data[8] = 0xEE;
    data[12] = 0x09; // ESP32-S3
    data[23] = hash_appended as u8;
    data
}

fn with_hash(mut data: Vec<u8>) -> Vec<u8> {
    let digest = Sha256::digest(&data);
    data.extend_from_slice(&digest);
    data
}

fn app_image() -> Vec<u8> {
    let mut data = image_header(true);
    data.extend_from_slice(&0x3C00_0020u32.to_le_bytes());
    data.extend_from_slice(&256u32.to_le_bytes());
    let mut desc = vec![0u8; 256];
    desc[0..4].copy_from_slice(&0xABCD_5432u32.to_le_bytes());
    desc[16..21].copy_from_slice(b"1.4.2");
    desc[48..53].copy_from_slice(b"blink");
    desc[112..118].copy_from_slice(b"v5.2.1");
    data.extend_from_slice(&desc);
    with_hash(data)
}

fn bootloader_image() -> Vec<u8> {
    let mut data = image_header(true);
    data.extend_from_slice(&0x3FCD_0000u32.to_le_bytes());
    data.extend_from_slice(&80u32.to_le_bytes());
    let mut desc = vec![0u8; 80];
    desc[0] = 0x50;
    desc[4] = 1;
    desc[8..12].copy_from_slice(b"v5.3");
    data.extend_from_slice(&desc);
    with_hash(data)
}

fn partition_entry(ty: u8, subtype: u8, address: u32, size: u32, label: &str) -> Vec<u8> {
    let mut slot = vec![0u8; 32];
    slot[0] = 0xAA;
    slot[1] = 0x50;
    slot[2] = ty;
    slot[3] = subtype;
    slot[4..8].copy_from_slice(&address.to_le_bytes());
    slot[8..12].copy_from_slice(&size.to_le_bytes());
    slot[12..12 + label.len()].copy_from_slice(label.as_bytes());
    slot
}

fn partition_table() -> Vec<u8> {
    let mut entries = Vec::new();
    entries.extend(partition_entry(0x01, 0x02, 0x9000, 0x6000, "nvs"));
    entries.extend(partition_entry(0x01, 0x01, 0xF000, 0x1000, "phy_init"));
    entries.extend(partition_entry(0x00, 0x00, 0x10000, 0x100000, "factory"));
    let mut table = entries.clone();
    let mut terminator = vec![0xFFu8; 32];
    terminator[0] = 0xEB;
    terminator[1] = 0xEB;
    terminator[16..32].copy_from_slice(&md5::compute(&entries).0);
    table.extend(terminator);
    table.extend(vec![0xFFu8; 0xC00 - table.len()]);
    table
}

fn write(dir: &Path, name: &str, data: &[u8]) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, data).unwrap();
    path.to_string_lossy().into_owned()
}

// =============================================================================
// Basic Command Tests
// =============================================================================

#[test]
fn test_help() {
    let output = run_espray(&["--help"]);
    assert!(output.status.success(), "espray --help should succeed");
    let out = stdout(&output);
    assert!(out.contains("partition"), "Help should mention partition tables");
    assert!(out.contains("convert"), "Help should list the convert command");
}

#[test]
fn test_missing_file() {
    let output = run_espray(&["image", "/nonexistent/app.bin"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error[FileNotFound]"));
}

// =============================================================================
// Image Tests
// =============================================================================

#[test]
fn test_image_app() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "blink.bin", &app_image());
    let output = run_espray(&["image", &path]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Kind:          app"));
    assert!(out.contains("ESP32-S3"));
    assert!(out.contains("DIO"));
    assert!(out.contains("0x40080000"));
    assert!(out.contains("blink"));
    assert!(out.contains("(verified)"));
}

#[test]
fn test_image_json() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "blink.bin", &app_image());
    let output = run_espray(&["image", &path, "--json", "--segments"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "app");
    assert_eq!(value["header"]["chip_id"]["name"], "ESP32-S3");
    assert_eq!(value["header"]["spi_mode"]["value"], 2);
    assert_eq!(value["description"]["project_name"], "blink");
    assert_eq!(value["segments"][0]["offset"], 24);
    assert_eq!(value["hash"].as_str().map(str::len), Some(64));
}

#[test]
fn test_image_bootloader() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "bootloader.bin", &bootloader_image());
    let output = run_espray(&["image", &path]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Kind:          bootloader"));
    assert!(out.contains("v5.3"));
}

#[test]
fn test_image_corrupted_hash() {
    let dir = TempDir::new().unwrap();
    let mut data = app_image();
    data[60] ^= 0xFF;
    let path = write(dir.path(), "app.bin", &data);
    let output = run_espray(&["image", &path, "--app"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error[HashMismatch]"));
}

#[test]
fn test_image_wrong_magic() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "garbage.bin", &[0u8; 512]);
    let output = run_espray(&["image", &path]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("error[WrongMagicByteHeader]"));
    assert!(err.contains("0xe9"));
}

// =============================================================================
// Partition Table Tests
// =============================================================================

#[test]
fn test_partitions() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "partition-table.bin", &partition_table());
    let output = run_espray(&["partitions", &path]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("phy_init"));
    assert!(out.contains("factory"));
    assert!(out.contains("(ok)"));
}

#[test]
fn test_partitions_csv() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "partition-table.bin", &partition_table());
    let output = run_espray(&["partitions", &path, "--csv"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("# Name, Type, SubType, Offset, Size, Flags"));
    assert!(out.contains("nvs,data,nvs,0x9000,0x6000,"));
}

#[test]
fn test_partitions_checksum_mismatch_still_lists() {
    let dir = TempDir::new().unwrap();
    let mut data = partition_table();
    data[8] ^= 0x01;
    let path = write(dir.path(), "partition-table.bin", &data);
    let output = run_espray(&["partitions", &path, "--json"]);
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["entries"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["error"]["kind"], "HashMismatch");
    assert!(stderr(&output).contains("error[HashMismatch]"));
}

// =============================================================================
// Kind Tests
// =============================================================================

#[test]
fn test_kind() {
    let dir = TempDir::new().unwrap();
    let app = write(dir.path(), "a.bin", &app_image());
    let boot = write(dir.path(), "b.bin", &bootloader_image());
    let table = write(dir.path(), "c.bin", &partition_table());
    let blob = write(dir.path(), "d.bin", &[0u8; 64]);

    assert_eq!(stdout(&run_espray(&["kind", &app])).trim(), "app");
    assert_eq!(stdout(&run_espray(&["kind", &boot])).trim(), "bootloader");
    assert_eq!(stdout(&run_espray(&["kind", &table])).trim(), "partition-table");
    assert_eq!(stdout(&run_espray(&["kind", &blob])).trim(), "other");
    assert_eq!(
        stdout(&run_espray(&["kind", &blob, "--offset", "0x8000"])).trim(),
        "partition-table"
    );
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_convert() {
    let output = run_espray(&["convert", "--from", "hexa", "--to", "text", "48 65 6c 6c 6f"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "Hello");

    let output = run_espray(&["convert", "-f", "text", "-t", "binary", "--pad", "A"]);
    assert_eq!(stdout(&output).trim_end(), "01000001");

    let output = run_espray(&["convert", "-f", "decimal", "-t", "base64", "102 111 111"]);
    assert_eq!(stdout(&output).trim_end(), "Zm9v");
}

#[test]
fn test_convert_unknown_encoding() {
    let output = run_espray(&["convert", "--from", "ebcdic", "--to", "hexa", "00"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("ebcdic"));
}

#[test]
fn test_dump() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "app.bin", &app_image());
    let output = run_espray(&["dump", &path, "--length", "4", "--pad"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "00000000  e9 01 02 20");

    let output = run_espray(&["dump", &path, "-e", "text", "--offset", "0x50", "--length", "5"]);
    assert_eq!(stdout(&output).trim_end(), "blink");
}

// =============================================================================
// Flash Args Tests
// =============================================================================

const MANIFEST: &str = r#"{
    "flash_settings": {"flash_mode": "dio", "flash_size": "4MB", "flash_freq": "40m"},
    "flash_files": {
        "0x0": "bootloader/bootloader.bin",
        "0x8000": "partition_table/partition-table.bin",
        "0x10000": "blink.bin"
    },
    "extra_esptool_args": {"chip": "esp32s3"}
}"#;

#[test]
fn test_flash_args() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "flasher_args.json", MANIFEST.as_bytes());
    write(dir.path(), "bootloader/bootloader.bin", &bootloader_image());
    write(dir.path(), "partition_table/partition-table.bin", &partition_table());
    write(dir.path(), "blink.bin", &app_image());

    let output = run_espray(&["flash-args", &dir.path().to_string_lossy()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("esp32s3"));
    assert!(out.contains("bootloader"));
    assert!(out.contains("3 entries"));
    assert!(out.contains("blink 1.4.2"));
}

#[test]
fn test_flash_args_missing_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "flasher_args.json", MANIFEST.as_bytes());
    write(dir.path(), "blink.bin", &app_image());

    let output = run_espray(&["flash-args", &dir.path().to_string_lossy()]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("missing"));
    assert!(stderr(&output).contains("error[FileNotFound]"));
}

#[test]
fn test_flash_args_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let output = run_espray(&["flash-args", &dir.path().to_string_lossy()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("flasher_args.json"));
}
