//! Partition entry parsing.

use std::borrow::Cow;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::macros::{c_string, lookup_enum};
use crate::ParseError;

/// Magic word of a partition entry.
pub const PARTITION_MAGIC: u16 = 0x50AA;

/// Magic word of the MD5 checksum entry terminating the table.
pub const TERMINATOR_MAGIC: u16 = 0xEBEB;

/// Size of every table slot.
pub const ENTRY_SIZE: usize = 32;

// Flag bits
pub const FLAG_ENCRYPTED: u32 = 0x1;
pub const FLAG_READONLY: u32 = 0x2;

lookup_enum! {
    /// Partition type.
    pub enum PartitionType: u8 {
        App = 0x00 => "app",
        Data = 0x01 => "data",
        End = 0xFF => "end",
    }
}

lookup_enum! {
    /// Subtypes of `app` partitions.
    pub enum AppSubtype: u8 {
        Factory = 0x00 => "factory",
        Ota0 = 0x10 => "ota_0",
        Ota1 = 0x11 => "ota_1",
        Ota2 = 0x12 => "ota_2",
        Ota3 = 0x13 => "ota_3",
        Ota4 = 0x14 => "ota_4",
        Ota5 = 0x15 => "ota_5",
        Ota6 = 0x16 => "ota_6",
        Ota7 = 0x17 => "ota_7",
        Ota8 = 0x18 => "ota_8",
        Ota9 = 0x19 => "ota_9",
        Ota10 = 0x1A => "ota_10",
        Ota11 = 0x1B => "ota_11",
        Ota12 = 0x1C => "ota_12",
        Ota13 = 0x1D => "ota_13",
        Ota14 = 0x1E => "ota_14",
        Ota15 = 0x1F => "ota_15",
        Test = 0x20 => "test",
    }
}

lookup_enum! {
    /// Subtypes of `data` partitions.
    pub enum DataSubtype: u8 {
        Ota = 0x00 => "ota",
        Phy = 0x01 => "phy",
        Nvs = 0x02 => "nvs",
        Coredump = 0x03 => "coredump",
        NvsKeys = 0x04 => "nvs_keys",
        Efuse = 0x05 => "efuse",
        Undefined = 0x06 => "undefined",
        EspHttpd = 0x80 => "esphttpd",
        Fat = 0x81 => "fat",
        Spiffs = 0x82 => "spiffs",
        LittleFs = 0x83 => "littlefs",
    }
}

/// Subtype resolved against the table belonging to the partition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionSubtype {
    App(AppSubtype),
    Data(DataSubtype),
    /// Subtype of a partition type with no subtype table.
    Other(u8),
}

impl PartitionSubtype {
    /// Resolve a raw subtype for the given partition type.
    pub fn resolve(partition_type: PartitionType, raw: u8) -> Self {
        match partition_type {
            PartitionType::App => Self::App(AppSubtype::from(raw)),
            PartitionType::Data => Self::Data(DataSubtype::from(raw)),
            _ => Self::Other(raw),
        }
    }

    /// Raw numeric value.
    pub fn value(self) -> u8 {
        match self {
            Self::App(subtype) => subtype.value(),
            Self::Data(subtype) => subtype.value(),
            Self::Other(raw) => raw,
        }
    }

    /// Display name, falling back to the hex value.
    pub fn name(self) -> Cow<'static, str> {
        match self {
            Self::App(subtype) => subtype.name(),
            Self::Data(subtype) => subtype.name(),
            Self::Other(raw) => Cow::Owned(format!("{raw:#04x}")),
        }
    }
}

impl fmt::Display for PartitionSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for PartitionSubtype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PartitionSubtype", 2)?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("name", &self.name())?;
        state.end()
    }
}

/// Partition flags word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartitionFlags {
    pub encrypted: bool,
    pub readonly: bool,
    /// The full flags word, including unknown bits.
    pub raw: u32,
}

impl From<u32> for PartitionFlags {
    fn from(raw: u32) -> Self {
        Self {
            encrypted: raw & FLAG_ENCRYPTED != 0,
            readonly: raw & FLAG_READONLY != 0,
            raw,
        }
    }
}

impl fmt::Display for PartitionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.encrypted {
            names.push("encrypted");
        }
        if self.readonly {
            names.push("readonly");
        }
        f.write_str(&names.join(":"))
    }
}

/// A parsed 32-byte partition entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionEntry {
    pub magic: u16,
    #[serde(rename = "type")]
    pub partition_type: PartitionType,
    pub subtype: PartitionSubtype,
    /// Flash offset.
    pub address: u32,
    pub size: u32,
    pub label: String,
    pub flags: PartitionFlags,
}

impl PartitionEntry {
    /// Parse one entry from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < ENTRY_SIZE {
            return Err(ParseError::too_small("partition entry", ENTRY_SIZE, data.len()));
        }

        let magic = u16::from_le_bytes([data[0], data[1]]);
        if magic != PARTITION_MAGIC {
            return Err(ParseError::WrongMagicWordPartitionTable {
                offset: 0,
                actual: magic,
            });
        }

        let mut slot = [0u8; ENTRY_SIZE];
        slot.copy_from_slice(&data[..ENTRY_SIZE]);
        Ok(Self::decode(&slot))
    }

    /// Decode a slot whose magic has already been matched.
    pub(crate) fn decode(slot: &[u8; ENTRY_SIZE]) -> Self {
        let partition_type = PartitionType::from(slot[2]);
        Self {
            magic: u16::from_le_bytes([slot[0], slot[1]]),
            partition_type,
            subtype: PartitionSubtype::resolve(partition_type, slot[3]),
            address: u32::from_le_bytes([slot[4], slot[5], slot[6], slot[7]]),
            size: u32::from_le_bytes([slot[8], slot[9], slot[10], slot[11]]),
            label: c_string(&slot[12..28]),
            flags: PartitionFlags::from(u32::from_le_bytes([
                slot[28], slot[29], slot[30], slot[31],
            ])),
        }
    }

    /// First flash address past this partition.
    pub fn end(&self) -> u64 {
        self.address as u64 + self.size as u64
    }
}
