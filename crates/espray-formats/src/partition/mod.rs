//! ESP partition table parser.
//!
//! The table is a run of 32-byte slots starting at offset 0. Entries carry
//! the magic `0x50AA`; the run ends with a slot carrying `0xEBEB` whose
//! last 16 bytes are the MD5 of every entry before it. Corrupt tables are
//! still returned with everything parsed up to the fault, since they are
//! mostly inspected while debugging.

mod entry;

pub use entry::{
    AppSubtype, DataSubtype, PartitionEntry, PartitionFlags, PartitionSubtype, PartitionType,
    ENTRY_SIZE, FLAG_ENCRYPTED, FLAG_READONLY, PARTITION_MAGIC, TERMINATOR_MAGIC,
};

use std::fmt::Write as _;

use espray_codec::hex_string;
use serde::Serialize;
use tracing::{debug, warn};

use crate::digest::MD5_SIZE;
use crate::ParseError;

/// Offset of the MD5 digest inside the terminator slot.
const TERMINATOR_DIGEST_OFFSET: usize = 16;

/// How the walk over the table ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableEnd {
    /// The checksum entry was reached.
    Terminated,
    /// The buffer ran out before a checksum entry.
    Exhausted,
    /// A slot carried neither magic.
    MagicError,
}

/// MD5 recorded in the checksum entry and the one recomputed over the entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableChecksum {
    pub calculated: String,
    pub expected: String,
}

impl TableChecksum {
    pub fn matches(&self) -> bool {
        self.calculated == self.expected
    }
}

/// A parsed partition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionTable {
    /// Entries in table order.
    pub entries: Vec<PartitionEntry>,
    pub end: TableEnd,
    /// Present when the checksum entry was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<TableChecksum>,
    /// Set on a checksum mismatch or an unexpected magic word.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseError>,
}

enum State {
    Reading,
    Terminated,
    MagicError,
}

impl PartitionTable {
    /// Walk the table at the start of `data`.
    ///
    /// Never fails outright: faults are recorded in [`PartitionTable::error`]
    /// alongside the entries read before them.
    pub fn parse(data: &[u8]) -> Self {
        let mut entries = Vec::new();
        let mut checksum = None;
        let mut error = None;
        let mut md5 = md5::Context::new();
        let mut cursor = 0;
        let mut state = State::Reading;

        while let State::Reading = state {
            let Some(slot) = data
                .get(cursor..cursor + ENTRY_SIZE)
                .and_then(|s| <&[u8; ENTRY_SIZE]>::try_from(s).ok())
            else {
                break;
            };

            match u16::from_le_bytes([slot[0], slot[1]]) {
                PARTITION_MAGIC => {
                    let entry = PartitionEntry::decode(slot);
                    debug!(
                        offset = cursor,
                        label = %entry.label,
                        ty = %entry.partition_type,
                        subtype = %entry.subtype,
                        "partition entry"
                    );
                    md5.consume(slot);
                    entries.push(entry);
                    cursor += ENTRY_SIZE;
                }
                TERMINATOR_MAGIC => {
                    let expected =
                        &slot[TERMINATOR_DIGEST_OFFSET..TERMINATOR_DIGEST_OFFSET + MD5_SIZE];
                    let calculated = md5.clone().compute();
                    let check = TableChecksum {
                        calculated: hex_string(&calculated.0),
                        expected: hex_string(expected),
                    };
                    if !check.matches() {
                        warn!(
                            calculated = %check.calculated,
                            expected = %check.expected,
                            "partition table MD5 mismatch"
                        );
                        error = Some(ParseError::hash_mismatch(
                            "MD5",
                            check.calculated.clone(),
                            check.expected.clone(),
                        ));
                    }
                    checksum = Some(check);
                    state = State::Terminated;
                }
                actual => {
                    warn!(offset = cursor, magic = actual, "unexpected partition table magic");
                    error = Some(ParseError::WrongMagicWordPartitionTable {
                        offset: cursor,
                        actual,
                    });
                    state = State::MagicError;
                }
            }
        }

        let end = match state {
            State::Reading => TableEnd::Exhausted,
            State::Terminated => TableEnd::Terminated,
            State::MagicError => TableEnd::MagicError,
        };

        Self {
            entries,
            end,
            checksum,
            error,
        }
    }

    /// Returns true if the walk hit no checksum or magic fault.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Checksum entry, if the walk reached it.
    pub fn checksum(&self) -> Option<&TableChecksum> {
        self.checksum.as_ref()
    }

    /// The entries, or the fault if there was one.
    pub fn into_result(self) -> Result<Vec<PartitionEntry>, ParseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.entries),
        }
    }

    /// Find a partition by label.
    pub fn find(&self, label: &str) -> Option<&PartitionEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// All partitions of the given type.
    pub fn find_by_type(&self, ty: PartitionType) -> impl Iterator<Item = &PartitionEntry> {
        self.entries.iter().filter(move |e| e.partition_type == ty)
    }

    /// Render the table in the ESP-IDF CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("# ESP-IDF Partition Table\n");
        csv.push_str("# Name, Type, SubType, Offset, Size, Flags\n");
        for entry in &self.entries {
            let _ = writeln!(
                csv,
                "{},{},{},{:#x},{:#x},{}",
                entry.label,
                entry.partition_type,
                entry.subtype,
                entry.address,
                entry.size,
                entry.flags
            );
        }
        csv
    }
}
