//! `espray partitions`: partition table listing.

use std::path::Path;

use anyhow::Result;
use espray_formats::partition::TableEnd;
use espray_formats::PartitionTable;

use super::read_file;

/// Handle `espray partitions`.
///
/// Entries read before a fault are always printed; the fault then becomes
/// the command's error.
pub fn handle_partitions_command(path: &Path, json: bool, csv: bool) -> Result<()> {
    let data = read_file(path)?;
    let table = PartitionTable::parse(&data);

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else if csv {
        print!("{}", table.to_csv());
    } else {
        print_table(&table);
    }

    match table.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_table(table: &PartitionTable) {
    println!("Partition Table");
    println!("===============");
    println!(
        "{:<16} {:<6} {:<10} {:>10} {:>10}  Flags",
        "Label", "Type", "SubType", "Offset", "Size"
    );
    for entry in &table.entries {
        println!(
            "{:<16} {:<6} {:<10} {:#10x} {:#10x}  {}",
            entry.label, entry.partition_type, entry.subtype, entry.address, entry.size, entry.flags
        );
    }

    println!();
    match (table.end, table.checksum()) {
        (TableEnd::Terminated, Some(check)) if check.matches() => {
            println!("MD5:           {} (ok)", check.calculated)
        }
        (TableEnd::Terminated, Some(check)) => println!(
            "MD5:           {} (expected {})",
            check.calculated, check.expected
        ),
        (TableEnd::Exhausted, _) => println!("MD5:           no checksum entry"),
        _ => {}
    }
}
