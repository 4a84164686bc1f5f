#![no_main]

use libfuzzer_sys::fuzz_target;
use espray_formats::partition::ENTRY_SIZE;
use espray_formats::PartitionTable;

fuzz_target!(|data: &[u8]| {
    // Parsing should never panic and always returns a table
    let table = PartitionTable::parse(data);
    assert!(table.entries.len() <= data.len() / ENTRY_SIZE);

    let _ = table.to_csv();
    let _ = table.find("nvs");
    let _ = table.clone().into_result();
});
