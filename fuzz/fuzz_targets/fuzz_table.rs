#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Table parsing must never panic, only return Ok/Err.
    if let Ok(table) = x64enc::OpcodeTable::parse(data) {
        // A parsed table must serve lookups for every row it accepted.
        for row in table.rows() {
            let _ = table.lookup(row.mnemonic);
        }
    }
});
