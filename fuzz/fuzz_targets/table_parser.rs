#![no_main]

use libfuzzer_sys::fuzz_target;
use rellamar::config::AnalyzerConfig;
use rellamar::table::CallTable;
use rellamar::timestamp::parse_timestamp;
use rellamar::transform::transform_table;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and transforming must reject bad input with an error, never panic
        if let Ok(table) = CallTable::parse(input, ',') {
            let _ = transform_table(&table, &AnalyzerConfig::default());
        }
        for line in input.lines() {
            let _ = parse_timestamp(line);
        }
    }
});
