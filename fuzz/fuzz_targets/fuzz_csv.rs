#![no_main]

use libfuzzer_sys::fuzz_target;
use sales_analyzer::{io::read_csv_from_bytes, Analyzer};

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = read_csv_from_bytes(data, "fuzz") {
        let analyzer = Analyzer::new(&table);
        let _ = analyzer.describe();
        let _ = analyzer.forecast(7);
    }
});
