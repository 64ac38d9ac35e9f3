#![no_main]

use libfuzzer_sys::fuzz_target;
use sales_analyzer::{analysis::GroupKey, io::read_json_from_bytes, Analyzer};

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = read_json_from_bytes(data, "fuzz") {
        let analyzer = Analyzer::new(&table);
        let _ = analyzer.sales_summary();
        let _ = analyzer.group_by(GroupKey::Product);
    }
});
