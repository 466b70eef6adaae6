#![no_main]

use featuredoc::report::{Buckets, parse_report};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parsed = parse_report(s);
        if let Some(buckets) = Buckets::from_totals(&parsed.report.totals) {
            assert_eq!(buckets.succeeded + buckets.failed + buckets.skipped, 100);
        }
    }
});
