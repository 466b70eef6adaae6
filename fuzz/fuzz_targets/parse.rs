#![no_main]

use featuredoc::syntax::{OutlineName, lexer, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the line lexer
        if let Ok(lines) = lexer::lex(s) {
            // If lexing succeeds, fuzz the parser
            if let Ok(feature) = parser::parse(&lines) {
                for scenario in &feature.scenarios {
                    let _ = OutlineName::parse(&scenario.name);
                }
            }
        }
    }
});
