#![no_main]

use libfuzzer_sys::fuzz_target;
use rr::filter::{PatternOptions, PatternSet, Syntax};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Translation and compilation must never panic, only fail
        for syntax in [Syntax::Basic, Syntax::Extended] {
            let options = PatternOptions {
                syntax,
                ignore_case: false,
            };
            if let Ok(set) = PatternSet::new(&[input], options) {
                let _ = set.any_match(input);
            }
        }
    }
});
