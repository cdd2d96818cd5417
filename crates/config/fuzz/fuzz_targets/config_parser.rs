//! Fuzzing harness for the state document and settings parsers
//!
//! Arbitrary input must only ever produce parse errors.
//! Run with: cargo fuzz run config_parser

#![no_main]
use libfuzzer_sys::fuzz_target;
use taletiles_config::{Settings, StateDocument};

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<StateDocument>(data);
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(settings) = toml::from_str::<Settings>(s) {
            let _ = settings.validate();
        }
    }
});
