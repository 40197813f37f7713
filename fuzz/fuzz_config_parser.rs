//! Fuzz target for the TOML configuration parser and the legacy JSON import.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabkey_config::{AppConfig, LegacySettings};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // a config that parses must also compile its patterns without panicking
    if let Ok(config) = AppConfig::parse(s) {
        let _ = config.build_settings();
    }
    if let Ok(legacy) = LegacySettings::from_json(s) {
        let _ = legacy.into_config();
    }
});
