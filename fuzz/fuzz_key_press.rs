//! Fuzz target for the Tab and Enter handlers.
//!
//! Run with: cargo +nightly fuzz run fuzz_key_press
//!
//! The first four bytes pick the cursor and selection; the rest is the
//! document. Neither handler may panic on any text or cursor.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabkey_config::Settings;
use tabkey_core::{MemoryHost, MemoryView, Position, TabKeyPlugin, classify, markdown};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let text = String::from_utf8_lossy(&data[4..]);
    let anchor = Position::new(data[0] as usize % 8, data[1] as usize);
    let head = Position::new(data[2] as usize % 8, data[3] as usize);

    let view = MemoryView::new(&text).with_selection(anchor, head);
    let _ = classify(&markdown::token_at(view.lines(), anchor));

    let plugin = TabKeyPlugin::new(Settings::default());
    let mut host = MemoryHost::new(view.clone());
    plugin.handle_tab(&mut host);
    let mut host = MemoryHost::new(view);
    plugin.handle_enter(&mut host);
});
