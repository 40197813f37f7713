//! Replay keypresses against a Markdown buffer held in a [`MemoryHost`].

use std::rc::Rc;

use tabkey_config::{Hotkey, Settings};
use tabkey_core::{Dispatch, EditingMode, Keymap, MemoryHost, MemoryView, Position, TabKeyPlugin};

#[derive(Debug, Clone)]
pub struct PressOptions {
    /// Selection anchor, and the cursor when `to` is absent.
    pub at: Position,
    /// Selection head.
    pub to: Option<Position>,
    pub hotkey: Hotkey,
    pub mode: EditingMode,
    pub repeat: usize,
}

#[derive(Debug)]
pub struct PressOutcome {
    pub host: MemoryHost,
    /// One entry per keypress, in order.
    pub dispatches: Vec<Dispatch>,
}

impl PressOutcome {
    /// The final buffer with the cursor marked.
    pub fn marked_text(&self) -> String {
        self.host.view().map(MemoryView::to_marked).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        self.host.view().map(MemoryView::text).unwrap_or_default()
    }
}

/// Press `opts.hotkey` `opts.repeat` times. A keypress no handler consumes
/// falls back to the host's default behaviour for that key.
pub fn press(text: &str, settings: Settings, opts: &PressOptions) -> PressOutcome {
    let plugin = Rc::new(TabKeyPlugin::new(settings));
    let mut keymap = Keymap::new();
    plugin.register(&mut keymap);

    let view = MemoryView::new(text)
        .with_mode(opts.mode)
        .with_selection(opts.at, opts.to.unwrap_or(opts.at));
    let mut host = MemoryHost::new(view);

    let mut dispatches = Vec::with_capacity(opts.repeat);
    for _ in 0..opts.repeat {
        let result = keymap.dispatch(&opts.hotkey, &mut host);
        if !result.is_consumed() && opts.hotkey.modifiers.is_empty() {
            host.run_default(opts.hotkey.key);
        }
        dispatches.push(result);
    }

    PressOutcome { host, dispatches }
}

/// One-line summary of a dispatch result.
pub fn describe(dispatch: &Dispatch) -> String {
    match dispatch {
        Dispatch::Consumed(handler) => format!("consumed by {handler}"),
        Dispatch::Unhandled => "host default".to_string(),
    }
}
