//! Key dispatch orchestrator.
//!
//! [`TabKeyPlugin`] owns the compiled settings and the delegation flag, and
//! runs the per-keypress pipelines:
//!
//! - **Tab**: guard check, probe, zone gate, collaborator delegation,
//!   indentation engine.
//! - **Enter**: probe, empty-selection check, bracket-pair expansion.
//!
//! Both handlers return `true` when they consumed the key. `false` leaves
//! the keypress to the next handler or the host's default.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tabkey_config::Settings;

use crate::brackets;
use crate::collab::{Delegation, Dispatcher};
use crate::indent::{self, IndentRules};
use crate::keymap::{KeyHandler, Keymap, Priority};
use crate::logging::decision;
use crate::snapshot::probe;
use crate::view::Host;
use crate::zone;

/// Keymap name of the Tab handler.
pub const TAB_HANDLER: &str = "tabkey:tab";
/// Keymap name of the Enter handler.
pub const ENTER_HANDLER: &str = "tabkey:enter";

#[derive(Debug, Default)]
pub struct TabKeyPlugin {
    settings: RefCell<Rc<Settings>>,
    in_delegation: Cell<bool>,
}

impl TabKeyPlugin {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(Rc::new(settings)),
            in_delegation: Cell::new(false),
        }
    }

    /// The settings in effect for the next keypress.
    pub fn settings(&self) -> Rc<Settings> {
        Rc::clone(&self.settings.borrow())
    }

    /// Swap in new settings. A handler already running keeps the settings
    /// it started with. Call [`register`](Self::register) again if the
    /// hotkeys changed.
    pub fn reload(&self, settings: Settings) {
        tracing::info!(developer_mode = settings.developer_mode, "settings reloaded");
        *self.settings.borrow_mut() = Rc::new(settings);
    }

    /// Whether a collaborator command is running on our behalf.
    pub fn is_delegating(&self) -> bool {
        self.in_delegation.get()
    }

    /// Install the Tab and Enter handlers at the highest priority, replacing
    /// any earlier registration.
    pub fn register(self: &Rc<Self>, keymap: &mut Keymap) {
        keymap.unregister(TAB_HANDLER);
        keymap.unregister(ENTER_HANDLER);

        let keys = self.settings().keys;
        keymap.register(
            keys.tab,
            Priority::HIGHEST,
            Rc::new(TabHandler(Rc::clone(self))),
        );
        keymap.register(
            keys.enter,
            Priority::HIGHEST,
            Rc::new(EnterHandler(Rc::clone(self))),
        );
        tracing::debug!(tab = %keys.tab, enter = %keys.enter, "key handlers registered");
    }

    pub fn handle_tab(&self, host: &mut dyn Host) -> bool {
        let settings = self.settings();
        let trace = settings.developer_mode;

        if self.in_delegation.get() {
            decision!(trace, "tab during delegation, deferring");
            return false;
        }

        let Some(snapshot) = probe(host) else {
            decision!(trace, "no active markdown view");
            return false;
        };

        let zone = zone::classify(&snapshot.syntax_token);
        if !zone.is_active(&settings.zones) {
            decision!(trace, %zone, token = %snapshot.syntax_token, "zone inactive, deferring");
            return false;
        }

        let dispatcher = Dispatcher {
            collaboration: &settings.collaboration,
            zones: &settings.zones,
            in_delegation: &self.in_delegation,
            trace,
        };
        match dispatcher.delegate(host, &snapshot) {
            Delegation::Handled => return true,
            Delegation::Defer => return false,
            Delegation::Declined => {}
        }

        let rules = IndentRules {
            indent: &settings.indent,
            selection: &settings.selection,
            exception: &settings.exception,
        };
        let action = indent::compute_tab_action(&snapshot, rules);
        decision!(trace, %zone, ?action, at = %snapshot.cursor_from, "tab handled locally");

        match host.active_text_view() {
            Some(view) => {
                indent::apply(view, &action, snapshot.cursor_from);
                true
            }
            None => false,
        }
    }

    pub fn handle_enter(&self, host: &mut dyn Host) -> bool {
        let settings = self.settings();
        let trace = settings.developer_mode;

        if !settings.brackets.enabled {
            return false;
        }
        let Some(snapshot) = probe(host) else {
            decision!(trace, "no active markdown view");
            return false;
        };
        if snapshot.selection_non_empty {
            decision!(trace, "enter with a selection, deferring");
            return false;
        }

        let zone = zone::classify(&snapshot.syntax_token);
        let set = if zone.is_code() {
            &settings.brackets.code
        } else {
            &settings.brackets.text
        };
        let Some(pair) = brackets::detect(
            set,
            &snapshot.current_line_text,
            snapshot.cursor_from.column,
        ) else {
            decision!(trace, %zone, "no bracket pair around the cursor");
            return false;
        };
        decision!(trace, %zone, pair, "expanding bracket pair");

        match host.active_text_view() {
            Some(view) => {
                brackets::expand(view, &snapshot, &settings.brackets);
                true
            }
            None => false,
        }
    }
}

struct TabHandler(Rc<TabKeyPlugin>);

impl KeyHandler for TabHandler {
    fn name(&self) -> &str {
        TAB_HANDLER
    }

    fn handle(&self, host: &mut dyn Host) -> bool {
        self.0.handle_tab(host)
    }
}

struct EnterHandler(Rc<TabKeyPlugin>);

impl KeyHandler for EnterHandler {
    fn name(&self) -> &str {
        ENTER_HANDLER
    }

    fn handle(&self, host: &mut dyn Host) -> bool {
        self.0.handle_enter(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryHost, MemoryView};
    use crate::view::{Anchor, Position, TextView};
    use pretty_assertions::assert_eq;
    use tabkey_config::{AppConfig, Hotkey, Key};

    fn host(text: &str, at: Position) -> MemoryHost {
        MemoryHost::new(MemoryView::new(text).with_cursor(at))
    }

    #[test]
    fn test_no_view_is_not_consumed() {
        let plugin = TabKeyPlugin::new(Settings::default());
        let mut host = MemoryHost::without_view();
        assert!(!plugin.handle_tab(&mut host));
        assert!(!plugin.handle_enter(&mut host));
    }

    #[test]
    fn test_tab_inserts_tab_character() {
        let plugin = TabKeyPlugin::new(Settings::default());
        let mut host = host("abc", Position::new(0, 1));
        assert!(plugin.handle_tab(&mut host));
        let view = host.view().unwrap();
        assert_eq!(view.text(), "a\tbc");
        assert_eq!(view.cursor(Anchor::Head), Position::new(0, 2));
    }

    #[test]
    fn test_tab_deferred_while_delegating() {
        let plugin = TabKeyPlugin::new(Settings::default());
        let mut host = host("abc", Position::new(0, 1));
        plugin.in_delegation.set(true);
        assert!(plugin.is_delegating());
        assert!(!plugin.handle_tab(&mut host));
        assert_eq!(host.view().unwrap().text(), "abc");
    }

    #[test]
    fn test_enter_without_pair_is_not_consumed() {
        let plugin = TabKeyPlugin::new(Settings::default());
        let mut host = host("plain", Position::new(0, 5));
        assert!(!plugin.handle_enter(&mut host));
        assert_eq!(host.view().unwrap().text(), "plain");
    }

    #[test]
    fn test_enter_disabled() {
        let mut config = AppConfig::default();
        config.brackets.enabled = false;
        let (settings, _) = config.build_settings().unwrap();
        let plugin = TabKeyPlugin::new(settings);
        let mut host = host("{}", Position::new(0, 1));
        assert!(!plugin.handle_enter(&mut host));
    }

    #[test]
    fn test_reload_takes_effect_on_next_keypress() {
        let plugin = TabKeyPlugin::new(Settings::default());
        let mut config = AppConfig::default();
        config.indent.use_spaces = true;
        config.indent.spaces_count = 2;
        plugin.reload(config.build_settings().unwrap().0);

        let mut host = host("", Position::new(0, 0));
        assert!(plugin.handle_tab(&mut host));
        assert_eq!(host.view().unwrap().text(), "  ");
    }

    #[test]
    fn test_register_replaces_previous_bindings() {
        let plugin = Rc::new(TabKeyPlugin::new(Settings::default()));
        let mut keymap = Keymap::new();
        plugin.register(&mut keymap);
        plugin.register(&mut keymap);
        assert_eq!(keymap.len(), 2);
        assert_eq!(keymap.handlers_for(&Hotkey::plain(Key::Tab)), vec![TAB_HANDLER]);
        assert_eq!(keymap.handlers_for(&Hotkey::plain(Key::Enter)), vec![ENTER_HANDLER]);
    }

    #[test]
    fn test_register_uses_configured_hotkeys() {
        let mut config = AppConfig::default();
        config.keys.tab_hotkey = "Ctrl+Tab".to_string();
        let (settings, _) = config.build_settings().unwrap();
        let plugin = Rc::new(TabKeyPlugin::new(settings));
        let mut keymap = Keymap::new();
        plugin.register(&mut keymap);

        let ctrl_tab: Hotkey = "Ctrl+Tab".parse().unwrap();
        assert!(keymap.handlers_for(&Hotkey::plain(Key::Tab)).is_empty());
        assert_eq!(keymap.handlers_for(&ctrl_tab), vec![TAB_HANDLER]);

        let mut host = host("x", Position::new(0, 1));
        assert!(keymap.dispatch(&ctrl_tab, &mut host).is_consumed());
        assert_eq!(host.view().unwrap().text(), "x\t");
    }
}
