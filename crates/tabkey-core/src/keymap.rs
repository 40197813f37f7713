//! Keybinding registry.
//!
//! Handlers register under a [`Hotkey`] with a [`Priority`]. A keypress is
//! offered to matching handlers from the highest priority down until one
//! reports it consumed. Handlers with equal priority run in registration
//! order.

use std::fmt;
use std::rc::Rc;

use tabkey_config::Hotkey;

use crate::view::Host;

/// A keypress handler.
pub trait KeyHandler {
    /// Unique name (e.g. `"tabkey:tab"`).
    fn name(&self) -> &str;

    /// Handle the keypress. Returns `true` if consumed.
    fn handle(&self, host: &mut dyn Host) -> bool;
}

/// Handler priority; higher runs first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u32);

impl Priority {
    pub const DEFAULT: Priority = Priority(0);
    pub const HIGHEST: Priority = Priority(u32::MAX);
}

/// Result of offering a keypress to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Consumed by the named handler.
    Consumed(String),
    /// No handler consumed it; the host's default behaviour applies.
    Unhandled,
}

impl Dispatch {
    pub fn is_consumed(&self) -> bool {
        matches!(self, Dispatch::Consumed(_))
    }
}

struct Binding {
    hotkey: Hotkey,
    priority: Priority,
    handler: Rc<dyn KeyHandler>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("hotkey", &self.hotkey)
            .field("priority", &self.priority)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Registry of key handlers.
#[derive(Debug, Default)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `hotkey`.
    pub fn register(&mut self, hotkey: Hotkey, priority: Priority, handler: Rc<dyn KeyHandler>) {
        self.bindings.push(Binding {
            hotkey,
            priority,
            handler,
        });
        // Stable sort keeps registration order among equal priorities.
        self.bindings.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Remove every binding of the handler called `name`. Returns how many
    /// were removed.
    pub fn unregister(&mut self, name: &str) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.handler.name() != name);
        before - self.bindings.len()
    }

    /// Offer a keypress to the handlers bound to `hotkey`.
    pub fn dispatch(&self, hotkey: &Hotkey, host: &mut dyn Host) -> Dispatch {
        for binding in self.bindings.iter().filter(|b| b.hotkey == *hotkey) {
            if binding.handler.handle(host) {
                tracing::trace!(handler = binding.handler.name(), %hotkey, "key consumed");
                return Dispatch::Consumed(binding.handler.name().to_string());
            }
        }
        Dispatch::Unhandled
    }

    /// Names of the handlers bound to `hotkey`, in dispatch order.
    pub fn handlers_for(&self, hotkey: &Hotkey) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|b| b.hotkey == *hotkey)
            .map(|b| b.handler.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
