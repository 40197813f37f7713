#![deny(unsafe_code)]

//! Tab and Enter key interception for Markdown editors.
//!
//! A keypress is classified by the syntactic zone under the cursor, offered
//! to cooperating extensions (list outliner, table navigation), and
//! otherwise turned into an indentation edit. Enter between a bracket pair
//! expands the pair over three lines. The engine talks to the editor only
//! through the [`Host`] and [`TextView`] traits; [`memory`] provides an
//! in-memory implementation of both.

/// Bracket-pair auto-indent for Enter.
pub mod brackets;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Delegation to the list outliner and table extensions.
pub mod collab;
/// The Tab/Enter orchestrator.
pub mod dispatch;
/// Tab-to-text computation.
pub mod indent;
/// Hotkey to handler registry.
pub mod keymap;
/// Decision tracing and the in-memory log collector for the TUI.
pub mod logging;
/// Markdown syntax-token scanner.
pub mod markdown;
/// In-memory host and text view.
pub mod memory;
/// Editor state captured per keypress.
pub mod snapshot;
/// UTF-16 column helpers.
pub mod text;
/// Host-facing traits and position types.
pub mod view;
/// Syntactic zone classification.
pub mod zone;

pub use dispatch::TabKeyPlugin;
pub use indent::TabAction;
pub use keymap::{Dispatch, KeyHandler, Keymap, Priority};
pub use logging::{LogCollector, LogReader};
pub use memory::{MemoryHost, MemoryView};
pub use snapshot::{EditorSnapshot, probe};
pub use view::{Anchor, EditAction, EditingMode, Host, Position, TextView};
pub use zone::{Zone, classify};
