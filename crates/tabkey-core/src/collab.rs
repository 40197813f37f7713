//! Collaboration dispatcher: hands the keypress to a cooperating extension.
//!
//! Two collaborators are tried, in order:
//!
//! 1. **List outliner**: on a list line, run its indent command and check
//!    whether the line changed. A change means it handled the key.
//! 2. **Table navigation**: on a table row, either leave the key to the
//!    host's native table editor (live preview) or run the next-cell command
//!    of the table extension (source mode).
//!
//! The outliner's command may itself dispatch Tab. A [`DelegationGuard`]
//! marks the delegation as in flight so that the nested dispatch defers
//! instead of recursing.

use std::cell::Cell;

use tabkey_config::{CollaborationConfig, ZoneConfig};

use crate::logging::decision;
use crate::snapshot::EditorSnapshot;
use crate::view::{EditingMode, Host};

/// Indent command of the list outliner extension.
pub const OUTLINER_INDENT_COMMAND: &str = "obsidian-outliner:indent-list";

/// Next-cell command of the table extension.
pub const TABLE_NEXT_CELL_COMMAND: &str = "table-editor-obsidian:next-cell";

/// Outcome of a delegation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegation {
    /// A collaborator handled the key; report consumed.
    Handled,
    /// Leave the key to the host; report not consumed.
    Defer,
    /// No collaborator took it; continue with local handling.
    Declined,
}

/// Scoped in-delegation marker. Holding one means a collaborator command is
/// running; dropping it clears the mark on every exit path.
#[derive(Debug)]
pub struct DelegationGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DelegationGuard<'a> {
    /// Mark a delegation as in flight, or `None` if one already is.
    pub fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for DelegationGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Optional indentation, then `-` or `digits.`.
pub fn is_list_line(line: &str) -> bool {
    let rest = line.trim_start();
    if rest.starts_with('-') {
        return true;
    }
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && rest[digits..].starts_with('.')
}

/// Optional spaces, then `|`.
pub fn is_table_row(line: &str) -> bool {
    line.trim_start_matches(' ').starts_with('|')
}

/// Tries the collaborators for one Tab keypress.
pub struct Dispatcher<'a> {
    pub collaboration: &'a CollaborationConfig,
    pub zones: &'a ZoneConfig,
    pub in_delegation: &'a Cell<bool>,
    pub trace: bool,
}

impl Dispatcher<'_> {
    pub fn delegate(&self, host: &mut dyn Host, snapshot: &EditorSnapshot) -> Delegation {
        let line = &snapshot.current_line_text;

        if self.collaboration.outliner_better_tab && is_list_line(line) {
            if self.try_outliner(host, snapshot) {
                return Delegation::Handled;
            }
            decision!(self.trace, "outliner left the line unchanged");
        }

        if is_table_row(line) && !self.zones.tables {
            match snapshot.editing_mode {
                EditingMode::LivePreview if self.collaboration.native_table_editor => {
                    decision!(self.trace, "table row in live preview, deferring to table editor");
                    return Delegation::Defer;
                }
                EditingMode::Source if self.collaboration.advanced_tables => {
                    let found = host.invoke_command(TABLE_NEXT_CELL_COMMAND);
                    decision!(self.trace, found, "table row in source mode, moved to next cell");
                    return Delegation::Handled;
                }
                _ => {}
            }
        }

        Delegation::Declined
    }

    /// Run the outliner and report whether it changed the current line.
    fn try_outliner(&self, host: &mut dyn Host, snapshot: &EditorSnapshot) -> bool {
        let Some(_guard) = DelegationGuard::acquire(self.in_delegation) else {
            return false;
        };
        let line = snapshot.cursor_from.line;
        let found = host.invoke_command(OUTLINER_INDENT_COMMAND);
        let after = host.active_text_view().map(|view| view.line_text(line));
        let changed = after.as_deref() != Some(snapshot.current_line_text.as_str());
        decision!(self.trace, found, changed, "delegated to list outliner");
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_lines() {
        assert!(is_list_line("- item"));
        assert!(is_list_line("  - "));
        assert!(is_list_line("\t12. item"));
        assert!(is_list_line("-"));
        assert!(!is_list_line("* item"));
        assert!(!is_list_line("12 items"));
        assert!(!is_list_line("text - more"));
        assert!(!is_list_line(""));
    }

    #[test]
    fn test_table_rows() {
        assert!(is_table_row("| a | b |"));
        assert!(is_table_row("   |---|"));
        assert!(!is_table_row("\t| a |"));
        assert!(!is_table_row("a | b"));
    }

    #[test]
    fn test_guard_blocks_nested_acquire() {
        let flag = Cell::new(false);
        {
            let guard = DelegationGuard::acquire(&flag);
            assert!(guard.is_some());
            assert!(flag.get());
            assert!(DelegationGuard::acquire(&flag).is_none());
            // the failed attempt must not clear the mark
            assert!(flag.get());
        }
        assert!(!flag.get());
        assert!(DelegationGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_guard_released_on_unwind() {
        let flag = Cell::new(false);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = DelegationGuard::acquire(&flag);
            panic!("collaborator blew up");
        }));
        assert!(result.is_err());
        assert!(!flag.get());
    }
}
