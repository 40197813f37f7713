//! Context prober: an immutable picture of the editor at keypress time.

use crate::view::{Anchor, EditingMode, Host, Position, TextView};

/// Editor state captured once per keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot {
    pub cursor_from: Position,
    pub cursor_to: Position,
    pub selection_non_empty: bool,
    pub current_line_text: String,
    pub syntax_token: String,
    pub editing_mode: EditingMode,
}

impl EditorSnapshot {
    /// Capture the state of `view`.
    pub fn capture(view: &dyn TextView) -> Self {
        let cursor_from = view.cursor(Anchor::From);
        let cursor_to = view.cursor(Anchor::To);
        Self {
            cursor_from,
            cursor_to,
            selection_non_empty: cursor_from != cursor_to,
            current_line_text: view.line_text(cursor_from.line),
            syntax_token: view.syntax_token_at(cursor_from),
            editing_mode: view.editing_mode(),
        }
    }

    /// Whether the selection covers more than one line.
    pub fn spans_lines(&self) -> bool {
        self.cursor_from.line != self.cursor_to.line
    }
}

/// Snapshot the active view, or `None` when no Markdown view is active.
pub fn probe(host: &mut dyn Host) -> Option<EditorSnapshot> {
    host.active_text_view()
        .map(|view| EditorSnapshot::capture(view))
}
