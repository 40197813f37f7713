//! Indentation engine: what a Tab keypress turns into.

use tabkey_config::{ExceptionRule, IndentConfig, SelectionConfig};

use crate::snapshot::EditorSnapshot;
use crate::text::utf16_len;
use crate::view::{EditAction, Position, TextView};

pub const HARD_SPACE: char = '\u{a0}';

/// The transformation chosen for a Tab keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabAction {
    /// Replace the selection (usually empty) with this text.
    ReplaceSelection(String),
    /// Indent the selected lines using the host's own indent unit.
    IndentLines,
}

/// The settings slices the engine reads.
#[derive(Debug, Clone, Copy)]
pub struct IndentRules<'a> {
    pub indent: &'a IndentConfig,
    pub selection: &'a SelectionConfig,
    pub exception: &'a ExceptionRule,
}

/// Decide what Tab does in `snapshot`.
pub fn compute_tab_action(snapshot: &EditorSnapshot, rules: IndentRules<'_>) -> TabAction {
    if snapshot.selection_non_empty
        && rules.selection.indents_if_selection
        && (!rules.selection.only_multiple_lines || snapshot.spans_lines())
    {
        return TabAction::IndentLines;
    }

    if !snapshot.selection_non_empty && rules.exception.matches(&snapshot.current_line_text) {
        return TabAction::IndentLines;
    }

    TabAction::ReplaceSelection(tab_text(rules.indent, snapshot.cursor_from.column))
}

/// The literal text one Tab inserts at `column`.
pub fn tab_text(indent: &IndentConfig, column: usize) -> String {
    if !indent.use_spaces {
        return "\t".to_string();
    }
    let space = if indent.use_hard_space { HARD_SPACE } else { ' ' };
    std::iter::repeat_n(space, space_run(indent, column)).collect()
}

/// How many spaces one Tab inserts at `column`; always in `1..=spaces_count`.
pub fn space_run(indent: &IndentConfig, column: usize) -> usize {
    let count = indent.spaces_count.max(1);
    if indent.align_spaces {
        count - column % count
    } else {
        count
    }
}

/// Apply `action` to `view`. `from` is the selection start captured before
/// the keypress.
pub fn apply(view: &mut dyn TextView, action: &TabAction, from: Position) {
    match action {
        TabAction::IndentLines => view.perform(EditAction::IndentMore),
        TabAction::ReplaceSelection(text) => {
            view.replace_selection(text);
            view.set_cursor(Position::new(from.line, from.column + utf16_len(text)));
        }
    }
}
