//! Bracket-pair auto-indent for Enter.
//!
//! With the cursor between an opener and its closer (`{|}`), Enter expands
//! the pair over three lines:
//!
//! ```text
//! {          {
//!            ⇥|
//! }          }
//! ```
//!
//! The opener line is left alone, the middle line gets one more indent
//! level than the original, and the closer keeps the original indent.

use tabkey_config::{BracePairSet, BracketSettings};

use crate::snapshot::EditorSnapshot;
use crate::text::{leading_run, split_at_column, utf16_len};
use crate::view::{Anchor, EditAction, Position, TextView};

/// Index of the first pair whose opener matches the text before `column`
/// and whose closer matches the text after it.
pub fn detect(set: &BracePairSet, line: &str, column: usize) -> Option<usize> {
    let (prefix, suffix) = split_at_column(line, column);
    set.pairs()
        .iter()
        .position(|pair| pair.straddles(prefix, suffix))
}

/// Perform the three-line expansion for a detected pair.
///
/// The edits run in a fixed order; the host's newline primitive decides
/// where the cursor lands in between, so reordering changes the result.
pub fn expand(view: &mut dyn TextView, snapshot: &EditorSnapshot, settings: &BracketSettings) {
    let line = snapshot.cursor_from.line;
    let text = &snapshot.current_line_text;
    let (_, suffix) = split_at_column(text, snapshot.cursor_from.column);
    let indent = leading_run(text, |c| settings.is_indent_char(c));

    view.perform(EditAction::NewlineWithIndent);

    if !suffix.is_empty() {
        // Some hosts push the closer down by themselves; others leave it on
        // the cursor line and need a second break. Any closer text still
        // after the cursor means line+2 does not exist yet.
        let head = view.cursor(Anchor::Head);
        let cursor_line = view.line_text(head.line);
        let (_, rest) = split_at_column(&cursor_line, head.column);
        if rest.chars().any(|c| !settings.is_indent_char(c)) {
            view.perform(EditAction::NewlineWithIndent);
        }
    }

    view.set_line_text(line + 1, indent);
    if !suffix.is_empty() {
        view.set_line_text(line + 2, &format!("{indent}{suffix}"));
    }
    view.set_cursor(Position::new(line + 1, utf16_len(indent)));
    view.perform(EditAction::IndentMore);
}
