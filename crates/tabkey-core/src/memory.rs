//! In-memory host: a line buffer implementing [`TextView`] and a [`Host`]
//! with simulated list-outliner and table-navigation extensions.
//!
//! The CLI and TUI drive the engine through this host, and tests use it as
//! a faithful stand-in for a real editor.

use tabkey_config::Key;

use crate::collab::{OUTLINER_INDENT_COMMAND, TABLE_NEXT_CELL_COMMAND, is_list_line, is_table_row};
use crate::markdown;
use crate::text::{byte_offset, leading_run, split_at_column, utf16_len};
use crate::view::{Anchor, EditAction, EditingMode, Host, Position, TextView};

/// Marks the cursor in [`MemoryView::from_marked`] and [`MemoryView::to_marked`].
pub const CARET: &str = "<|>";
/// Marks the selection anchor when it differs from the cursor.
pub const ANCHOR_MARK: &str = "<a>";

/// Cursor motions used by interactive front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

/// A Markdown document held as lines, with one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryView {
    lines: Vec<String>,
    anchor: Position,
    head: Position,
    mode: EditingMode,
    indent_unit: String,
    pair_aware_newline: bool,
}

impl MemoryView {
    /// Split `text` on `\n`; joining with [`text`](Self::text) gives it back.
    pub fn new(text: &str) -> Self {
        Self::from_lines(&text.split('\n').collect::<Vec<_>>())
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut lines: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            anchor: Position::default(),
            head: Position::default(),
            mode: EditingMode::Source,
            indent_unit: "\t".to_string(),
            pair_aware_newline: false,
        }
    }

    /// Parse text carrying a [`CARET`] and optionally an [`ANCHOR_MARK`].
    /// Without a caret the cursor starts at `0:0`.
    pub fn from_marked(text: &str) -> Self {
        let mut anchor = None;
        let mut head = None;
        let mut lines = Vec::new();
        for (line_no, raw) in text.split('\n').enumerate() {
            let mut line = raw.to_string();
            loop {
                let (idx, mark) = match (line.find(ANCHOR_MARK), line.find(CARET)) {
                    (Some(a), Some(c)) if a < c => (a, ANCHOR_MARK),
                    (Some(a), None) => (a, ANCHOR_MARK),
                    (_, Some(c)) => (c, CARET),
                    (None, None) => break,
                };
                line.replace_range(idx..idx + mark.len(), "");
                let pos = Position::new(line_no, utf16_len(&line[..idx]));
                if mark == CARET {
                    head = Some(pos);
                } else {
                    anchor = Some(pos);
                }
            }
            lines.push(line);
        }
        let head = head.unwrap_or_default();
        Self::from_lines(&lines).with_selection(anchor.unwrap_or(head), head)
    }

    /// The text with the cursor, and the anchor of a non-empty selection,
    /// marked.
    pub fn to_marked(&self) -> String {
        let mut marks = vec![(self.head, CARET)];
        if self.has_selection() {
            marks.push((self.anchor, ANCHOR_MARK));
        }
        marks.sort_by(|a, b| b.0.cmp(&a.0));

        let mut lines = self.lines.clone();
        for (pos, mark) in marks {
            let line = &mut lines[pos.line];
            let at = byte_offset(line, pos.column);
            line.insert_str(at, mark);
        }
        lines.join("\n")
    }

    pub fn with_cursor(mut self, pos: Position) -> Self {
        self.set_cursor(pos);
        self
    }

    pub fn with_selection(mut self, anchor: Position, head: Position) -> Self {
        self.set_selection(anchor, head);
        self
    }

    pub fn with_mode(mut self, mode: EditingMode) -> Self {
        self.mode = mode;
        self
    }

    /// The text `indentMore` prepends (default `"\t"`).
    pub fn with_indent_unit(mut self, unit: &str) -> Self {
        self.indent_unit = unit.to_string();
        self
    }

    /// Make `newlineWithIndent` split `(|)`, `[|]` and `{|}` over three
    /// lines by itself, as code-editor hosts do.
    pub fn with_pair_aware_newline(mut self, enabled: bool) -> Self {
        self.pair_aware_newline = enabled;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn mode(&self) -> EditingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditingMode) {
        self.mode = mode;
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    /// Type `c` over the selection.
    pub fn insert_char(&mut self, c: char) {
        self.replace_selection(c.encode_utf8(&mut [0; 4]));
    }

    /// Delete the selection, or the character before the cursor.
    pub fn backspace(&mut self) {
        if self.has_selection() {
            self.replace_selection("");
            return;
        }
        let head = self.head;
        let start = self.step_left(head);
        if start != head {
            self.delete_range(start, head);
            self.anchor = start;
            self.head = start;
        }
    }

    /// Move the cursor; with `extend`, only the head moves.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        let head = self.head;
        let target = match motion {
            Motion::Left => self.step_left(head),
            Motion::Right => self.step_right(head),
            Motion::Up if head.line > 0 => self.clamp(Position::new(head.line - 1, head.column)),
            Motion::Up => Position::new(0, 0),
            Motion::Down if head.line + 1 < self.lines.len() => {
                self.clamp(Position::new(head.line + 1, head.column))
            }
            Motion::Down => Position::new(head.line, self.line_len(head.line)),
            Motion::LineStart => Position::new(head.line, 0),
            Motion::LineEnd => Position::new(head.line, self.line_len(head.line)),
        };
        self.head = target;
        if !extend {
            self.anchor = target;
        }
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| utf16_len(l))
    }

    /// Clamp to an existing line and a char boundary within it.
    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        let text = &self.lines[line];
        let column = utf16_len(&text[..byte_offset(text, pos.column)]);
        Position::new(line, column)
    }

    fn step_left(&self, pos: Position) -> Position {
        let (before, _) = split_at_column(&self.lines[pos.line], pos.column);
        match before.chars().last() {
            Some(c) => Position::new(pos.line, pos.column - c.len_utf16()),
            None if pos.line > 0 => Position::new(pos.line - 1, self.line_len(pos.line - 1)),
            None => pos,
        }
    }

    fn step_right(&self, pos: Position) -> Position {
        let (_, after) = split_at_column(&self.lines[pos.line], pos.column);
        match after.chars().next() {
            Some(c) => Position::new(pos.line, pos.column + c.len_utf16()),
            None if pos.line + 1 < self.lines.len() => Position::new(pos.line + 1, 0),
            None => pos,
        }
    }

    fn ordered(&self) -> (Position, Position) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    fn delete_range(&mut self, from: Position, to: Position) {
        let from = self.clamp(from);
        let to = self.clamp(to);
        if from.line == to.line {
            let line = &mut self.lines[from.line];
            let start = byte_offset(line, from.column);
            let end = byte_offset(line, to.column);
            line.replace_range(start..end, "");
            return;
        }
        let last = &self.lines[to.line];
        let tail = last[byte_offset(last, to.column)..].to_string();
        let first = &mut self.lines[from.line];
        first.truncate(byte_offset(first, from.column));
        first.push_str(&tail);
        self.lines.drain(from.line + 1..=to.line);
    }

    /// Insert `text` at `pos`, returning the position after it.
    fn insert_at(&mut self, pos: Position, text: &str) -> Position {
        let pos = self.clamp(pos);
        let line = &self.lines[pos.line];
        let split = byte_offset(line, pos.column);
        let tail = line[split..].to_string();
        let mut head = line[..split].to_string();

        let mut segments = text.split('\n');
        head.push_str(segments.next().unwrap_or_default());
        let mut rest: Vec<String> = segments.map(String::from).collect();

        match rest.last_mut() {
            None => {
                let column = utf16_len(&head);
                head.push_str(&tail);
                self.lines[pos.line] = head;
                Position::new(pos.line, column)
            }
            Some(last) => {
                let column = utf16_len(last);
                last.push_str(&tail);
                let end_line = pos.line + rest.len();
                self.lines[pos.line] = head;
                self.lines.splice(pos.line + 1..pos.line + 1, rest);
                Position::new(end_line, column)
            }
        }
    }

    fn between_pair(prefix: &str, suffix: &str) -> bool {
        matches!(
            (prefix.chars().last(), suffix.chars().next()),
            (Some('('), Some(')')) | (Some('['), Some(']')) | (Some('{'), Some('}'))
        )
    }

    fn newline_with_indent(&mut self) {
        let (from, _) = self.ordered();
        let line = self.lines[from.line].clone();
        let indent = leading_run(&line, |c| c == ' ' || c == '\t');

        if self.pair_aware_newline && !self.has_selection() {
            let (prefix, suffix) = split_at_column(&line, from.column);
            if Self::between_pair(prefix, suffix) {
                let unit = self.indent_unit.clone();
                self.replace_selection(&format!("\n{indent}{unit}\n{indent}"));
                self.set_cursor(Position::new(
                    from.line + 1,
                    utf16_len(indent) + utf16_len(&unit),
                ));
                return;
            }
        }
        self.replace_selection(&format!("\n{indent}"));
    }

    fn indent_more(&mut self) {
        let (from, to) = self.ordered();
        // A selection ending at the start of a line does not touch that line.
        let last = if to.line > from.line && to.column == 0 {
            to.line - 1
        } else {
            to.line
        };
        let shift = utf16_len(&self.indent_unit);
        for line in from.line..=last {
            self.lines[line].insert_str(0, &self.indent_unit);
        }
        for pos in [&mut self.anchor, &mut self.head] {
            if (from.line..=last).contains(&pos.line) {
                pos.column += shift;
            }
        }
    }
}

impl TextView for MemoryView {
    fn cursor(&self, anchor: Anchor) -> Position {
        let (from, to) = self.ordered();
        match anchor {
            Anchor::From => from,
            Anchor::To => to,
            Anchor::Head => self.head,
            Anchor::Anchor => self.anchor,
        }
    }

    fn selected_text(&self) -> String {
        let (from, to) = self.ordered();
        if from.line == to.line {
            let line = &self.lines[from.line];
            return line[byte_offset(line, from.column)..byte_offset(line, to.column)].to_string();
        }
        let first = &self.lines[from.line];
        let last = &self.lines[to.line];
        let mut parts = vec![&first[byte_offset(first, from.column)..]];
        parts.extend(self.lines[from.line + 1..to.line].iter().map(String::as_str));
        parts.push(&last[..byte_offset(last, to.column)]);
        parts.join("\n")
    }

    fn line_text(&self, line: usize) -> String {
        self.lines.get(line).cloned().unwrap_or_default()
    }

    /// Replaces an existing line, or appends when `line` is one past the end.
    fn set_line_text(&mut self, line: usize, text: &str) {
        if line < self.lines.len() {
            self.lines[line] = text.to_string();
        } else if line == self.lines.len() {
            self.lines.push(text.to_string());
        } else {
            tracing::trace!(line, "set_line_text past end of buffer ignored");
            return;
        }
        self.anchor = self.clamp(self.anchor);
        self.head = self.clamp(self.head);
    }

    fn replace_selection(&mut self, text: &str) {
        let (from, to) = self.ordered();
        self.delete_range(from, to);
        let end = self.insert_at(from, text);
        self.anchor = end;
        self.head = end;
    }

    fn set_cursor(&mut self, pos: Position) {
        let pos = self.clamp(pos);
        self.anchor = pos;
        self.head = pos;
    }

    fn set_selection(&mut self, anchor: Position, head: Position) {
        self.anchor = self.clamp(anchor);
        self.head = self.clamp(head);
    }

    fn perform(&mut self, action: EditAction) {
        match action {
            EditAction::IndentMore => self.indent_more(),
            EditAction::NewlineWithIndent => self.newline_with_indent(),
        }
    }

    fn syntax_token_at(&self, pos: Position) -> String {
        markdown::token_at(&self.lines, pos)
    }

    fn editing_mode(&self) -> EditingMode {
        self.mode
    }
}

/// Which simulated extensions are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collaborators {
    pub outliner: bool,
    pub table_navigator: bool,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            outliner: true,
            table_navigator: true,
        }
    }
}

/// A host with at most one open view.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    view: Option<MemoryView>,
    collaborators: Collaborators,
    invoked: Vec<String>,
}

impl MemoryHost {
    pub fn new(view: MemoryView) -> Self {
        Self {
            view: Some(view),
            ..Self::default()
        }
    }

    /// A host with no active Markdown view.
    pub fn without_view() -> Self {
        Self::default()
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn view(&self) -> Option<&MemoryView> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut MemoryView> {
        self.view.as_mut()
    }

    pub fn into_view(self) -> Option<MemoryView> {
        self.view
    }

    /// Command ids invoked so far, in order.
    pub fn invoked(&self) -> &[String] {
        &self.invoked
    }

    /// The host's own behaviour for a key no handler consumed.
    pub fn run_default(&mut self, key: Key) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        match key {
            Key::Tab => view.replace_selection("\t"),
            Key::Enter => view.perform(EditAction::NewlineWithIndent),
            _ => return false,
        }
        true
    }
}

impl Host for MemoryHost {
    fn active_text_view(&mut self) -> Option<&mut dyn TextView> {
        self.view.as_mut().map(|v| v as &mut dyn TextView)
    }

    fn invoke_command(&mut self, id: &str) -> bool {
        self.invoked.push(id.to_string());
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        match id {
            OUTLINER_INDENT_COMMAND if self.collaborators.outliner => {
                outliner_indent(view);
                true
            }
            TABLE_NEXT_CELL_COMMAND if self.collaborators.table_navigator => {
                table_next_cell(view);
                true
            }
            _ => false,
        }
    }
}

fn indent_width(line: &str) -> usize {
    leading_run(line, char::is_whitespace)
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Nest the cursor's list item under the item above it. Items without a
/// parent candidate, or already nested deeper than it, are left alone.
fn outliner_indent(view: &mut MemoryView) {
    let line = view.cursor(Anchor::Head).line;
    let text = view.line_text(line);
    if line == 0 || !is_list_line(&text) {
        return;
    }
    let above = view.line_text(line - 1);
    if is_list_line(&above) && indent_width(&above) >= indent_width(&text) {
        view.perform(EditAction::IndentMore);
    }
}

/// Move to the start of the next cell, wrapping to the next row.
fn table_next_cell(view: &mut MemoryView) {
    let head = view.cursor(Anchor::Head);
    let text = view.line_text(head.line);
    let start = byte_offset(&text, head.column);

    let Some(pipe) = text[start..].find('|').map(|i| start + i) else {
        return;
    };
    let after = &text[pipe + 1..];
    if after.trim().is_empty() {
        let next = view.line_text(head.line + 1);
        if is_table_row(&next) {
            let first = next.find('|').map_or(0, |i| i + 1);
            let skip = usize::from(next[first..].starts_with(' '));
            view.set_cursor(Position::new(head.line + 1, utf16_len(&next[..first]) + skip));
        }
        return;
    }
    let skip = usize::from(after.starts_with(' '));
    view.set_cursor(Position::new(head.line, utf16_len(&text[..=pipe]) + skip));
}
