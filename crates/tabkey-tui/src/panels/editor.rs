//! Editor panel: the Markdown buffer with cursor and selection.

use std::path::PathBuf;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use tabkey_config::Hotkey;
use tabkey_core::memory::Motion;
use tabkey_core::{
    Anchor, Dispatch, EditingMode, Keymap, MemoryHost, MemoryView, Position, TextView, classify,
};

const TAB_WIDTH: usize = 4;

pub struct EditorPanel {
    host: MemoryHost,
    pub path: Option<PathBuf>,
    pub dirty: bool,
    /// First visible line.
    top: usize,
}

impl EditorPanel {
    pub fn new(text: &str, path: Option<PathBuf>) -> Self {
        Self {
            host: MemoryHost::new(MemoryView::new(text)),
            path,
            dirty: false,
            top: 0,
        }
    }

    pub fn view(&self) -> Option<&MemoryView> {
        self.host.view()
    }

    pub fn text(&self) -> String {
        self.view().map(MemoryView::text).unwrap_or_default()
    }

    pub fn mode(&self) -> EditingMode {
        self.view().map(MemoryView::mode).unwrap_or_default()
    }

    /// Offer `hotkey` to `keymap`; fall back to the host's own handling of
    /// unmodified keys.
    pub fn press(&mut self, hotkey: Hotkey, keymap: &Keymap) -> Dispatch {
        let before = self.text();
        let result = keymap.dispatch(&hotkey, &mut self.host);
        if !result.is_consumed() && hotkey.modifiers.is_empty() {
            self.host.run_default(hotkey.key);
        }
        self.dirty |= self.text() != before;
        result
    }

    pub fn insert(&mut self, c: char) {
        if let Some(view) = self.host.view_mut() {
            view.insert_char(c);
            self.dirty = true;
        }
    }

    pub fn backspace(&mut self) {
        let before = self.text();
        if let Some(view) = self.host.view_mut() {
            view.backspace();
        }
        self.dirty |= self.text() != before;
    }

    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        if let Some(view) = self.host.view_mut() {
            view.move_cursor(motion, extend);
        }
    }

    pub fn toggle_mode(&mut self) -> EditingMode {
        let mode = self.mode().toggled();
        if let Some(view) = self.host.view_mut() {
            view.set_mode(mode);
        }
        mode
    }

    /// Command ids the engine invoked, most recent last.
    pub fn invoked_commands(&self) -> &[String] {
        self.host.invoked()
    }

    /// Zone under the cursor, for the title bar.
    fn cursor_zone(&self) -> String {
        self.view()
            .map(|v| classify(&v.syntax_token_at(v.cursor(Anchor::From))).to_string())
            .unwrap_or_default()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(view) = self.host.view() else {
            return;
        };
        let height = area.height.saturating_sub(2) as usize;
        let head = view.cursor(Anchor::Head);

        // keep the cursor line on screen
        if head.line < self.top {
            self.top = head.line;
        } else if height > 0 && head.line >= self.top + height {
            self.top = head.line + 1 - height;
        }

        let from = view.cursor(Anchor::From);
        let to = view.cursor(Anchor::To);
        let lines: Vec<Line> = view
            .lines()
            .iter()
            .enumerate()
            .skip(self.top)
            .take(height)
            .map(|(n, text)| render_line(n, text, from, to).0)
            .collect();

        let name = self
            .path
            .as_ref()
            .map_or_else(|| "untitled".to_string(), |p| p.display().to_string());
        let title = format!(
            " {name}{dirty}  {head}  {mode}  {zone} ",
            dirty = if self.dirty { " *" } else { "" },
            mode = view.mode(),
            zone = self.cursor_zone(),
        );

        let (_, cursor_x) = render_line(head.line, &view.lines()[head.line], head, head);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
            area,
        );

        let x = area.x + 1 + cursor_x.min(u16::MAX as usize) as u16;
        let y = area.y + 1 + (head.line - self.top) as u16;
        if x < area.right() && y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position((x, y));
        }
    }
}

/// Styled line and the display column of `from` on it. Tabs expand to the
/// next stop and show as `→`; hard spaces show as `·`.
fn render_line(line_no: usize, text: &str, from: Position, to: Position) -> (Line<'static>, usize) {
    let selected = Style::default().bg(Color::DarkGray);
    let marker = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    let mut column = 0;
    let mut display = 0;
    let mut cursor_x = None;

    for c in text.chars() {
        let here = Position::new(line_no, column);
        if here == from {
            cursor_x = Some(display);
        }
        let in_selection = from <= here && here < to;
        let (shown, style) = match c {
            '\t' => {
                let width = TAB_WIDTH - display % TAB_WIDTH;
                (format!("→{}", " ".repeat(width - 1)), marker)
            }
            '\u{a0}' => ("·".to_string(), marker),
            c => (c.to_string(), Style::default()),
        };
        display += shown.chars().count();
        spans.push(Span::styled(
            shown,
            if in_selection { style.patch(selected) } else { style },
        ));
        column += c.len_utf16();
    }
    // a selection running past the end of this line covers the line break
    if from.line <= line_no && line_no < to.line {
        spans.push(Span::styled(" ", selected));
    }

    (Line::from(spans), cursor_x.unwrap_or(display))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use tabkey_config::{Key, Settings};
    use tabkey_core::TabKeyPlugin;

    fn keymap() -> Keymap {
        let plugin = Rc::new(TabKeyPlugin::new(Settings::default()));
        let mut keymap = Keymap::new();
        plugin.register(&mut keymap);
        keymap
    }

    #[test]
    fn test_typing_marks_dirty() {
        let mut editor = EditorPanel::new("", None);
        assert!(!editor.dirty);
        editor.insert('(');
        editor.insert(')');
        editor.move_cursor(Motion::Left, false);
        assert_eq!(editor.text(), "()");
        assert!(editor.dirty);
    }

    #[test]
    fn test_press_routes_through_keymap() {
        let keymap = keymap();
        let mut editor = EditorPanel::new("()", None);
        editor.move_cursor(Motion::Right, false);

        let result = editor.press(Hotkey::plain(Key::Enter), &keymap);
        assert!(result.is_consumed());
        assert_eq!(editor.text(), "(\n\t\n)");

        let result = editor.press(Hotkey::plain(Key::Enter), &keymap);
        assert_eq!(result, Dispatch::Unhandled);
        assert_eq!(editor.text(), "(\n\t\n\t\n)");
    }

    #[test]
    fn test_unbound_chord_changes_nothing() {
        let keymap = keymap();
        let mut editor = EditorPanel::new("a", None);
        editor.press("Ctrl+Enter".parse().unwrap(), &keymap);
        assert_eq!(editor.text(), "a");
        assert!(!editor.dirty);
    }

    #[test]
    fn test_toggle_mode() {
        let mut editor = EditorPanel::new("", None);
        assert_eq!(editor.toggle_mode(), EditingMode::LivePreview);
        assert_eq!(editor.mode(), EditingMode::LivePreview);
        assert_eq!(editor.toggle_mode(), EditingMode::Source);
    }

    #[test]
    fn test_render_line_expands_tabs() {
        let caret = Position::new(0, 2);
        let (line, x) = render_line(0, "a\tb", caret, caret);
        let shown: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(shown, "a→  b");
        assert_eq!(x, 4);
    }

    #[test]
    fn test_render_line_cursor_at_end() {
        let caret = Position::new(3, 5);
        let (_, x) = render_line(3, "\u{a0}abc", caret, caret);
        assert_eq!(x, 4);
    }
}
