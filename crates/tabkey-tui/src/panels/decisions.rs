//! Decisions panel: live view of captured log events, with the engine's
//! per-keypress decision trace highlighted.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use tabkey_core::LogReader;
use tabkey_core::logging::DECISION_TARGET;
use tracing::Level;

use super::PanelState;

pub struct DecisionsPanel {
    reader: LogReader,
    entries: Vec<LogLine>,
    /// Scroll offset (0 = latest).
    scroll_offset: usize,
    auto_follow: bool,
    /// Hide everything except decision events.
    pub only_decisions: bool,
}

struct LogLine {
    elapsed: String,
    level: Level,
    is_decision: bool,
    target: String,
    message: String,
}

impl DecisionsPanel {
    pub fn new(reader: LogReader) -> Self {
        Self {
            reader,
            entries: Vec::new(),
            scroll_offset: 0,
            auto_follow: true,
            only_decisions: false,
        }
    }

    /// Re-read the log buffer.
    pub fn refresh(&mut self) {
        let only_decisions = self.only_decisions;
        self.entries = self
            .reader
            .entries()
            .into_iter()
            .filter(|e| !only_decisions || e.target == DECISION_TARGET)
            .map(|e| LogLine {
                elapsed: format!("{:>8.2}s", e.elapsed_secs),
                level: e.level,
                is_decision: e.target == DECISION_TARGET,
                target: e.target,
                message: e.message,
            })
            .collect();

        if self.auto_follow {
            self.scroll_offset = 0;
        }
    }

    pub fn toggle_filter(&mut self) {
        self.only_decisions = !self.only_decisions;
        self.scroll_offset = 0;
        self.auto_follow = true;
        self.refresh();
    }

    /// The most recent decision message, for the status bar.
    pub fn last_decision(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.is_decision)
            .map(|e| e.message.as_str())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let filter = if self.only_decisions { " [decisions only]" } else { "" };

        if self.entries.is_empty() {
            let empty = Paragraph::new("  (press Tab or Enter in the editor)")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .title(format!(" Decisions (0){filter} "))
                        .borders(Borders::ALL),
                );
            frame.render_widget(empty, area);
            return;
        }

        let total = self.entries.len();
        let skip = total.saturating_sub(visible_height + self.scroll_offset);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(skip)
            .take(visible_height)
            .map(|entry| {
                let level_style = match entry.level {
                    Level::ERROR => Style::default().fg(Color::Red),
                    Level::WARN => Style::default().fg(Color::Yellow),
                    Level::INFO => Style::default().fg(Color::Green),
                    Level::DEBUG => Style::default().fg(Color::Blue),
                    Level::TRACE => Style::default().fg(Color::DarkGray),
                };
                let message_style = if entry.is_decision {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };

                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", entry.elapsed),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(format!("{:>5} ", entry.level), level_style),
                    Span::styled(
                        format!("{}: ", entry.target),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(entry.message.as_str(), message_style),
                ]))
            })
            .collect();

        let follow = if self.auto_follow { " [follow]" } else { "" };
        let title = format!(" Decisions ({total}){filter}{follow} ");
        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }
}

impl PanelState for DecisionsPanel {
    fn scroll_down(&mut self, n: usize) {
        if self.scroll_offset >= n {
            self.scroll_offset -= n;
        } else {
            self.scroll_offset = 0;
            self.auto_follow = true;
        }
    }

    fn scroll_up(&mut self, n: usize) {
        self.auto_follow = false;
        let max_offset = self.entries.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + n).min(max_offset);
    }

    fn scroll_to_top(&mut self) {
        self.auto_follow = false;
        self.scroll_offset = self.entries.len().saturating_sub(1);
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
        self.auto_follow = true;
    }
}
