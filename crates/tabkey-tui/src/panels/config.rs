//! Config panel: resolved configuration as TOML, with compile warnings.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tabkey_config::ConfigWarning;

use super::PanelState;

pub struct ConfigPanel {
    lines: Vec<String>,
    warnings: Vec<String>,
    scroll_offset: usize,
}

impl ConfigPanel {
    pub fn new(toml_text: &str, warnings: &[ConfigWarning]) -> Self {
        Self {
            lines: toml_text.lines().map(String::from).collect(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
            scroll_offset: 0,
        }
    }

    fn total(&self) -> usize {
        self.warnings.len() + self.lines.len()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;

        let warning_lines = self.warnings.iter().map(|w| {
            Line::from(Span::styled(
                format!("# warning: {w}"),
                Style::default().fg(Color::Red),
            ))
        });
        let toml_lines = self.lines.iter().map(|line| {
            if line.starts_with('[') {
                Line::from(Span::styled(
                    line.as_str(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            } else if let Some((key, value)) = line.split_once(" = ") {
                Line::from(vec![
                    Span::styled(key, Style::default().fg(Color::Yellow)),
                    Span::raw(" = "),
                    Span::styled(value, Style::default().fg(Color::Green)),
                ])
            } else {
                Line::from(line.as_str())
            }
        });

        let visible: Vec<Line> = warning_lines
            .chain(toml_lines)
            .skip(self.scroll_offset)
            .take(visible_height)
            .collect();

        let title = match self.warnings.len() {
            0 => " Config ".to_string(),
            n => format!(" Config ({n} warning(s)) "),
        };
        let paragraph = Paragraph::new(visible)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

impl PanelState for ConfigPanel {
    fn scroll_down(&mut self, n: usize) {
        let max = self.total().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + n).min(max);
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.total().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabkey_config::AppConfig;

    #[test]
    fn test_warnings_come_first() {
        let mut config = AppConfig::default();
        config.exception.regex = "(".to_string();
        let (_, warnings) = config.build_settings().unwrap();
        let panel = ConfigPanel::new("[indent]\nuse_spaces = false\n", &warnings);
        assert_eq!(panel.lines.len(), 2);
        assert_eq!(panel.warnings.len(), 1);
        assert!(panel.warnings[0].starts_with("exception.regex"));
    }

    #[test]
    fn test_scroll_clamps() {
        let text = (0..20).map(|i| format!("k{i} = {i}")).collect::<Vec<_>>().join("\n");
        let mut panel = ConfigPanel::new(&text, &[]);
        panel.scroll_down(5);
        assert_eq!(panel.scroll_offset, 5);
        panel.scroll_up(9);
        assert_eq!(panel.scroll_offset, 0);
        panel.scroll_to_bottom();
        assert_eq!(panel.scroll_offset, 19);
        panel.scroll_down(3);
        assert_eq!(panel.scroll_offset, 19);
    }
}
