//! The host editor as seen by the engine.
//!
//! The engine never owns a buffer. Everything it reads or mutates goes
//! through [`TextView`], and everything outside the active view (other
//! extensions' commands) goes through [`Host`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A position in the buffer; `column` counts UTF-16 code units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Error parsing a `line:column` string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected LINE:COLUMN, got {0:?}")]
pub struct PositionParseError(pub String);

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PositionParseError(s.to_string());
        let (line, column) = s.split_once(':').ok_or_else(err)?;
        Ok(Position {
            line: line.trim().parse().map_err(|_| err())?,
            column: column.trim().parse().map_err(|_| err())?,
        })
    }
}

/// Which end of the selection to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The earlier end.
    From,
    /// The later end.
    To,
    /// Where the cursor is.
    Head,
    /// Where the selection started.
    Anchor,
}

/// How the host is presenting the document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditingMode {
    #[default]
    Source,
    LivePreview,
}

impl EditingMode {
    pub fn toggled(self) -> Self {
        match self {
            EditingMode::Source => EditingMode::LivePreview,
            EditingMode::LivePreview => EditingMode::Source,
        }
    }
}

impl fmt::Display for EditingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditingMode::Source => "source",
            EditingMode::LivePreview => "live-preview",
        })
    }
}

/// Named edit primitives provided by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Prepend one host indent unit to every selected line.
    IndentMore,
    /// Break the line at the cursor, carrying over the current indentation.
    NewlineWithIndent,
}

/// The active Markdown text view.
pub trait TextView {
    fn cursor(&self, anchor: Anchor) -> Position;

    fn selected_text(&self) -> String;

    fn has_selection(&self) -> bool {
        self.cursor(Anchor::From) != self.cursor(Anchor::To)
    }

    /// Text of `line`, empty when out of range.
    fn line_text(&self, line: usize) -> String;

    fn set_line_text(&mut self, line: usize, text: &str);

    fn replace_selection(&mut self, text: &str);

    fn set_cursor(&mut self, pos: Position);

    fn set_selection(&mut self, anchor: Position, head: Position);

    fn perform(&mut self, action: EditAction);

    /// Syntax-tree node label at `pos` (e.g. `"hmd-codeblock"`), possibly empty.
    fn syntax_token_at(&self, pos: Position) -> String;

    fn editing_mode(&self) -> EditingMode;
}

/// The host application.
pub trait Host {
    /// The active Markdown view, if any.
    fn active_text_view(&mut self) -> Option<&mut dyn TextView>;

    /// Run another extension's command by id. Returns `false` when no such
    /// command exists.
    fn invoke_command(&mut self, id: &str) -> bool;
}
