//! Compiled settings: the read-only view the key handlers consume.
//!
//! Each component receives only its own slice: the indentation engine reads
//! [`IndentConfig`] and [`SelectionConfig`], the classifier gate reads
//! [`ZoneConfig`], and so on. Regular expressions are compiled here, once.

use std::fmt;

use regex::Regex;

use crate::{
    AppConfig, BracePatternConfig, CollaborationConfig, Hotkey, IndentConfig, SelectionConfig,
    ZoneConfig,
};

/// A non-fatal problem found while compiling the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted path of the offending field (e.g. `brackets.code[2].open`).
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All settings, grouped per component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub indent: IndentConfig,
    pub selection: SelectionConfig,
    pub exception: ExceptionRule,
    pub zones: ZoneConfig,
    pub collaboration: CollaborationConfig,
    pub keys: KeySettings,
    pub brackets: BracketSettings,
    pub developer_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        compile(&AppConfig::default()).0
    }
}

/// The compiled exception rule.
#[derive(Debug, Clone)]
pub struct ExceptionRule {
    pub enabled: bool,
    /// `None` when the configured pattern failed to compile.
    pub regex: Option<Regex>,
}

impl ExceptionRule {
    /// Whether the rule is enabled and matches `line`.
    pub fn matches(&self, line: &str) -> bool {
        self.enabled && self.regex.as_ref().is_some_and(|re| re.is_match(line))
    }
}

/// Parsed hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySettings {
    pub tab: Hotkey,
    pub enter: Hotkey,
}

/// Bracket auto-indent settings.
#[derive(Debug, Clone)]
pub struct BracketSettings {
    pub enabled: bool,
    pub indent_chars: Vec<char>,
    /// Used outside code.
    pub text: BracePairSet,
    /// Used in code blocks and inline code.
    pub code: BracePairSet,
}

impl BracketSettings {
    pub fn is_indent_char(&self, c: char) -> bool {
        self.indent_chars.contains(&c)
    }
}

/// An ordered, index-aligned set of open/close patterns.
#[derive(Debug, Clone, Default)]
pub struct BracePairSet {
    pairs: Vec<BracePair>,
}

impl BracePairSet {
    pub fn pairs(&self) -> &[BracePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// One compiled open/close pair. A side that failed to compile is `None`
/// and the pair never matches.
#[derive(Debug, Clone)]
pub struct BracePair {
    pub open: Option<Regex>,
    pub close: Option<Regex>,
}

impl BracePair {
    /// Whether `open` matches the text before the cursor and `close` the text after it.
    pub fn straddles(&self, prefix: &str, suffix: &str) -> bool {
        match (&self.open, &self.close) {
            (Some(open), Some(close)) => open.is_match(prefix) && close.is_match(suffix),
            _ => false,
        }
    }
}

/// Compile `config` without validating it. Hotkeys that fail to parse fall
/// back to their defaults; callers go through [`AppConfig::build_settings`],
/// which validates first.
pub(crate) fn compile(config: &AppConfig) -> (Settings, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();

    let exception = ExceptionRule {
        enabled: config.exception.enabled,
        regex: compile_pattern("exception.regex", &config.exception.regex, &mut warnings),
    };

    let keys = KeySettings {
        tab: config
            .keys
            .tab_hotkey
            .parse()
            .unwrap_or(Hotkey::plain(crate::Key::Tab)),
        enter: config
            .keys
            .enter_hotkey
            .parse()
            .unwrap_or(Hotkey::plain(crate::Key::Enter)),
    };

    let brackets = BracketSettings {
        enabled: config.brackets.enabled,
        indent_chars: config.brackets.indent_chars.chars().collect(),
        text: compile_pairs("brackets.text", &config.brackets.text, &mut warnings),
        code: compile_pairs("brackets.code", &config.brackets.code, &mut warnings),
    };

    for warning in &warnings {
        tracing::warn!(field = %warning.field, "{}", warning.message);
    }

    let settings = Settings {
        indent: config.indent.clone(),
        selection: config.selection.clone(),
        exception,
        zones: config.zones.clone(),
        collaboration: config.collaboration.clone(),
        keys,
        brackets,
        developer_mode: config.logging.developer_mode,
    };
    (settings, warnings)
}

fn compile_pairs(
    field: &str,
    pairs: &[BracePatternConfig],
    warnings: &mut Vec<ConfigWarning>,
) -> BracePairSet {
    let pairs = pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| BracePair {
            open: compile_pattern(&format!("{field}[{i}].open"), &pair.open, warnings),
            close: compile_pattern(&format!("{field}[{i}].close"), &pair.close, warnings),
        })
        .collect();
    BracePairSet { pairs }
}

fn compile_pattern(field: &str, pattern: &str, warnings: &mut Vec<ConfigWarning>) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warnings.push(ConfigWarning {
                field: field.to_string(),
                message: format!("pattern {pattern:?} does not compile, rule disabled: {e}"),
            });
            None
        }
    }
}
