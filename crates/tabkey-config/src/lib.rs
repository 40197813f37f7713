#![deny(unsafe_code)]

//! Configuration loading, validation, and settings compilation for tabkey.
//!
//! Loads TOML configuration files and validates them. [`AppConfig`] is the
//! user-facing record; [`AppConfig::build_settings`] compiles it into the
//! per-component [`Settings`] slices the key handlers read, with every
//! regular expression compiled exactly once.

/// Hotkey string parsing.
pub mod hotkey;
/// Import of the flat camelCase JSON settings record.
pub mod legacy;
/// Compiled, per-component settings slices.
pub mod settings;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use hotkey::{Hotkey, HotkeyError, Key, Modifiers};
pub use legacy::LegacySettings;
pub use settings::{
    BracePair, BracePairSet, BracketSettings, ConfigWarning, ExceptionRule, KeySettings, Settings,
};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("legacy settings: {0}")]
    Legacy(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// What a Tab keypress inserts.
    #[serde(default)]
    pub indent: IndentConfig,

    /// Behaviour when text is selected.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Lines for which Tab indents instead of inserting.
    #[serde(default)]
    pub exception: ExceptionConfig,

    /// Per-zone activation.
    #[serde(default)]
    pub zones: ZoneConfig,

    /// Cooperation with list and table extensions.
    #[serde(default)]
    pub collaboration: CollaborationConfig,

    /// Hotkeys the handlers are bound to.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Bracket-pair auto-indent on Enter.
    #[serde(default)]
    pub brackets: BracketsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tab insertion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentConfig {
    /// Insert spaces instead of a tab character.
    #[serde(default)]
    pub use_spaces: bool,

    /// Number of spaces making up one tab stop.
    #[serde(default = "default_spaces_count")]
    pub spaces_count: usize,

    /// Only insert enough spaces to reach the next tab stop.
    #[serde(default = "default_true")]
    pub align_spaces: bool,

    /// Insert U+00A0 instead of U+0020 so Markdown rendering keeps the run.
    #[serde(default)]
    pub use_hard_space: bool,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            use_spaces: false,
            spaces_count: default_spaces_count(),
            align_spaces: true,
            use_hard_space: false,
        }
    }
}

fn default_spaces_count() -> usize {
    4
}

fn default_true() -> bool {
    true
}

/// Selection handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Tab with a selection indents the selected lines.
    #[serde(default = "default_true")]
    pub indents_if_selection: bool,

    /// Only indent when the selection spans more than one line.
    #[serde(default = "default_true")]
    pub only_multiple_lines: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            indents_if_selection: true,
            only_multiple_lines: true,
        }
    }
}

/// The exception rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lines matching this pattern are indented instead of receiving a tab.
    #[serde(default = "default_exception_regex")]
    pub regex: String,
}

impl Default for ExceptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            regex: default_exception_regex(),
        }
    }
}

/// Empty bullet or numbered item, optionally with an unchecked checkbox.
pub fn default_exception_regex() -> String {
    r"^[\s\u00A0]*(-|\d+\.)( \[ \])?\s*$".to_string()
}

/// Zones in which the Tab handler is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    #[serde(default = "default_true")]
    pub code_blocks: bool,

    #[serde(default = "default_true")]
    pub inline_code: bool,

    #[serde(default = "default_true")]
    pub lists: bool,

    /// Also disables table delegation when set.
    #[serde(default)]
    pub tables: bool,

    #[serde(default = "default_true")]
    pub others: bool,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            code_blocks: true,
            inline_code: true,
            lists: true,
            tables: false,
            others: true,
        }
    }
}

/// Cooperation toggles for third-party extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationConfig {
    /// Hand list lines to the outliner's indent command first.
    #[serde(default = "default_true")]
    pub outliner_better_tab: bool,

    /// In live preview, leave table rows to the host's table editor.
    #[serde(default = "default_true")]
    pub native_table_editor: bool,

    /// In source mode, move to the next table cell.
    #[serde(default = "default_true")]
    pub advanced_tables: bool,
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            outliner_better_tab: true,
            native_table_editor: true,
            advanced_tables: true,
        }
    }
}

/// Hotkey bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_tab_hotkey")]
    pub tab_hotkey: String,

    #[serde(default = "default_enter_hotkey")]
    pub enter_hotkey: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            tab_hotkey: default_tab_hotkey(),
            enter_hotkey: default_enter_hotkey(),
        }
    }
}

fn default_tab_hotkey() -> String {
    "Tab".to_string()
}

fn default_enter_hotkey() -> String {
    "Enter".to_string()
}

/// Bracket-pair auto-indent.
///
/// ## TOML Example
///
/// ```toml
/// [brackets]
/// enabled = true
/// indent_chars = " \t"
///
/// [[brackets.text]]
/// open = '\(\s*$'
/// close = '^\s*\)'
///
/// [[brackets.code]]
/// open = '\{\s*$'
/// close = '^\s*\}'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Characters that make up a line's leading indent.
    #[serde(default = "default_indent_chars")]
    pub indent_chars: String,

    /// Pairs used outside code.
    #[serde(default = "default_text_pairs")]
    pub text: Vec<BracePatternConfig>,

    /// Pairs used in code blocks and inline code.
    #[serde(default = "default_code_pairs")]
    pub code: Vec<BracePatternConfig>,
}

impl Default for BracketsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            indent_chars: default_indent_chars(),
            text: default_text_pairs(),
            code: default_code_pairs(),
        }
    }
}

/// One open/close pattern pair as written in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracePatternConfig {
    /// Tested against the line text before the cursor.
    pub open: String,
    /// Tested against the line text after the cursor.
    pub close: String,
}

impl BracePatternConfig {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

fn default_indent_chars() -> String {
    " \t".to_string()
}

fn default_text_pairs() -> Vec<BracePatternConfig> {
    vec![
        BracePatternConfig::new(r"\(\s*$", r"^\s*\)"),
        BracePatternConfig::new(r"\[\s*$", r"^\s*\]"),
        BracePatternConfig::new(r"\{\s*$", r"^\s*\}"),
    ]
}

fn default_code_pairs() -> Vec<BracePatternConfig> {
    vec![
        BracePatternConfig::new(r"\(\s*$", r"^\s*\)"),
        BracePatternConfig::new(r"\[\s*$", r"^\s*\]"),
        BracePatternConfig::new(r"\{\s*$", r"^\s*\}"),
        BracePatternConfig::new(r"<[A-Za-z][^<>/]*>\s*$", r"^\s*</"),
    ]
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Trace every key-handling decision.
    #[serde(default)]
    pub developer_mode: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            developer_mode: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Regular expressions are not checked here: a pattern that fails to
    /// compile becomes a [`ConfigWarning`] in [`build_settings`](Self::build_settings).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=16).contains(&self.indent.spaces_count) {
            return Err(ConfigError::Validation(format!(
                "indent.spaces_count must be in 1..=16, got {}",
                self.indent.spaces_count
            )));
        }

        for (field, value) in [
            ("keys.tab_hotkey", &self.keys.tab_hotkey),
            ("keys.enter_hotkey", &self.keys.enter_hotkey),
        ] {
            if let Err(e) = value.parse::<Hotkey>() {
                return Err(ConfigError::Validation(format!("{field}: {e}")));
            }
        }

        if self.brackets.indent_chars.is_empty() {
            return Err(ConfigError::Validation(
                "brackets.indent_chars must not be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }

    /// Compile into per-component [`Settings`].
    ///
    /// Patterns that fail to compile are reported as warnings and the rule
    /// they belong to never matches.
    pub fn build_settings(&self) -> Result<(Settings, Vec<ConfigWarning>), ConfigError> {
        self.validate()?;
        Ok(settings::compile(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.indent.use_spaces);
        assert_eq!(config.indent.spaces_count, 4);
        assert!(config.indent.align_spaces);
        assert!(!config.indent.use_hard_space);
        assert!(config.selection.indents_if_selection);
        assert!(config.exception.enabled);
        assert!(!config.zones.tables);
        assert_eq!(config.keys.tab_hotkey, "Tab");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.developer_mode);
    }

    #[test]
    fn test_parse_empty_equals_default() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let toml = r#"
            [indent]
            use_spaces = true

            [zones]
            lists = false
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert!(config.indent.use_spaces);
        assert_eq!(config.indent.spaces_count, 4);
        assert!(config.indent.align_spaces);
        assert!(!config.zones.lists);
        assert!(config.zones.code_blocks);
        assert_eq!(config.brackets, BracketsConfig::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [indent]
            use_spaces = true
            spaces_count = 2
            align_spaces = false
            use_hard_space = true

            [selection]
            indents_if_selection = false
            only_multiple_lines = false

            [exception]
            enabled = false
            regex = '^\s*\*\s*$'

            [collaboration]
            outliner_better_tab = false

            [keys]
            tab_hotkey = "Ctrl+Tab"

            [[brackets.text]]
            open = '<<$'
            close = '^>>'

            [logging]
            level = "debug"
            developer_mode = true
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.indent.spaces_count, 2);
        assert!(config.indent.use_hard_space);
        assert!(!config.selection.only_multiple_lines);
        assert!(!config.exception.enabled);
        assert_eq!(config.exception.regex, r"^\s*\*\s*$");
        assert!(!config.collaboration.outliner_better_tab);
        assert!(config.collaboration.advanced_tables);
        assert_eq!(config.keys.tab_hotkey, "Ctrl+Tab");
        assert_eq!(config.brackets.text, vec![BracePatternConfig::new("<<$", "^>>")]);
        assert_eq!(config.brackets.code.len(), 4);
        assert!(config.logging.developer_mode);
    }

    #[test]
    fn test_validation_rejects_zero_spaces() {
        let result = AppConfig::parse("[indent]\nspaces_count = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_huge_spaces() {
        let result = AppConfig::parse("[indent]\nspaces_count = 40\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_hotkey() {
        let result = AppConfig::parse("[keys]\ntab_hotkey = \"Hyper+Tab\"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("keys.tab_hotkey"), "{err}");
    }

    #[test]
    fn test_validation_rejects_empty_indent_chars() {
        let result = AppConfig::parse("[brackets]\nindent_chars = \"\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_level() {
        let result = AppConfig::parse("[logging]\nlevel = \"loud\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_regex_is_not_a_parse_error() {
        let config = AppConfig::parse("[exception]\nregex = '(['\n").unwrap();
        let (settings, warnings) = config.build_settings().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "exception.regex");
        assert!(!settings.exception.matches("- "));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert_eq!(AppConfig::parse(&text).unwrap(), AppConfig::default());
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tabkey.toml");
        tokio::fs::write(&path, b"[indent]\nuse_spaces = true\nspaces_count = 8\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert!(config.indent.use_spaces);
        assert_eq!(config.indent.spaces_count, 8);
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/file.toml")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[").await.unwrap();

        let result = AppConfig::load(&path).await;
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
