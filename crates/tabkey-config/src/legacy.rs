//! Import of the flat, camelCase JSON settings record.
//!
//! Older installs persisted a single JSON object with one key per option.
//! Loading it is a shallow merge over the defaults: missing keys keep their
//! default value and unknown keys (UI language, panel state) are ignored.
//! The bracket pattern sets were stored as JSON arrays encoded inside
//! strings; they are decoded here and zipped into index-aligned pairs.

use serde::{Deserialize, Serialize};

use crate::{
    AppConfig, BracePatternConfig, BracketsConfig, CollaborationConfig, ConfigError,
    ExceptionConfig, IndentConfig, KeysConfig, LoggingConfig, SelectionConfig, ZoneConfig,
};

/// The flat settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacySettings {
    pub indents_if_selection: bool,
    pub indents_if_selection_only_for_multiple_lines: bool,
    pub use_spaces: bool,
    pub align_spaces: bool,
    pub use_hard_space: bool,
    pub spaces_count: usize,
    pub allow_exception: bool,
    pub exception_regex: String,
    pub activate_in_code_blocks: bool,
    pub activate_in_inline_code: bool,
    pub activate_in_lists: bool,
    pub activate_in_tables: bool,
    pub activate_in_others: bool,
    pub use_outliner_better_tab: bool,
    pub obsidian_table_editor: bool,
    pub use_advanced_tables: bool,
    pub hotkey: String,
    pub auto_indent_brackets: bool,
    pub indent_characters: String,
    /// JSON array of open patterns, encoded as a string.
    pub open_patterns: String,
    /// JSON array of close patterns, encoded as a string.
    pub close_patterns: String,
    pub open_patterns_code: String,
    pub close_patterns_code: String,
    pub developer_mode: bool,
}

impl Default for LegacySettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl LegacySettings {
    /// Parse a JSON settings record, merging it over the defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Flatten an [`AppConfig`] into the record layout.
    pub fn from_config(config: &AppConfig) -> Self {
        let (open_patterns, close_patterns) = encode_pairs(&config.brackets.text);
        let (open_patterns_code, close_patterns_code) = encode_pairs(&config.brackets.code);
        Self {
            indents_if_selection: config.selection.indents_if_selection,
            indents_if_selection_only_for_multiple_lines: config.selection.only_multiple_lines,
            use_spaces: config.indent.use_spaces,
            align_spaces: config.indent.align_spaces,
            use_hard_space: config.indent.use_hard_space,
            spaces_count: config.indent.spaces_count,
            allow_exception: config.exception.enabled,
            exception_regex: config.exception.regex.clone(),
            activate_in_code_blocks: config.zones.code_blocks,
            activate_in_inline_code: config.zones.inline_code,
            activate_in_lists: config.zones.lists,
            activate_in_tables: config.zones.tables,
            activate_in_others: config.zones.others,
            use_outliner_better_tab: config.collaboration.outliner_better_tab,
            obsidian_table_editor: config.collaboration.native_table_editor,
            use_advanced_tables: config.collaboration.advanced_tables,
            hotkey: config.keys.tab_hotkey.clone(),
            auto_indent_brackets: config.brackets.enabled,
            indent_characters: config.brackets.indent_chars.clone(),
            open_patterns,
            close_patterns,
            open_patterns_code,
            close_patterns_code,
            developer_mode: config.logging.developer_mode,
        }
    }

    /// Convert to the sectioned configuration and validate it.
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            indent: IndentConfig {
                use_spaces: self.use_spaces,
                spaces_count: self.spaces_count,
                align_spaces: self.align_spaces,
                use_hard_space: self.use_hard_space,
            },
            selection: SelectionConfig {
                indents_if_selection: self.indents_if_selection,
                only_multiple_lines: self.indents_if_selection_only_for_multiple_lines,
            },
            exception: ExceptionConfig {
                enabled: self.allow_exception,
                regex: self.exception_regex,
            },
            zones: ZoneConfig {
                code_blocks: self.activate_in_code_blocks,
                inline_code: self.activate_in_inline_code,
                lists: self.activate_in_lists,
                tables: self.activate_in_tables,
                others: self.activate_in_others,
            },
            collaboration: CollaborationConfig {
                outliner_better_tab: self.use_outliner_better_tab,
                native_table_editor: self.obsidian_table_editor,
                advanced_tables: self.use_advanced_tables,
            },
            keys: KeysConfig {
                tab_hotkey: self.hotkey,
                ..KeysConfig::default()
            },
            brackets: BracketsConfig {
                enabled: self.auto_indent_brackets,
                indent_chars: self.indent_characters,
                text: decode_pairs("openPatterns", &self.open_patterns, &self.close_patterns)?,
                code: decode_pairs(
                    "openPatternsCode",
                    &self.open_patterns_code,
                    &self.close_patterns_code,
                )?,
            },
            logging: LoggingConfig {
                developer_mode: self.developer_mode,
                ..LoggingConfig::default()
            },
        };
        config.validate()?;
        Ok(config)
    }
}

fn encode_pairs(pairs: &[BracePatternConfig]) -> (String, String) {
    let open: Vec<&str> = pairs.iter().map(|p| p.open.as_str()).collect();
    let close: Vec<&str> = pairs.iter().map(|p| p.close.as_str()).collect();
    // Serializing a Vec<&str> cannot fail.
    (
        serde_json::to_string(&open).unwrap_or_default(),
        serde_json::to_string(&close).unwrap_or_default(),
    )
}

/// Decode two string-encoded arrays and zip them; the shorter one wins.
fn decode_pairs(
    field: &str,
    open: &str,
    close: &str,
) -> Result<Vec<BracePatternConfig>, ConfigError> {
    let decode = |s: &str| -> Result<Vec<String>, ConfigError> {
        serde_json::from_str(s)
            .map_err(|e| ConfigError::Legacy(format!("{field}: not a JSON string array: {e}")))
    };
    let open = decode(open)?;
    let close = decode(close)?;
    if open.len() != close.len() {
        tracing::warn!(
            field,
            open = open.len(),
            close = close.len(),
            "pattern arrays differ in length, extra entries dropped"
        );
    }
    Ok(open
        .into_iter()
        .zip(close)
        .map(|(open, close)| BracePatternConfig { open, close })
        .collect())
}
