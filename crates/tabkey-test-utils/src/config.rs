//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values, or
//! compiled [`Settings`], without repeating boilerplate across crates.

use tabkey_config::{AppConfig, BracePatternConfig, Settings};

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let settings = TestConfigBuilder::new()
///     .spaces(4, true)
///     .developer_mode(true)
///     .settings();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Indent with `count` spaces, optionally aligned to tab stops.
    pub fn spaces(mut self, count: usize, align: bool) -> Self {
        self.config.indent.use_spaces = true;
        self.config.indent.spaces_count = count;
        self.config.indent.align_spaces = align;
        self
    }

    pub fn hard_spaces(mut self, enabled: bool) -> Self {
        self.config.indent.use_hard_space = enabled;
        self
    }

    pub fn selection(mut self, indents: bool, only_multiple_lines: bool) -> Self {
        self.config.selection.indents_if_selection = indents;
        self.config.selection.only_multiple_lines = only_multiple_lines;
        self
    }

    pub fn exception(mut self, enabled: bool, regex: &str) -> Self {
        self.config.exception.enabled = enabled;
        self.config.exception.regex = regex.to_string();
        self
    }

    pub fn code_blocks(mut self, active: bool) -> Self {
        self.config.zones.code_blocks = active;
        self
    }

    pub fn inline_code(mut self, active: bool) -> Self {
        self.config.zones.inline_code = active;
        self
    }

    pub fn lists(mut self, active: bool) -> Self {
        self.config.zones.lists = active;
        self
    }

    pub fn tables(mut self, active: bool) -> Self {
        self.config.zones.tables = active;
        self
    }

    pub fn others(mut self, active: bool) -> Self {
        self.config.zones.others = active;
        self
    }

    pub fn outliner(mut self, enabled: bool) -> Self {
        self.config.collaboration.outliner_better_tab = enabled;
        self
    }

    pub fn table_collaborators(mut self, native: bool, advanced: bool) -> Self {
        self.config.collaboration.native_table_editor = native;
        self.config.collaboration.advanced_tables = advanced;
        self
    }

    pub fn tab_hotkey(mut self, hotkey: &str) -> Self {
        self.config.keys.tab_hotkey = hotkey.to_string();
        self
    }

    pub fn brackets(mut self, enabled: bool) -> Self {
        self.config.brackets.enabled = enabled;
        self
    }

    /// Replace the text-zone bracket pairs.
    pub fn text_pairs(mut self, pairs: &[(&str, &str)]) -> Self {
        self.config.brackets.text = pairs
            .iter()
            .map(|(open, close)| BracePatternConfig::new(open, close))
            .collect();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn developer_mode(mut self, enabled: bool) -> Self {
        self.config.logging.developer_mode = enabled;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }

    /// Compile the configuration, panicking on validation errors.
    pub fn settings(self) -> Settings {
        let (settings, _warnings) = self
            .config
            .build_settings()
            .expect("test configuration should be valid");
        settings
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
