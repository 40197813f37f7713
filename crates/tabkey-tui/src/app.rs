//! Core TUI application state and event handling.

use std::path::PathBuf;
use std::rc::Rc;

use tabkey_config::{AppConfig, ConfigWarning, Settings};
use tabkey_core::{Keymap, LogReader, TabKeyPlugin};

use crate::keymap::{Action, KeyMapper};
use crate::panels::{ConfigPanel, DecisionsPanel, EditorPanel, PanelState};

/// The panels available in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Editor,
    Decisions,
    Config,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Editor, Panel::Decisions, Panel::Config];

    pub fn title(self) -> &'static str {
        match self {
            Panel::Editor => "Editor",
            Panel::Decisions => "Decisions",
            Panel::Config => "Config",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Panel::Editor => 0,
            Panel::Decisions => 1,
            Panel::Config => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Panel::Editor => Panel::Decisions,
            Panel::Decisions => Panel::Config,
            Panel::Config => Panel::Editor,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Panel::Editor => Panel::Config,
            Panel::Decisions => Panel::Editor,
            Panel::Config => Panel::Decisions,
        }
    }
}

/// A file the main loop should write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub text: String,
}

pub struct App {
    pub should_quit: bool,
    pub active_panel: Panel,
    pub keymap: KeyMapper,
    /// Engine bindings the editor's Tab/Enter go through.
    pub bindings: Keymap,
    pub editor: EditorPanel,
    pub decisions: DecisionsPanel,
    pub config_panel: ConfigPanel,
    pub status_message: String,
    pending_save: Option<SaveRequest>,
}

impl App {
    pub fn new(
        config: &AppConfig,
        settings: Settings,
        warnings: &[ConfigWarning],
        log_reader: LogReader,
        editor: EditorPanel,
    ) -> Self {
        let config_toml =
            toml::to_string_pretty(config).unwrap_or_else(|e| format!("# error: {e}"));

        let plugin = Rc::new(TabKeyPlugin::new(settings));
        let mut bindings = Keymap::new();
        plugin.register(&mut bindings);

        Self {
            should_quit: false,
            active_panel: Panel::Editor,
            keymap: KeyMapper::new(),
            bindings,
            editor,
            decisions: DecisionsPanel::new(log_reader),
            config_panel: ConfigPanel::new(&config_toml, warnings),
            status_message: String::new(),
            pending_save: None,
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextPanel => self.active_panel = self.active_panel.next(),
            Action::PrevPanel => self.active_panel = self.active_panel.prev(),
            Action::Save => self.request_save(),
            Action::ToggleMode => {
                let mode = self.editor.toggle_mode();
                self.status_message = format!("editing mode: {mode}");
            }
            Action::Press(hotkey) => {
                let result = self.editor.press(hotkey, &self.bindings);
                self.status_message = match result {
                    tabkey_core::Dispatch::Consumed(name) => format!("{hotkey}: {name}"),
                    tabkey_core::Dispatch::Unhandled => format!("{hotkey}: host default"),
                };
            }
            Action::Insert(c) => self.editor.insert(c),
            Action::Backspace => self.editor.backspace(),
            Action::Move { motion, extend } => self.editor.move_cursor(motion, extend),
            Action::ScrollDown => self.scrollable_mut(|p| p.scroll_down(1)),
            Action::ScrollUp => self.scrollable_mut(|p| p.scroll_up(1)),
            Action::ScrollToTop => self.scrollable_mut(|p| p.scroll_to_top()),
            Action::ScrollToBottom => self.scrollable_mut(|p| p.scroll_to_bottom()),
            Action::ToggleFilter => {
                if self.active_panel == Panel::Decisions {
                    self.decisions.toggle_filter();
                }
            }
            Action::None => {}
        }
    }

    /// Refresh live sources.
    pub fn tick(&mut self) {
        self.decisions.refresh();
    }

    fn scrollable_mut(&mut self, f: impl FnOnce(&mut dyn PanelState)) {
        match self.active_panel {
            Panel::Editor => {}
            Panel::Decisions => f(&mut self.decisions),
            Panel::Config => f(&mut self.config_panel),
        }
    }

    fn request_save(&mut self) {
        match &self.editor.path {
            Some(path) => {
                self.pending_save = Some(SaveRequest {
                    path: path.clone(),
                    text: self.editor.text(),
                });
            }
            None => self.status_message = "no file to save to".to_string(),
        }
    }

    pub fn take_save_request(&mut self) -> Option<SaveRequest> {
        self.pending_save.take()
    }

    /// Record the outcome of a save the main loop performed.
    pub fn save_finished(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.editor.dirty = false;
                self.status_message = "saved".to_string();
            }
            Err(e) => self.status_message = format!("save failed: {e}"),
        }
    }

    pub fn status_line(&self) -> String {
        let hint = " ^Q:quit  ^S:save  F2:mode  F6/S-F6:panels";
        let detail = match self.active_panel {
            Panel::Decisions => self
                .decisions
                .last_decision()
                .map(|d| format!("  last: {d}"))
                .unwrap_or_default(),
            _ if self.status_message.is_empty() => String::new(),
            _ => format!("  {}", self.status_message),
        };
        format!("{hint}  [{}]{detail}", self.active_panel.title())
    }
}
