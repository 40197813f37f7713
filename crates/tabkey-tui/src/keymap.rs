//! Terminal key events to TUI actions.
//!
//! A few global chords work everywhere. In the editor, Tab, Enter and any
//! chord with Ctrl or Alt become [`Action::Press`] so they reach the engine's
//! keymap; other keys edit the buffer directly. The read-only panels scroll
//! with vim-style keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tabkey_config::{Hotkey, Key, Modifiers};
use tabkey_core::memory::Motion;

use crate::app::Panel;

/// An action the TUI can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextPanel,
    PrevPanel,
    Save,
    ToggleMode,
    /// Offer a hotkey to the engine keymap, then the host default.
    Press(Hotkey),
    Insert(char),
    Backspace,
    Move { motion: Motion, extend: bool },
    ScrollDown,
    ScrollUp,
    ScrollToTop,
    ScrollToBottom,
    ToggleFilter,
    None,
}

#[derive(Debug, Default)]
pub struct KeyMapper;

impl KeyMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, event: KeyEvent, panel: Panel) -> Action {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);

        match event.code {
            KeyCode::Char('q') if ctrl => return Action::Quit,
            KeyCode::Char('s') if ctrl => return Action::Save,
            KeyCode::F(6) if shift => return Action::PrevPanel,
            KeyCode::F(6) => return Action::NextPanel,
            KeyCode::F(2) => return Action::ToggleMode,
            _ => {}
        }

        match panel {
            Panel::Editor => Self::resolve_editor(event),
            Panel::Decisions | Panel::Config => Self::resolve_viewer(event.code),
        }
    }

    fn resolve_editor(event: KeyEvent) -> Action {
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let chord = event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        let motion = match event.code {
            KeyCode::Left => Some(Motion::Left),
            KeyCode::Right => Some(Motion::Right),
            KeyCode::Up => Some(Motion::Up),
            KeyCode::Down => Some(Motion::Down),
            KeyCode::Home => Some(Motion::LineStart),
            KeyCode::End => Some(Motion::LineEnd),
            _ => None,
        };
        if let Some(motion) = motion {
            return Action::Move {
                motion,
                extend: shift,
            };
        }

        match event.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Enter => {
                to_hotkey(event).map_or(Action::None, Action::Press)
            }
            KeyCode::Char(_) if chord => to_hotkey(event).map_or(Action::None, Action::Press),
            KeyCode::Char(c) => Action::Insert(c),
            KeyCode::Backspace => Action::Backspace,
            _ => Action::None,
        }
    }

    fn resolve_viewer(code: KeyCode) -> Action {
        match code {
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('g') | KeyCode::Home => Action::ScrollToTop,
            KeyCode::Char('G') | KeyCode::End => Action::ScrollToBottom,
            KeyCode::Char('f') => Action::ToggleFilter,
            _ => Action::None,
        }
    }
}

/// The engine hotkey for a terminal key event, if it has one.
pub fn to_hotkey(event: KeyEvent) -> Option<Hotkey> {
    let mut modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
        meta: event
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };
    let key = match event.code {
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            modifiers.shift = true;
            Key::Tab
        }
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::F(n) => Key::F(n),
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
        _ => return None,
    };
    Some(Hotkey::plain(key).with_modifiers(modifiers))
}
