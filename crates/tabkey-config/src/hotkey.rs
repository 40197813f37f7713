//! Hotkey strings: `"Tab"`, `"Ctrl+Tab"`, `"Mod-Enter"`.
//!
//! The configured Tab hotkey is free-form text; it is parsed once at load
//! time into a [`Hotkey`] so that key dispatch compares typed values.

use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing a hotkey string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey string is empty")]
    Empty,

    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),

    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// A non-modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Space,
    Backspace,
    Escape,
    /// Function key `F1`–`F24`.
    F(u8),
    /// A printable character, stored lowercase.
    Char(char),
}

/// Modifier keys held with a [`Key`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// A key together with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl Hotkey {
    /// A bare key with no modifiers.
    pub const fn plain(key: Key) -> Self {
        Self {
            modifiers: Modifiers::NONE,
            key,
        }
    }

    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HotkeyError::Empty);
        }

        // `+` is the canonical separator; `-` is accepted when it is not the key itself.
        let parts: Vec<&str> = if s.contains('+') {
            s.split('+').collect()
        } else if s.len() > 1 && s.contains('-') {
            s.split('-').collect()
        } else {
            vec![s]
        };

        let (key_part, modifier_parts) = match parts.split_last() {
            Some((key, mods)) => (*key, mods),
            None => return Err(HotkeyError::Empty),
        };

        let mut modifiers = Modifiers::NONE;
        for part in modifier_parts {
            match part.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "mod" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                other => return Err(HotkeyError::UnknownModifier(other.to_string())),
            }
        }

        Ok(Hotkey {
            modifiers,
            key: parse_key(key_part.trim())?,
        })
    }
}

fn parse_key(s: &str) -> Result<Key, HotkeyError> {
    if s.is_empty() {
        return Err(HotkeyError::Empty);
    }
    let lower = s.to_ascii_lowercase();
    let key = match lower.as_str() {
        "tab" => Key::Tab,
        "enter" | "return" => Key::Enter,
        "space" => Key::Space,
        "backspace" => Key::Backspace,
        "esc" | "escape" => Key::Escape,
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                (Some('f'), Some(_)) => match lower[1..].parse::<u8>() {
                    Ok(n @ 1..=24) => Key::F(n),
                    _ => return Err(HotkeyError::UnknownKey(s.to_string())),
                },
                _ => return Err(HotkeyError::UnknownKey(s.to_string())),
            }
        }
    };
    Ok(key)
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (held, name) in [
            (m.ctrl, "Ctrl"),
            (m.alt, "Alt"),
            (m.shift, "Shift"),
            (m.meta, "Meta"),
        ] {
            if held {
                write!(f, "{name}+")?;
            }
        }
        match self.key {
            Key::Tab => f.write_str("Tab"),
            Key::Enter => f.write_str("Enter"),
            Key::Space => f.write_str("Space"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Escape => f.write_str("Escape"),
            Key::F(n) => write!(f, "F{n}"),
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_keys() {
        assert_eq!("Tab".parse::<Hotkey>().unwrap(), Hotkey::plain(Key::Tab));
        assert_eq!("enter".parse::<Hotkey>().unwrap(), Hotkey::plain(Key::Enter));
        assert_eq!("F5".parse::<Hotkey>().unwrap(), Hotkey::plain(Key::F(5)));
        assert_eq!("i".parse::<Hotkey>().unwrap(), Hotkey::plain(Key::Char('i')));
    }

    #[test]
    fn test_modifiers_with_either_separator() {
        let plus: Hotkey = "Ctrl+Shift+Tab".parse().unwrap();
        let dash: Hotkey = "Mod-Shift-Tab".parse().unwrap();
        assert_eq!(plus, dash);
        assert!(plus.modifiers.ctrl);
        assert!(plus.modifiers.shift);
        assert!(!plus.modifiers.alt);
        assert_eq!(plus.key, Key::Tab);
    }

    #[test]
    fn test_dash_key_alone() {
        assert_eq!("-".parse::<Hotkey>().unwrap(), Hotkey::plain(Key::Char('-')));
    }

    #[test]
    fn test_errors() {
        assert_eq!("".parse::<Hotkey>(), Err(HotkeyError::Empty));
        assert_eq!("Ctrl+".parse::<Hotkey>(), Err(HotkeyError::Empty));
        assert_eq!(
            "Hyper+Tab".parse::<Hotkey>(),
            Err(HotkeyError::UnknownModifier("hyper".to_string()))
        );
        assert_eq!(
            "Tabby".parse::<Hotkey>(),
            Err(HotkeyError::UnknownKey("Tabby".to_string()))
        );
        assert!("F99".parse::<Hotkey>().is_err());
    }

    #[test]
    fn test_display_is_canonical() {
        let key: Hotkey = "shift-alt-i".parse().unwrap();
        assert_eq!(key.to_string(), "Alt+Shift+I");
        assert_eq!(key.to_string().parse::<Hotkey>().unwrap(), key);
    }
}
