//! Environment classifier: syntax token → [`Zone`].
//!
//! Classification is an ordered substring table. The first row whose
//! substring occurs in the token wins, so the row order *is* the precedence:
//! inline code beats code block beats list item beats table.

use std::fmt;

use serde::Serialize;
use tabkey_config::ZoneConfig;

/// The syntactic context of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Zone {
    CodeBlock,
    InlineCode,
    ListItem,
    Table,
    Other,
}

impl Zone {
    /// Code zones select the code bracket set.
    pub fn is_code(self) -> bool {
        matches!(self, Zone::CodeBlock | Zone::InlineCode)
    }

    /// Whether the Tab handler is active in this zone.
    pub fn is_active(self, zones: &ZoneConfig) -> bool {
        match self {
            Zone::CodeBlock => zones.code_blocks,
            Zone::InlineCode => zones.inline_code,
            Zone::ListItem => zones.lists,
            Zone::Table => zones.tables,
            Zone::Other => zones.others,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Zone::CodeBlock => "code-block",
            Zone::InlineCode => "inline-code",
            Zone::ListItem => "list-item",
            Zone::Table => "table",
            Zone::Other => "other",
        })
    }
}

/// Token substrings in precedence order.
pub const ZONE_TABLE: &[(&str, Zone)] = &[
    ("inline-code", Zone::InlineCode),
    ("codeblock", Zone::CodeBlock),
    ("code-block", Zone::CodeBlock),
    ("list", Zone::ListItem),
    ("table", Zone::Table),
];

/// Classify a raw syntax token.
pub fn classify(token: &str) -> Zone {
    ZONE_TABLE
        .iter()
        .find(|(needle, _)| token.contains(needle))
        .map_or(Zone::Other, |&(_, zone)| zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabkey_config::AppConfig;

    #[test]
    fn test_basic_tokens() {
        assert_eq!(classify("hmd-codeblock"), Zone::CodeBlock);
        assert_eq!(classify("cm-code-block"), Zone::CodeBlock);
        assert_eq!(classify("inline-code"), Zone::InlineCode);
        assert_eq!(classify("list-1"), Zone::ListItem);
        assert_eq!(classify("hmd-table-row"), Zone::Table);
        assert_eq!(classify("header_header-1"), Zone::Other);
        assert_eq!(classify(""), Zone::Other);
    }

    #[test]
    fn test_inline_code_inside_list_wins() {
        assert_eq!(classify("list-1_inline-code"), Zone::InlineCode);
        assert_eq!(classify("inline-code list-2"), Zone::InlineCode);
    }

    #[test]
    fn test_codeblock_beats_list_and_table() {
        assert_eq!(classify("list-1 hmd-codeblock"), Zone::CodeBlock);
        assert_eq!(classify("hmd-table-row hmd-codeblock"), Zone::CodeBlock);
        assert_eq!(classify("hmd-table-row list-3"), Zone::ListItem);
    }

    #[test]
    fn test_classify_is_pure() {
        for token in ["", "list-1", "hmd-codeblock", "inline-code", "hmd-table-sep", "em"] {
            assert_eq!(classify(token), classify(token));
        }
    }

    #[test]
    fn test_gate_follows_zone_flags() {
        let mut config = AppConfig::default();
        config.zones.lists = false;
        let zones = &config.zones;

        assert!(!Zone::ListItem.is_active(zones));
        assert!(Zone::CodeBlock.is_active(zones));
        assert!(Zone::Other.is_active(zones));
        assert!(!Zone::Table.is_active(zones));
    }

    #[test]
    fn test_is_code() {
        assert!(Zone::CodeBlock.is_code());
        assert!(Zone::InlineCode.is_code());
        assert!(!Zone::ListItem.is_code());
        assert!(!Zone::Other.is_code());
    }
}
