//! UTF-16 column arithmetic over `str`.
//!
//! Editor columns count UTF-16 code units; Rust strings index by byte.
//! Every conversion clamps: a column past the end maps to the end, and a
//! column inside a surrogate pair maps to the start of that character.

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte offset of UTF-16 column `column` in `s`.
pub fn byte_offset(s: &str, column: usize) -> usize {
    let mut units = 0;
    for (idx, c) in s.char_indices() {
        let next = units + c.len_utf16();
        if next > column {
            return idx;
        }
        units = next;
    }
    s.len()
}

/// Split `s` at UTF-16 column `column`.
pub fn split_at_column(s: &str, column: usize) -> (&str, &str) {
    s.split_at(byte_offset(s, column))
}

/// The longest prefix of `s` whose characters all satisfy `pred`.
pub fn leading_run(s: &str, pred: impl Fn(char) -> bool) -> &str {
    let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
    &s[..end]
}
