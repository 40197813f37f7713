//! Line-oriented Markdown scanner producing syntax-token labels.
//!
//! The labels mimic what a Markdown editor's highlighter attaches to a
//! position: `hmd-codeblock` inside fenced code, `inline-code` inside a
//! backtick span, `list-N` on list items (N = nesting depth), and
//! `hmd-table-row` on pipe rows. Several labels are space-separated.

use crate::text::byte_offset;
use crate::view::Position;

/// Token label at `pos`, empty for plain text.
pub fn token_at<S: AsRef<str>>(lines: &[S], pos: Position) -> String {
    let line: &str = match lines.get(pos.line) {
        Some(line) => line.as_ref(),
        None => return String::new(),
    };

    if in_fenced_code(lines, pos.line) {
        return "hmd-codeblock".to_string();
    }

    let mut labels = Vec::new();
    if let Some(depth) = list_depth(line) {
        labels.push(format!("list-{depth}"));
    }
    if line.trim_start().starts_with('|') {
        labels.push("hmd-table-row".to_string());
    }
    if in_inline_code(line, byte_offset(line, pos.column)) {
        labels.push("inline-code".to_string());
    }
    labels.join(" ")
}

/// A fence line: three or more backticks or tildes.
fn fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let c = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.chars().take_while(|x| *x == c).count();
    (run >= 3).then_some((c, run))
}

/// Whether `line_no` is part of a fenced block, fence lines included.
fn in_fenced_code<S: AsRef<str>>(lines: &[S], line_no: usize) -> bool {
    let mut open: Option<(char, usize)> = None;
    for (i, line) in lines.iter().enumerate().take(line_no + 1) {
        let line = line.as_ref();
        match (open, fence(line)) {
            (None, Some(f)) => {
                if i == line_no {
                    return true;
                }
                open = Some(f);
            }
            (Some((c, len)), Some((fc, flen))) if c == fc && flen >= len && is_bare_fence(line) => {
                if i == line_no {
                    return true;
                }
                open = None;
            }
            _ => {}
        }
    }
    open.is_some()
}

/// A closing fence carries nothing after the fence characters.
fn is_bare_fence(line: &str) -> bool {
    line.trim().chars().all(|c| c == '`' || c == '~')
}

/// Nesting depth of a list item line (1-based), `None` if not a list item.
fn list_depth(line: &str) -> Option<usize> {
    let body = line.trim_start_matches([' ', '\t', '\u{a0}']);
    let indent = &line[..line.len() - body.len()];

    let marker_len = if body.starts_with(['-', '*', '+']) {
        1
    } else {
        let digits = body.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || !body[digits..].starts_with(['.', ')']) {
            return None;
        }
        digits + 1
    };

    let rest = &body[marker_len..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }

    let width: usize = indent
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum();
    Some(width / 4 + 1)
}

/// Whether byte offset `at` sits inside a single-backtick code span.
fn in_inline_code(line: &str, at: usize) -> bool {
    let mut open: Option<usize> = None;
    for (i, c) in line.char_indices() {
        if c != '`' {
            continue;
        }
        match open {
            None => open = Some(i),
            Some(start) => {
                if start < at && at <= i {
                    return true;
                }
                open = None;
            }
        }
    }
    false
}
