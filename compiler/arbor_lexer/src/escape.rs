//! Escape processing for string literal bodies.

use std::borrow::Cow;

/// Cook the text between the quotes of a string literal.
///
/// Unknown escapes keep the escaped character, so `"\q"` reads as `q`.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Inverse of [`unescape`] for printing a literal back to source.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['\\', '"', '\n', '\t', '\r', '\0']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
