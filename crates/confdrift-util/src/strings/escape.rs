use std::fmt::Write;

/// Escape special characters in a string for JSON serialization.
///
/// Escapes the two JSON metacharacters (`"` and `\`), the short-form control
/// escapes (`\b`, `\t`, `\n`, `\f`, `\r`), and every other control character
/// as `\u00xx`. Everything else passes through unchanged, so the output is
/// byte-for-byte deterministic for a given input.
///
/// # Examples
///
/// ```
/// use confdrift_util::strings::escape;
///
/// assert_eq!(escape("plain"), "plain");
/// assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
/// assert_eq!(escape("a\tb\nc"), "a\\tb\\nc");
/// assert_eq!(escape("\u{1}"), "\\u0001");
/// ```
pub fn escape(s: &str) -> String {
    // Fast path: nothing to escape.
    if !s.chars().any(needs_escape) {
        return s.to_owned();
    }

    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{000C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                // String::write_fmt never fails.
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

fn needs_escape(ch: char) -> bool {
    matches!(ch, '"' | '\\') || (ch as u32) < 0x20
}
