//! File-name sanitization for names taken from response headers.

/// Linux NAME_MAX in bytes.
const NAME_MAX: usize = 255;

/// Sanitizes a candidate file name so it is safe on common file systems.
///
/// - `:` becomes ` -`; `/` and `\` become `_`; `"` becomes `'`
/// - `*`, `?`, `<`, `>` and `|` are dropped
/// - NUL and other control characters become `_`
/// - leading/trailing spaces and dots are trimmed
/// - the result is cut to 255 bytes on a char boundary
///
/// Applying it to its own output returns the same string.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for c in name.chars() {
        match c {
            ':' => out.push_str(" -"),
            '/' | '\\' => out.push('_'),
            '"' => out.push('\''),
            '*' | '?' | '<' | '>' | '|' => {}
            c if c.is_control() => out.push('_'),
            c => out.push(c),
        }
    }

    let mut trimmed = trim_edges(&out);
    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed = trim_edges(&trimmed[..take]);
    }
    trimmed.to_string()
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '.')
}
