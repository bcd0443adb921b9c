//! Content-Disposition header parsing (raw file-name token).

/// Extracts the raw file-name token from a Content-Disposition header value.
///
/// Tried in order:
/// - the first double-quoted substring (`attachment; filename="Go in Action.pdf"`)
/// - everything after the last `=` (`attachment; filename=report.pdf`)
///
/// Returns `None` when neither yields a non-empty value. The token is returned
/// as sent; HTML-unescaping and sanitization happen in `derive_file_name`.
pub fn parse_content_disposition_filename(header_value: &str) -> Option<String> {
    if let Some(quoted) = first_quoted(header_value) {
        if !quoted.is_empty() {
            return Some(quoted.to_string());
        }
    }

    let (_, tail) = header_value.rsplit_once('=')?;
    let tail = tail.trim();
    if tail.is_empty() {
        return None;
    }
    Some(tail.to_string())
}

/// Text between the first pair of double quotes on a single line.
fn first_quoted(value: &str) -> Option<&str> {
    let start = value.find('"')? + 1;
    let rest = &value[start..];
    let end = rest.find('"')?;
    let inner = &rest[..end];
    if inner.contains('\n') {
        return None;
    }
    Some(inner)
}
