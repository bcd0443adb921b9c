//! File-name derivation for downloaded items.
//!
//! Turns the raw token from a Content-Disposition header into the single name
//! used on disk: extracted, HTML-unescaped, then sanitized.

mod content_disposition;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use sanitize::sanitize_filename;

/// Name used when sanitization leaves nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// HTML-unescape then sanitize a raw file-name token.
///
/// # Examples
///
/// - `clean_file_name("C&amp;C: Red Alert.pdf")` → `"C&C - Red Alert.pdf"`
/// - `clean_file_name("..")` → `"download.bin"`
pub fn clean_file_name(raw: &str) -> String {
    let unescaped = html_escape::decode_html_entities(raw);
    let sanitized = sanitize_filename(&unescaped);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Derives the on-disk file name from a Content-Disposition header value.
///
/// Returns `None` when no file-name token can be extracted.
pub fn derive_file_name(content_disposition: &str) -> Option<String> {
    parse_content_disposition_filename(content_disposition).map(|raw| clean_file_name(&raw))
}
