//! Page fetcher: GET a catalog page and parse it into a queryable document.
//!
//! Runs in the current thread. Transport failures and non-2xx responses
//! surface as `FetchError`. Bodies are decoded by their declared charset
//! (`Content-Type`, then `<meta>`), defaulting to UTF-8 with a windows-1252
//! fallback, so a page in a legacy encoding still parses.

use crate::error::Result;
use crate::http::{check_status, HttpOptions};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use scraper::Html;

/// How far into the body a `<meta>` charset declaration is looked for.
const META_SNIFF_LEN: usize = 1024;

/// A fetched and parsed HTML page.
pub struct Page {
    /// URL that was requested.
    pub url: String,
    pub document: Html,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("url", &self.url).finish_non_exhaustive()
    }
}

/// Fetches `url` and parses the body as HTML.
pub fn fetch_page(url: &str, http: &HttpOptions) -> Result<Page> {
    let mut body: Vec<u8> = Vec::new();
    let mut easy = http.easy(url)?;

    let performed = collect_body(&mut easy, &mut body, http);
    http.finish(url, performed)?;

    let status = easy
        .response_code()
        .map_err(|e| crate::http::transport(url, e))?;
    check_status(url, status)?;
    let content_type = easy
        .content_type()
        .map_err(|e| crate::http::transport(url, e))?
        .map(str::to_string);

    let text = decode_body(url, content_type.as_deref(), &body);
    let document = Html::parse_document(&text);
    if !document.errors.is_empty() {
        tracing::debug!(url, recovered = document.errors.len(), "HTML parser recovered from markup errors");
    }
    tracing::debug!(url, bytes = body.len(), "fetched page");

    Ok(Page {
        url: url.to_string(),
        document,
    })
}

fn collect_body(
    easy: &mut curl::easy::Easy,
    body: &mut Vec<u8>,
    http: &HttpOptions,
) -> std::result::Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.write_function(|data| {
        body.extend_from_slice(data);
        Ok(data.len())
    })?;
    transfer.progress_function(|_, _, _, _| !http.interrupt.is_raised())?;
    transfer.perform()
}

/// Decode a page body to text. Never fails: undecodable bytes become U+FFFD.
pub(crate) fn decode_body(url: &str, content_type: Option<&str>, body: &[u8]) -> String {
    let declared = content_type
        .and_then(charset_param)
        .or_else(|| meta_charset(&body[..body.len().min(META_SNIFF_LEN)]))
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    let encoding = match declared {
        Some(encoding) => encoding,
        None if std::str::from_utf8(body).is_ok() => UTF_8,
        None => {
            tracing::debug!(url, "page is not UTF-8 and declares no charset; using windows-1252");
            WINDOWS_1252
        }
    };

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(url, encoding = used.name(), "page contains bytes invalid for its charset");
    }
    text.into_owned()
}

/// `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Charset named by a `<meta charset=...>` or `<meta http-equiv ... content="...; charset=...">`
/// in the head of the document.
fn meta_charset(head: &[u8]) -> Option<String> {
    let lower = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = lower.as_str();
    while let Some(pos) = rest.find("<meta") {
        rest = &rest[pos + 5..];
        let tag = rest.split('>').next().unwrap_or("");
        if let Some(idx) = tag.find("charset=") {
            let value: String = tag[idx + 8..]
                .trim_start_matches(|c| c == '"' || c == '\'')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}
