//! Parse HTTP response header lines into a `ResponseHead`.

/// Headers of the final response in a (possibly redirected) exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// Status code from the last status line seen.
    pub status: Option<u32>,
    /// Raw `Content-Length` value, unparsed.
    pub content_length: Option<String>,
    /// Raw `Content-Disposition` value.
    pub content_disposition: Option<String>,
}

/// Parse collected header lines into a `ResponseHead`.
///
/// libcurl hands over the headers of every response when following
/// redirects; a status line starts a new block and discards what came before.
pub fn parse_response_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead {
                status: line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|code| code.parse::<u32>().ok()),
                ..ResponseHead::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                head.content_length = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-disposition") {
                head.content_disposition = Some(value.to_string());
            }
        }
    }

    head
}
