//! Minimal HTTP/1.1 catalog server for integration tests.
//!
//! Serves a root page linking the newest item, one page per item (with or
//! without a "Download:" row), and the download files themselves. Downloads
//! require the item page as `Referer`. Every request is logged so tests can
//! assert which URLs were hit.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct ItemFixture {
    /// Whether the item page carries a download link.
    pub has_link: bool,
    /// Raw `Content-Disposition` value sent with the file.
    pub content_disposition: String,
    pub body: Vec<u8>,
    /// Bytes actually sent before closing (None = whole body).
    pub truncate_to: Option<usize>,
    /// Answer the first N download requests with 503.
    pub failures_before_success: u32,
    /// Serve the item page in ISO-8859-1 with a non-ASCII publisher name.
    pub latin1_page: bool,
}

impl ItemFixture {
    pub fn file(name: &str, body: Vec<u8>) -> Self {
        Self {
            has_link: true,
            content_disposition: format!("attachment; filename=\"{}\"", name),
            body,
            truncate_to: None,
            failures_before_success: 0,
            latin1_page: false,
        }
    }

    pub fn without_link() -> Self {
        Self {
            has_link: false,
            content_disposition: String::new(),
            body: Vec::new(),
            truncate_to: None,
            failures_before_success: 0,
            latin1_page: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub path: String,
    pub referer: Option<String>,
}

#[derive(Default)]
struct State {
    /// None = root page without the latest-item link.
    max_id: Option<u64>,
    items: HashMap<u64, ItemFixture>,
    download_attempts: HashMap<u64, u32>,
    log: Vec<LoggedRequest>,
}

pub struct CatalogServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl CatalogServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start(max_id: Option<u64>, items: HashMap<u64, ItemFixture>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);
        let state = Arc::new(Mutex::new(State {
            max_id,
            items,
            ..State::default()
        }));
        let shared = Arc::clone(&state);
        let base = base_url.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                let base = base.clone();
                thread::spawn(move || handle(stream, &state, &base));
            }
        });
        Self { base_url, state }
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.state.lock().unwrap().log.clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }
}

/// Starts a TCP listener that accepts connections and never answers.
pub fn start_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, state: &Mutex<State>, base: &str) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (path, referer) = parse_request(request);
    state.lock().unwrap().log.push(LoggedRequest {
        path: path.clone(),
        referer: referer.clone(),
    });

    if path == "/" {
        let max_id = state.lock().unwrap().max_id;
        let _ = write_html(&mut stream, 200, &root_page(max_id));
        return;
    }
    if let Some(id) = id_after(&path, "/book/") {
        let item = state.lock().unwrap().items.get(&id).cloned();
        let href = format!("/dl/{}", id);
        let link = item.as_ref().filter(|i| i.has_link).map(|_| href.as_str());
        let page = item_page(link);
        if item.is_some_and(|i| i.latin1_page) {
            let page = page.replace("Test Press", "\u{e9}ditions Test");
            let bytes: Vec<u8> = page.chars().map(|c| c as u8).collect();
            let _ = write_response(&mut stream, 200, "text/html; charset=iso-8859-1", &bytes);
        } else {
            let _ = write_html(&mut stream, 200, &page);
        }
        return;
    }
    if let Some(id) = id_after(&path, "/dl/") {
        let (item, attempt) = {
            let mut st = state.lock().unwrap();
            let attempt = {
                let n = st.download_attempts.entry(id).or_insert(0);
                *n += 1;
                *n
            };
            (st.items.get(&id).cloned(), attempt)
        };
        let Some(item) = item else {
            let _ = write_html(&mut stream, 404, "not found");
            return;
        };
        if referer.as_deref() != Some(format!("{}/book/{}", base, id).as_str()) {
            let _ = write_html(&mut stream, 403, "referer required");
            return;
        }
        if attempt <= item.failures_before_success {
            let _ = write_html(&mut stream, 503, "busy");
            return;
        }
        let sent = item.truncate_to.unwrap_or(item.body.len()).min(item.body.len());
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nContent-Disposition: {}\r\nConnection: close\r\n\r\n",
            item.body.len(),
            item.content_disposition
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&item.body[..sent]);
        let _ = stream.flush();
        return;
    }
    let _ = write_html(&mut stream, 404, "not found");
}

fn write_html(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    write_response(stream, status, "text/html; charset=utf-8", body.as_bytes())
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> std::io::Result<()> {
    let reason = match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        content_type,
        body.len()
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()
}

fn root_page(max_id: Option<u64>) -> String {
    let newest = match max_id {
        Some(id) => format!(r#"<a href="/book/{}/">Newest</a>"#, id),
        None => "Newest".to_string(),
    };
    format!(
        r#"<html><body><table>
<tr><td>header</td></tr>
<tr><td>menu</td></tr>
<tr><td><table>
<tr><td><img src="/c.png"></td><td>{}</td></tr>
<tr><td><img src="/d.png"></td><td><a href="/book/1/">Oldest</a></td></tr>
</table></td></tr>
</table></body></html>"#,
        newest
    )
}

fn item_page(download_href: Option<&str>) -> String {
    let row = match download_href {
        Some(href) => format!(r#"<tr><td>Download:</td><td><a href="{}">file</a></td></tr>"#, href),
        None => String::new(),
    };
    format!(
        r#"<html><body><table><tr><td><div><table><tr><td><table>
<tr><td>Publisher:</td><td><a href="/publisher/1/">Test Press</a></td></tr>
{}
</table></td></tr></table></div></td></tr></table></body></html>"#,
        row
    )
}

fn id_after(path: &str, prefix: &str) -> Option<u64> {
    path.strip_prefix(prefix)?.trim_end_matches('/').parse().ok()
}

/// Returns (path, Referer header).
fn parse_request(request: &str) -> (String, Option<String>) {
    let mut path = String::new();
    let mut referer = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if path.is_empty() {
            path = line.split_whitespace().nth(1).unwrap_or("").to_string();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("referer") {
                referer = Some(value.trim().to_string());
            }
        }
    }
    (path, referer)
}
