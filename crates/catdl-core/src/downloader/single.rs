//! Single-stream HTTP GET into a named file, with length verification.
//!
//! The file name and expected size come from the response headers, so the
//! file is only created once the first body bytes (or the end of an empty
//! body) arrive. It is always opened in truncate mode: a retry overwrites
//! whatever a failed attempt left behind.

use super::{DownloadReport, FileMetadata};
use crate::error::{CatalogError, MetadataError, Result};
use crate::http::{check_status, parse_response_head, HttpOptions};
use crate::resolver::DownloadDescriptor;
use crate::url_model::derive_file_name;
use std::cell::RefCell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str;
use std::time::Instant;

/// Extract length and file name from the final response's headers.
pub(crate) fn metadata_from_headers(url: &str, lines: &[String]) -> Result<FileMetadata> {
    let head = parse_response_head(lines);
    if let Some(status) = head.status {
        check_status(url, status)?;
    }
    let disposition = head
        .content_disposition
        .ok_or(MetadataError::MissingHeader("Content-Disposition"))?;
    let length = head
        .content_length
        .ok_or(MetadataError::MissingHeader("Content-Length"))?;
    let content_length = length
        .trim()
        .parse::<u64>()
        .map_err(|_| MetadataError::InvalidLength(length.clone()))?;
    let file_name = derive_file_name(&disposition)
        .ok_or_else(|| MetadataError::NoFileName(disposition.clone()))?;
    Ok(FileMetadata {
        content_length,
        content_disposition: disposition,
        file_name,
    })
}

/// Transfer state shared by the header and write callbacks.
struct Sink<'a, 'f> {
    url: &'a str,
    destination_dir: &'a Path,
    on_start: &'f mut (dyn FnMut(&FileMetadata) + 'f),
    headers: Vec<String>,
    open: Option<OpenFile>,
    /// First failure raised inside a callback; the transfer is aborted with it.
    error: Option<CatalogError>,
}

struct OpenFile {
    file: File,
    path: PathBuf,
    metadata: FileMetadata,
    written: u64,
    started: Instant,
}

impl Sink<'_, '_> {
    fn ensure_open(&mut self) -> Result<&mut OpenFile> {
        let open = match self.open.take() {
            Some(open) => open,
            None => self.create()?,
        };
        Ok(self.open.insert(open))
    }

    fn create(&mut self) -> Result<OpenFile> {
        let metadata = metadata_from_headers(self.url, &self.headers)?;
        let path = self.destination_dir.join(&metadata.file_name);
        (self.on_start)(&metadata);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| CatalogError::io(&path, e))?;
        tracing::debug!(path = %path.display(), expected = metadata.content_length, "writing download");
        Ok(OpenFile {
            file,
            path,
            metadata,
            written: 0,
            started: Instant::now(),
        })
    }

    fn accept(&mut self, data: &[u8]) -> Result<()> {
        let open = self.ensure_open()?;
        open.file
            .write_all(data)
            .map_err(|e| CatalogError::io(&open.path, e))?;
        open.written += data.len() as u64;
        Ok(())
    }
}

/// Downloads `descriptor.url` into `destination_dir`, sending the referer.
///
/// Fails with `Integrity` when the stream ends short of (or beyond) the
/// declared `Content-Length`. Partial files are left on disk.
pub fn download_single(
    descriptor: &DownloadDescriptor,
    destination_dir: &Path,
    http: &HttpOptions,
    on_start: &mut dyn FnMut(&FileMetadata),
) -> Result<DownloadReport> {
    let url = descriptor.url.as_str();
    let mut easy = http.easy(url)?;
    easy.referer(&descriptor.referer)
        .map_err(|e| crate::http::transport(url, e))?;

    let sink = RefCell::new(Sink {
        url,
        destination_dir,
        on_start,
        headers: Vec::new(),
        open: None,
        error: None,
    });

    let performed = stream_into(&mut easy, &sink, http);
    let mut sink = sink.into_inner();

    if let Some(err) = sink.error.take() {
        return Err(err);
    }
    match performed {
        // libcurl reports a body shorter than Content-Length as a partial file;
        // that is an integrity failure, not a transport one.
        Err(e) if e.is_partial_file() && sink.open.is_some() && !http.interrupt.is_raised() => {}
        other => http.finish(url, other)?,
    }

    let open = sink.ensure_open()?;
    open.file
        .flush()
        .map_err(|e| CatalogError::io(&open.path, e))?;
    let elapsed = open.started.elapsed();

    let expected = open.metadata.content_length;
    if open.written != expected {
        return Err(CatalogError::Integrity {
            expected,
            received: open.written,
        });
    }

    let report = DownloadReport {
        path: open.path.clone(),
        file_name: open.metadata.file_name.clone(),
        bytes: open.written,
        elapsed,
    };
    let stats = report.stats();
    tracing::info!(
        path = %report.path.display(),
        bytes = report.bytes,
        elapsed_ms = elapsed.as_millis() as u64,
        bytes_per_sec = stats.bytes_per_sec(),
        "download complete"
    );
    Ok(report)
}

fn stream_into(
    easy: &mut curl::easy::Easy,
    sink: &RefCell<Sink<'_, '_>>,
    http: &HttpOptions,
) -> std::result::Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.header_function(|data| {
        if let Ok(s) = str::from_utf8(data) {
            sink.borrow_mut().headers.push(s.trim_end().to_string());
        }
        true
    })?;
    transfer.write_function(|data| {
        let mut sink = sink.borrow_mut();
        match sink.accept(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                sink.error = Some(e);
                Ok(0) // abort transfer
            }
        }
    })?;
    transfer.progress_function(|_, _, _, _| !http.interrupt.is_raised())?;
    transfer.perform()
}
