//! Download executor.
//!
//! Consumes a resolved `DownloadDescriptor`, performs one streamed GET with
//! the item page as referer, names the file from `Content-Disposition`, and
//! verifies the byte count against `Content-Length`. Retrying is the caller's
//! business (see `retry`).

mod single;

pub use single::download_single;

use crate::error::Result;
use crate::http::HttpOptions;
use crate::progress::TransferStats;
use crate::resolver::{DownloadDescriptor, Downloader};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the response headers say about the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Declared size in bytes.
    pub content_length: u64,
    /// Raw `Content-Disposition` value the name was taken from.
    pub content_disposition: String,
    /// Unescaped, sanitized name used on disk.
    pub file_name: String,
}

/// A completed download of verified size.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: u64,
    /// Wall-clock time from first byte to end of stream.
    pub elapsed: Duration,
}

impl DownloadReport {
    pub fn stats(&self) -> TransferStats {
        TransferStats {
            bytes: self.bytes,
            elapsed: self.elapsed,
        }
    }
}

/// libcurl-backed `Downloader`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    http: HttpOptions,
}

impl HttpDownloader {
    pub fn new(http: HttpOptions) -> Self {
        Self { http }
    }
}

impl Downloader for HttpDownloader {
    fn download(
        &self,
        descriptor: &DownloadDescriptor,
        destination_dir: &Path,
        on_start: &mut dyn FnMut(&FileMetadata),
    ) -> Result<DownloadReport> {
        download_single(descriptor, destination_dir, &self.http, on_start)
    }
}
