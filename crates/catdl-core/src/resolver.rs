//! Interfaces between the enumeration driver and its collaborators.
//!
//! The driver only depends on these traits; `catalog::CatalogResolver` and
//! `downloader::HttpDownloader` are the network-backed implementations.

use crate::downloader::{DownloadReport, FileMetadata};
use crate::error::Result;
use std::path::Path;

/// Sequential identifier of a catalog entry.
pub type ItemId = u64;

/// Where to download an item from, and the page that links to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub url: String,
    /// Item page URL, sent as `Referer` (the origin refuses downloads without it).
    pub referer: String,
}

/// Catalog lookups: bounds, existence, and download resolution.
pub trait Catalog {
    /// Highest identifier currently listed by the catalog.
    fn discover_max_id(&self) -> Result<ItemId>;

    /// Canonical page URL for `id`.
    fn item_url(&self, id: ItemId) -> String;

    /// Whether the item page carries a download link. Absence is `Ok(false)`.
    fn item_exists(&self, id: ItemId) -> Result<bool>;

    /// Resolve the download link of `id`; `Structure` if it has none.
    fn resolve_download(&self, id: ItemId) -> Result<DownloadDescriptor>;
}

/// Streams a resolved download into a directory.
pub trait Downloader {
    /// `on_start` is called once the response metadata is known, before any
    /// body bytes are written.
    fn download(
        &self,
        descriptor: &DownloadDescriptor,
        destination_dir: &Path,
        on_start: &mut dyn FnMut(&FileMetadata),
    ) -> Result<DownloadReport>;
}
