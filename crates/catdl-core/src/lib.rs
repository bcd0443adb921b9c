pub mod config;
pub mod logging;

pub mod catalog;
pub mod downloader;
pub mod enumerate;
pub mod error;
pub mod fetch_page;
pub mod http;
pub mod interrupt;
pub mod progress;
pub mod resolver;
pub mod retry;
pub mod url_model;

pub use error::{CatalogError, FetchError, MetadataError};
pub use resolver::{Catalog, DownloadDescriptor, Downloader, ItemId};
