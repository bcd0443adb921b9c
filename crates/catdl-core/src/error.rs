//! Error taxonomy for the resolve-download pipeline.
//!
//! Every failure inside the per-item path is a `CatalogError`. The retry
//! coordinator consults `is_retryable` to decide whether another attempt is
//! worth making.

use std::path::PathBuf;
use thiserror::Error;

/// Network-level failure while fetching a page or a file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl reported an error (timeout, connection refused, DNS, stalled transfer).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// Response completed with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u32 },
}

/// Response metadata needed to name and verify a download is missing or unusable.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("response has no {0} header")]
    MissingHeader(&'static str),
    #[error("Content-Length {0:?} is not a byte count")]
    InvalidLength(String),
    #[error("cannot extract file name from Content-Disposition {0:?}")]
    NoFileName(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Expected markup is absent: the catalog layout changed or the item was removed.
    #[error("unexpected page structure: {0}")]
    Structure(String),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Transfer ended with a byte count different from the declared length.
    #[error("invalid downloaded file size: expected {expected} bytes, got {received}")]
    Integrity { expected: u64, received: u64 },

    #[error("gave up after {attempts} attempt(s): {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<CatalogError>,
    },

    #[error("interrupted by operator")]
    Interrupted,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Interrupts and structural misses are final; exhaustion is already the
    /// end of a retry loop. Everything else (network, headers, short
    /// transfers, local I/O) is treated as transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            CatalogError::Interrupted
                | CatalogError::Structure(_)
                | CatalogError::RetryExhausted { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
