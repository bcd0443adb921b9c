//! libcurl plumbing shared by the page fetcher and the download executor.
//!
//! Every handle gets the same connect and stall timeouts and the same
//! interrupt hook, so no request can hang on a silent peer or outlive Ctrl-C.

mod headers;

pub use headers::{parse_response_head, ResponseHead};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, FetchError, Result};
use crate::interrupt::InterruptFlag;
use std::time::Duration;

/// Per-request settings threaded into every handle.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Connect timeout, and the window after which a transfer that made no
    /// progress is aborted.
    pub timeout: Duration,
    pub user_agent: Option<String>,
    /// libcurl receive buffer size; body data arrives in chunks of at most this.
    pub buffer_size: usize,
    pub interrupt: InterruptFlag,
}

/// Chunk size for streamed downloads.
pub const CHUNK_SIZE: usize = 8192;

impl HttpOptions {
    pub fn from_config(cfg: &CatalogConfig, interrupt: InterruptFlag) -> Self {
        Self {
            timeout: cfg.timeout(),
            user_agent: cfg.user_agent.clone(),
            buffer_size: CHUNK_SIZE,
            interrupt,
        }
    }

    /// A GET handle for `url` with timeouts, redirects and progress callbacks enabled.
    pub(crate) fn easy(&self, url: &str) -> Result<curl::easy::Easy> {
        let mut easy = curl::easy::Easy::new();
        let setup = |easy: &mut curl::easy::Easy| -> std::result::Result<(), curl::Error> {
            easy.url(url)?;
            easy.get(true)?;
            easy.follow_location(true)?;
            easy.max_redirections(10)?;
            easy.connect_timeout(self.timeout)?;
            // Stall detection: abort if under 1 byte/s for the whole window.
            easy.low_speed_limit(1)?;
            easy.low_speed_time(self.timeout)?;
            easy.buffer_size(self.buffer_size)?;
            easy.progress(true)?;
            if let Some(ua) = &self.user_agent {
                easy.useragent(ua)?;
            }
            Ok(())
        };
        setup(&mut easy).map_err(|e| transport(url, e))?;
        Ok(easy)
    }

    /// Maps the outcome of `perform()`; aborts caused by Ctrl-C become `Interrupted`.
    pub(crate) fn finish(&self, url: &str, performed: std::result::Result<(), curl::Error>) -> Result<()> {
        if self.interrupt.is_raised() {
            return Err(CatalogError::Interrupted);
        }
        performed.map_err(|e| transport(url, e))
    }
}

pub(crate) fn transport(url: &str, source: curl::Error) -> CatalogError {
    CatalogError::Fetch(FetchError::Transport {
        url: url.to_string(),
        source,
    })
}

pub(crate) fn check_status(url: &str, status: u32) -> Result<()> {
    if !(200..300).contains(&status) {
        return Err(CatalogError::Fetch(FetchError::Status {
            url: url.to_string(),
            status,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let mut cfg = CatalogConfig::default();
        cfg.timeout_secs = 7;
        cfg.user_agent = Some("catdl-test".to_string());
        let opts = HttpOptions::from_config(&cfg, InterruptFlag::new());
        assert_eq!(opts.timeout, Duration::from_secs(7));
        assert_eq!(opts.user_agent.as_deref(), Some("catdl-test"));
        assert_eq!(opts.buffer_size, CHUNK_SIZE);
    }

    #[test]
    fn non_2xx_status_is_fetch_error() {
        assert!(check_status("http://x/", 200).is_ok());
        assert!(check_status("http://x/", 204).is_ok());
        let err = check_status("http://x/", 404).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Fetch(FetchError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn finish_prefers_interrupt() {
        let interrupt = InterruptFlag::new();
        let opts = HttpOptions::from_config(&CatalogConfig::default(), interrupt.clone());
        assert!(opts.finish("http://x/", Ok(())).is_ok());
        interrupt.raise();
        assert!(matches!(
            opts.finish("http://x/", Ok(())),
            Err(CatalogError::Interrupted)
        ));
    }
}
