use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Longest backoff delay a config may ask for (one day).
const MAX_BACKOFF_SECS: u64 = 24 * 60 * 60;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per item (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Add uniform random jitter on top of each backoff delay.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_secs: 0.5,
            max_delay_secs: 60,
            jitter: true,
        }
    }
}

/// Where to find things on catalog pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// CSS selector for the most recent item link on the catalog root page.
    pub latest_item_selector: String,
    /// Text of the table cell that labels the download link on an item page.
    pub download_label: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            latest_item_selector: "html > body > table > tbody > tr:nth-of-type(3) > td > table > tbody > tr:nth-of-type(1) > td:nth-of-type(2) > a[href]".to_string(),
            download_label: "Download:".to_string(),
        }
    }
}

/// What the enumeration does when an item runs out of retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Stop the whole run.
    #[default]
    Abort,
    /// Record the item as failed and move on to the next id.
    Skip,
}

/// Global configuration loaded from `~/.config/catdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog origin, e.g. `http://www.it-ebooks.info`.
    pub base_url: String,
    /// Root output directory; each item gets `root_dir/<id>/`.
    pub root_dir: PathBuf,
    /// Connect and stall timeout applied to every request, in seconds.
    pub timeout_secs: u64,
    /// Optional User-Agent header (None = libcurl default).
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub on_exhausted: ExhaustionPolicy,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.it-ebooks.info".to_string(),
            root_dir: PathBuf::from("ebooks"),
            timeout_secs: 10,
            user_agent: None,
            on_exhausted: ExhaustionPolicy::Abort,
            retry: RetryConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Per-request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash, so `base + "/book/1"` never doubles it.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::try_from_secs_f64(self.retry.base_delay_secs.max(0.0))
                .unwrap_or(Duration::MAX)
                .min(Duration::from_secs(MAX_BACKOFF_SECS)),
            max_delay: Duration::from_secs(self.retry.max_delay_secs.min(MAX_BACKOFF_SECS)),
            jitter: self.retry.jitter,
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .with_context(|| format!("base_url {:?} is not a valid URL", self.base_url))?;
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        let base_delay = Duration::try_from_secs_f64(self.retry.base_delay_secs).map_err(|_| {
            anyhow::anyhow!(
                "retry.base_delay_secs {} must be a non-negative number of seconds",
                self.retry.base_delay_secs
            )
        })?;
        if base_delay > Duration::from_secs(MAX_BACKOFF_SECS) {
            anyhow::bail!("retry.base_delay_secs must be at most {}", MAX_BACKOFF_SECS);
        }
        if self.retry.max_delay_secs > MAX_BACKOFF_SECS {
            anyhow::bail!("retry.max_delay_secs must be at most {}", MAX_BACKOFF_SECS);
        }
        if self.layout.download_label.trim().is_empty() {
            anyhow::bail!("layout.download_label must not be empty");
        }
        scraper::Selector::parse(&self.layout.latest_item_selector).map_err(|e| {
            anyhow::anyhow!(
                "layout.latest_item_selector {:?} is not a valid selector: {:?}",
                self.layout.latest_item_selector,
                e
            )
        })?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("catdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CatalogConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like `load_or_init` but for an explicit path (e.g. `--config`).
pub fn load_or_init_at(path: &Path) -> Result<CatalogConfig> {
    if !path.exists() {
        let default_cfg = CatalogConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config to {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: CatalogConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
