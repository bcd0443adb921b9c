//! CLI command handlers. Each command is in its own file.

mod config_path;
mod fetch;
mod latest;
mod run;

pub use config_path::run_config_path;
pub use fetch::run_fetch;
pub use latest::run_latest;
pub use run::run_enumeration;

use anyhow::Result;
use catdl_core::catalog::CatalogResolver;
use catdl_core::config::CatalogConfig;
use catdl_core::downloader::HttpDownloader;
use catdl_core::enumerate::{DriverOptions, Enumerator};
use catdl_core::http::HttpOptions;
use catdl_core::interrupt::InterruptFlag;

/// Wire the network-backed resolver and downloader into an enumerator.
fn build_enumerator(
    cfg: &CatalogConfig,
    interrupt: InterruptFlag,
) -> Result<Enumerator<CatalogResolver, HttpDownloader>> {
    let http = HttpOptions::from_config(cfg, interrupt.clone());
    let catalog = CatalogResolver::new(cfg, http.clone())?;
    Ok(Enumerator::new(
        catalog,
        HttpDownloader::new(http),
        DriverOptions::from_config(cfg),
        interrupt,
    ))
}
