//! `catdl latest` – print the newest item id.

use anyhow::{Context, Result};
use catdl_core::config::CatalogConfig;
use catdl_core::interrupt::InterruptFlag;
use catdl_core::Catalog;

use super::build_enumerator;

pub fn run_latest(cfg: &CatalogConfig, interrupt: InterruptFlag) -> Result<()> {
    let enumerator = build_enumerator(cfg, interrupt)?;
    let max_id = enumerator
        .catalog()
        .discover_max_id()
        .with_context(|| format!("cannot find the newest item on {}", cfg.base_url))?;
    println!("{}", max_id);
    Ok(())
}
