//! `catdl fetch <id>` – check, resolve and download one item.

use anyhow::{Context, Result};
use catdl_core::config::CatalogConfig;
use catdl_core::enumerate::ItemOutcome;
use catdl_core::interrupt::InterruptFlag;
use std::io;

use super::build_enumerator;
use crate::cli::console::ConsoleReporter;

pub fn run_fetch(cfg: &CatalogConfig, interrupt: InterruptFlag, id: u64) -> Result<()> {
    let enumerator = build_enumerator(cfg, interrupt)?;
    let mut console = ConsoleReporter::new(io::stdout());
    let outcome = enumerator.process_item(id, &mut |event| console.handle(event));
    console.finish();
    if let ItemOutcome::Done(report) = outcome.with_context(|| format!("item {}", id))? {
        tracing::info!(id, path = %report.path.display(), "fetched single item");
    }
    Ok(())
}
