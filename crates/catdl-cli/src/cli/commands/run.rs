//! `catdl run` – enumerate and download items from a start id.

use anyhow::{Context, Result};
use catdl_core::config::CatalogConfig;
use catdl_core::interrupt::InterruptFlag;
use std::io;

use super::build_enumerator;
use crate::cli::console::ConsoleReporter;
use crate::cli::prompt::prompt_start_id;

pub fn run_enumeration(
    cfg: &CatalogConfig,
    interrupt: InterruptFlag,
    start: Option<u64>,
    end: Option<u64>,
) -> Result<()> {
    let start = match start {
        Some(id) => id,
        None => match prompt_start_id(&mut io::stdin().lock(), &mut io::stdout()) {
            Ok(id) => id,
            Err(e) => {
                println!("{}", e);
                std::process::exit(1);
            }
        },
    };

    let enumerator = build_enumerator(cfg, interrupt)?;
    std::fs::create_dir_all(&cfg.root_dir)
        .with_context(|| format!("cannot create {}", cfg.root_dir.display()))?;

    let mut console = ConsoleReporter::new(io::stdout());
    let result = enumerator.run(start, end, &mut |event| console.handle(event));
    console.finish();
    let summary = result.with_context(|| format!("run starting at item {} stopped", start))?;
    console.summary(&summary);
    Ok(())
}
