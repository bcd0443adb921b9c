//! CLI for the catdl catalog downloader.

mod commands;
mod console;
mod prompt;

use anyhow::Result;
use catdl_core::config::{self, CatalogConfig, ExhaustionPolicy};
use catdl_core::interrupt::InterruptFlag;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commands::{run_config_path, run_enumeration, run_fetch, run_latest};

/// Top-level CLI for catdl.
#[derive(Debug, Parser)]
#[command(name = "catdl")]
#[command(about = "catdl: download every item of a sequentially numbered catalog", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Flags that override values from config.toml.
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Config file to use instead of ~/.config/catdl/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Catalog origin, e.g. http://www.it-ebooks.info
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory that receives one sub-directory per item.
    #[arg(long, global = true, value_name = "DIR")]
    pub root_dir: Option<PathBuf>,

    /// Connect/stall timeout per request, in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Attempts per item before giving up (including the first).
    #[arg(long, global = true, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// What to do when an item runs out of attempts.
    #[arg(long, global = true, value_enum, value_name = "POLICY")]
    pub on_exhausted: Option<OnExhausted>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnExhausted {
    /// Stop the whole run.
    Abort,
    /// Report the item as failed and continue with the next id.
    Skip,
}

impl From<OnExhausted> for ExhaustionPolicy {
    fn from(value: OnExhausted) -> Self {
        match value {
            OnExhausted::Abort => ExhaustionPolicy::Abort,
            OnExhausted::Skip => ExhaustionPolicy::Skip,
        }
    }
}

impl ConfigOverrides {
    /// Load the config file (creating a default one if needed) and apply the flags.
    pub fn load(&self) -> Result<CatalogConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut CatalogConfig) {
        if let Some(url) = &self.base_url {
            cfg.base_url = url.clone();
        }
        if let Some(dir) = &self.root_dir {
            cfg.root_dir = dir.clone();
        }
        if let Some(secs) = self.timeout_secs {
            cfg.timeout_secs = secs;
        }
        if let Some(n) = self.max_attempts {
            cfg.retry.max_attempts = n;
        }
        if let Some(policy) = self.on_exhausted {
            cfg.on_exhausted = policy.into();
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every item from a starting id through the newest one.
    Run {
        /// First item id; prompted for when omitted.
        #[arg(long)]
        start: Option<u64>,
        /// Last item id (default: newest id on the catalog).
        #[arg(long)]
        end: Option<u64>,
    },

    /// Print the newest item id listed by the catalog.
    Latest,

    /// Download a single item by id.
    Fetch {
        /// Item identifier.
        id: u64,
    },

    /// Print the default config file path.
    ConfigPath,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::ConfigPath = cli.command {
            return run_config_path();
        }

        let cfg = cli.overrides.load()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let interrupt = InterruptFlag::new();

        match cli.command {
            CliCommand::Run { start, end } => run_enumeration(&cfg, interrupt, start, end)?,
            CliCommand::Latest => run_latest(&cfg, interrupt)?,
            CliCommand::Fetch { id } => run_fetch(&cfg, interrupt, id)?,
            CliCommand::ConfigPath => run_config_path()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
