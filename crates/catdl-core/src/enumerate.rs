//! Enumeration driver: walk item ids in order and fetch each one.
//!
//! Per id: provision `root_dir/<id>/`, check that the item has a download
//! link, then resolve and download it under the retry policy. Items without a
//! link are skipped. What happens when an item exhausts its retries is decided
//! by `ExhaustionPolicy`. Strictly sequential; nothing persists between runs.

use crate::config::{CatalogConfig, ExhaustionPolicy};
use crate::downloader::{DownloadReport, FileMetadata};
use crate::error::{CatalogError, Result};
use crate::interrupt::InterruptFlag;
use crate::resolver::{Catalog, Downloader, ItemId};
use crate::retry::{run_with_retry, RetryPolicy};
use std::fs;
use std::path::{Path, PathBuf};

/// Final state of one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Done(DownloadReport),
    /// No download link (never existed, or removed before it could be resolved).
    Skipped,
}

/// Progress notifications, in the order they happen for an item.
#[derive(Debug)]
pub enum ItemEvent<'e> {
    /// The item page has no download link.
    Missing { id: ItemId },
    /// Response metadata is known and the body is about to be written.
    /// Sent once per download attempt.
    Started {
        id: ItemId,
        metadata: &'e FileMetadata,
    },
    Done {
        id: ItemId,
        report: &'e DownloadReport,
    },
    /// The link disappeared between the existence check and resolution.
    Vanished { id: ItemId },
    /// The item exhausted its retries and the run continues.
    Failed {
        id: ItemId,
        error: &'e CatalogError,
    },
}

/// Counts for a finished enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationSummary {
    pub start: ItemId,
    /// Last id visited (inclusive); `None` when the range was empty.
    pub end: Option<ItemId>,
    pub done: u64,
    pub skipped: u64,
    pub failed: Vec<ItemId>,
    pub bytes: u64,
}

/// Settings the driver needs from the configuration.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub root_dir: PathBuf,
    pub retry: RetryPolicy,
    pub on_exhausted: ExhaustionPolicy,
}

impl DriverOptions {
    pub fn from_config(cfg: &CatalogConfig) -> Self {
        Self {
            root_dir: cfg.root_dir.clone(),
            retry: cfg.retry_policy(),
            on_exhausted: cfg.on_exhausted,
        }
    }
}

pub struct Enumerator<C, D> {
    catalog: C,
    downloader: D,
    options: DriverOptions,
    interrupt: InterruptFlag,
}

impl<C: Catalog, D: Downloader> Enumerator<C, D> {
    pub fn new(catalog: C, downloader: D, options: DriverOptions, interrupt: InterruptFlag) -> Self {
        Self {
            catalog,
            downloader,
            options,
            interrupt,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Directory that holds the files of `id`.
    pub fn item_dir(&self, id: ItemId) -> PathBuf {
        self.options.root_dir.join(id.to_string())
    }

    /// Process every id from `start` through the catalog's highest id.
    ///
    /// `end`, when given, lowers the upper bound. Failing to discover the
    /// highest id is fatal, as is an interrupt or, under
    /// `ExhaustionPolicy::Abort`, any item that runs out of retries.
    pub fn run(
        &self,
        start: ItemId,
        end: Option<ItemId>,
        report: &mut dyn FnMut(ItemEvent<'_>),
    ) -> Result<EnumerationSummary> {
        let max_id = self.catalog.discover_max_id()?;
        let last = end.map_or(max_id, |end| end.min(max_id));
        let mut summary = EnumerationSummary {
            start,
            ..EnumerationSummary::default()
        };
        if start > last {
            tracing::warn!(start, last, "start id is past the last catalog id; nothing to do");
            return Ok(summary);
        }
        tracing::info!(start, last, max_id, "enumerating catalog");

        for id in start..=last {
            match self.process_item(id, report) {
                Ok(ItemOutcome::Done(r)) => {
                    summary.done += 1;
                    summary.bytes += r.bytes;
                }
                Ok(ItemOutcome::Skipped) => summary.skipped += 1,
                Err(e @ CatalogError::RetryExhausted { .. })
                    if self.options.on_exhausted == ExhaustionPolicy::Skip =>
                {
                    tracing::warn!(id, error = %e, "giving up on item, continuing");
                    report(ItemEvent::Failed { id, error: &e });
                    summary.failed.push(id);
                }
                Err(e) => {
                    tracing::error!(id, error = %e, "enumeration aborted");
                    return Err(e);
                }
            }
            summary.end = Some(id);
        }

        tracing::info!(
            done = summary.done,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            bytes = summary.bytes,
            "enumeration finished"
        );
        Ok(summary)
    }

    /// Check, resolve and download a single item.
    ///
    /// Returns `Err(RetryExhausted)` when attempts run out; the caller decides
    /// whether that ends the run.
    pub fn process_item(
        &self,
        id: ItemId,
        report: &mut dyn FnMut(ItemEvent<'_>),
    ) -> Result<ItemOutcome> {
        let dir = self.item_dir(id);
        provision_dir(&dir)?;

        let policy = &self.options.retry;
        let exists = run_with_retry(policy, &self.interrupt, || self.catalog.item_exists(id))?;
        if !exists {
            tracing::debug!(id, "no download link; skipping");
            report(ItemEvent::Missing { id });
            return Ok(ItemOutcome::Skipped);
        }

        let downloaded = run_with_retry(policy, &self.interrupt, || {
            let descriptor = self.catalog.resolve_download(id)?;
            self.downloader.download(&descriptor, &dir, &mut |metadata| {
                report(ItemEvent::Started { id, metadata })
            })
        });

        match downloaded {
            Ok(r) => {
                report(ItemEvent::Done { id, report: &r });
                Ok(ItemOutcome::Done(r))
            }
            Err(CatalogError::Structure(reason)) => {
                tracing::warn!(id, reason = %reason, "download link vanished; skipping");
                report(ItemEvent::Vanished { id });
                Ok(ItemOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }
}

/// Idempotent `mkdir -p` for an item directory.
fn provision_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| CatalogError::io(dir, e))
}
