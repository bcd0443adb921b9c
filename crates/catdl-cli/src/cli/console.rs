//! Human-readable progress lines on stdout.

use catdl_core::enumerate::{EnumerationSummary, ItemEvent};
use catdl_core::progress::format_size;
use std::io::Write;

/// Turns driver events into progress lines.
///
/// `Started` leaves a `Downloading... ` line open; the next event closes it
/// with `OK`, or with `failed` when a new attempt or a failure follows.
pub struct ConsoleReporter<W: Write> {
    out: W,
    pending: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pending: false,
        }
    }

    pub fn handle(&mut self, event: ItemEvent<'_>) {
        let _ = self.write_event(event);
    }

    fn close_pending(&mut self) -> std::io::Result<()> {
        if self.pending {
            self.pending = false;
            writeln!(self.out, "failed.")?;
        }
        Ok(())
    }

    fn write_event(&mut self, event: ItemEvent<'_>) -> std::io::Result<()> {
        match event {
            ItemEvent::Started { id, metadata } => {
                self.close_pending()?;
                writeln!(
                    self.out,
                    "Item ID: {}. File name: '{}'. File size: {}",
                    id,
                    metadata.file_name,
                    format_size(metadata.content_length as f64)
                )?;
                write!(self.out, "Downloading... ")?;
                self.pending = true;
            }
            ItemEvent::Done { report, .. } => {
                self.pending = false;
                writeln!(
                    self.out,
                    "OK. Average download speed: {}.\n",
                    report.stats().rate_string()
                )?;
            }
            ItemEvent::Missing { id } => {
                self.close_pending()?;
                writeln!(self.out, "Item ID {} doesn't exist.", id)?;
            }
            ItemEvent::Vanished { id } => {
                self.close_pending()?;
                writeln!(self.out, "Item ID {}: download link disappeared, skipped.", id)?;
            }
            ItemEvent::Failed { id, error } => {
                self.close_pending()?;
                writeln!(self.out, "Item ID {}: giving up: {}", id, error)?;
            }
        }
        self.out.flush()
    }

    pub fn summary(&mut self, summary: &EnumerationSummary) {
        let _ = self.close_pending();
        let range = match summary.end {
            Some(end) => format!("{}..={}", summary.start, end),
            None => "nothing to do".to_string(),
        };
        let _ = writeln!(
            self.out,
            "Finished ({}): {} downloaded ({}), {} skipped, {} failed.",
            range,
            summary.done,
            format_size(summary.bytes as f64),
            summary.skipped,
            summary.failed.len()
        );
        if !summary.failed.is_empty() {
            let ids: Vec<String> = summary.failed.iter().map(|id| id.to_string()).collect();
            let _ = writeln!(self.out, "Failed item IDs: {}", ids.join(", "));
        }
        let _ = self.out.flush();
    }

    /// Close any open `Downloading... ` line, e.g. before an error is printed.
    pub fn finish(&mut self) {
        let _ = self.close_pending();
        let _ = self.out.flush();
    }
}
