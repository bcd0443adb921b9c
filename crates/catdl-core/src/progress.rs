//! Human-readable sizes and transfer rates for progress lines.
//!
//! Sizes use binary prefixes (divisor 1024) and two decimals. A value moves to
//! the next unit once it reaches 1024 of the current one, so exactly 1024
//! bytes is `1.00 KB`.

use std::time::Duration;

const SIZE_SUFFIXES: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count, e.g. `5242880.0` → `"5.00 MB"`.
pub fn format_size(bytes: f64) -> String {
    let mut size = if bytes.is_finite() && bytes > 0.0 { bytes } else { 0.0 };
    let mut index = 0;
    while size >= 1024.0 && index < SIZE_SUFFIXES.len() - 1 {
        size /= 1024.0;
        index += 1;
    }
    format!("{:.2} {}", size, SIZE_SUFFIXES[index])
}

/// Byte count and wall-clock time of one finished transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferStats {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl TransferStats {
    /// Average rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs
    }

    /// Rate formatted like a size with a `/s` suffix, e.g. `"1.50 MB/s"`.
    pub fn rate_string(&self) -> String {
        format!("{}/s", format_size(self.bytes_per_sec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_below_one_kib() {
        assert_eq!(format_size(0.0), "0.00 B");
        assert_eq!(format_size(1.0), "1.00 B");
        assert_eq!(format_size(1023.0), "1023.00 B");
    }

    #[test]
    fn exactly_1024_rolls_over() {
        assert_eq!(format_size(1024.0), "1.00 KB");
        assert_eq!(format_size(1024.0 * 1024.0), "1.00 MB");
    }

    #[test]
    fn kib_range_and_rounding() {
        assert_eq!(format_size(1536.0), "1.50 KB");
        assert_eq!(format_size(1024.0 * 1024.0 - 1.0), "1024.00 KB");
        assert_eq!(format_size(5_242_880.0), "5.00 MB");
    }

    #[test]
    fn caps_at_petabytes() {
        let pib = 1024f64.powi(5);
        assert_eq!(format_size(pib), "1.00 PB");
        assert_eq!(format_size(pib * 2048.0), "2048.00 PB");
    }

    #[test]
    fn negative_and_nan_format_as_zero() {
        assert_eq!(format_size(-5.0), "0.00 B");
        assert_eq!(format_size(f64::NAN), "0.00 B");
    }

    #[test]
    fn rate_from_stats() {
        let stats = TransferStats {
            bytes: 3 * 1024 * 1024,
            elapsed: Duration::from_secs(2),
        };
        assert!((stats.bytes_per_sec() - 1_572_864.0).abs() < 1e-6);
        assert_eq!(stats.rate_string(), "1.50 MB/s");
    }

    #[test]
    fn zero_elapsed_has_zero_rate() {
        let stats = TransferStats {
            bytes: 100,
            elapsed: Duration::ZERO,
        };
        assert_eq!(stats.bytes_per_sec(), 0.0);
    }
}
