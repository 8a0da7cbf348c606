//! Human-readable formatting for byte counts, timestamps and storage usage.

use chrono::{DateTime, Utc};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// Format a byte count with binary units and one decimal ("1.5 MB").
pub fn format_bytes(size: u64) -> String {
    if size >= TB {
        format!("{:.1} TB", size as f64 / TB as f64)
    } else if size >= GB {
        format!("{:.1} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.1} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// Format an upload timestamp for listings.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Share of `capacity` used by `total`, in percent, clamped to `[0, 100]`.
/// A capacity of zero reports zero usage.
pub fn usage_percent(total: u64, capacity: u64) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (total as f64 / capacity as f64 * 100.0).min(100.0)
}
