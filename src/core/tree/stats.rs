//! Aggregate counts over an index.

use super::Index;
use serde::{Deserialize, Serialize};

/// Entry counts and total file size of one tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub files: usize,
    pub directories: usize,
    pub non_empty_directories: usize,
    /// Sum of file sizes (directories are not counted twice)
    pub total_size: u64,
}

impl TreeStats {
    pub fn from_index(index: &Index<'_>) -> Self {
        index.iter().fold(Self::default(), |mut stats, entry| {
            if entry.is_dir {
                stats.directories += 1;
                if entry.is_non_empty_dir() {
                    stats.non_empty_directories += 1;
                }
            } else {
                stats.files += 1;
                stats.total_size += entry.size;
            }
            stats
        })
    }
}

impl std::fmt::Display for TreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files ({}) and {} folders ({} non-empty)",
            self.files,
            format_bytes(self.total_size),
            self.directories,
            self.non_empty_directories
        )
    }
}

/// Format a byte count with binary units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Byte", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
