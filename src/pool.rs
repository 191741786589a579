//! Pool classification
//!
//! Maps a validator index to the client/infrastructure pool presumed to run it.
//! The mapping is a static ordered list of half-open index ranges; anything
//! outside every range is `unlabeled`.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label for indices outside every configured range
pub const UNLABELED: &str = "unlabeled";

/// Half-open index range `[low, high)` tagged with a pool label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRange {
    pub low: u64,
    pub high: u64,
    pub label: String,
}

impl PoolRange {
    pub fn new(low: u64, high: u64, label: impl Into<String>) -> Self {
        Self {
            low,
            high,
            label: label.into(),
        }
    }

    pub fn contains(&self, index: u64) -> bool {
        index >= self.low && index < self.high
    }
}

/// Genesis deposit layout as `(low, high, label)`. Index 0 is left out.
pub const DEFAULT_POOL_RANGES: &[(u64, u64, &str)] = &[
    (1, 25_000, "lighthouse-geth"),
    (25_000, 26_000, "grandine-geth"),
    (26_000, 52_000, "teku-geth"),
    (52_000, 54_000, "lh-nethermind"),
    (54_000, 56_000, "lh-besu"),
    (56_000, 58_000, "lodestar-geth"),
    (58_000, 60_000, "lodestar-nethermind"),
    (60_000, 62_000, "nimbus-geth"),
    (62_000, 64_000, "nimbus-nethermind"),
    (64_000, 66_000, "prysm-geth"),
    (66_000, 68_000, "prysm-nethermind"),
    (68_000, 70_000, "teku-nethermind"),
    (70_000, 72_000, "teku-besu"),
];

fn default_ranges() -> Vec<PoolRange> {
    DEFAULT_POOL_RANGES
        .iter()
        .map(|&(low, high, label)| PoolRange::new(low, high, label))
        .collect()
}

/// Ordered, non-overlapping set of pool ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTable {
    ranges: Vec<PoolRange>,
}

impl Default for PoolTable {
    fn default() -> Self {
        Self {
            ranges: default_ranges(),
        }
    }
}

impl PoolTable {
    /// Build a table from caller-supplied ranges.
    ///
    /// Ranges must be non-empty, sorted ascending by `low` and must not overlap.
    pub fn new(ranges: Vec<PoolRange>) -> SyncResult<Self> {
        for range in &ranges {
            if range.label.is_empty() {
                return Err(SyncError::Config(format!(
                    "Pool range [{}, {}) has an empty label",
                    range.low, range.high
                )));
            }
            if range.low >= range.high {
                return Err(SyncError::Config(format!(
                    "Pool range '{}' is empty: [{}, {})",
                    range.label, range.low, range.high
                )));
            }
        }

        for pair in ranges.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.low < prev.high {
                return Err(SyncError::Config(format!(
                    "Pool range '{}' [{}, {}) overlaps or precedes '{}' [{}, {})",
                    next.label, next.low, next.high, prev.label, prev.low, prev.high
                )));
            }
        }

        Ok(Self { ranges })
    }

    /// Pool label for a validator index. First matching range wins.
    pub fn classify(&self, index: u64) -> &str {
        self.ranges
            .iter()
            .find(|r| r.contains(index))
            .map(|r| r.label.as_str())
            .unwrap_or(UNLABELED)
    }

    /// Count indices per pool label
    pub fn tally<I>(&self, indices: I) -> BTreeMap<&str, usize>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut counts = BTreeMap::new();
        for index in indices {
            *counts.entry(self.classify(index)).or_insert(0) += 1;
        }
        counts
    }
}

/// Classify against the default genesis table
pub fn classify(index: u64) -> &'static str {
    DEFAULT_POOL_RANGES
        .iter()
        .find(|&&(low, high, _)| index >= low && index < high)
        .map(|&(_, _, label)| label)
        .unwrap_or(UNLABELED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_zero_is_unlabeled() {
        assert_eq!(classify(0), UNLABELED);
    }

    #[test]
    fn test_first_range() {
        assert_eq!(classify(1), "lighthouse-geth");
        assert_eq!(classify(12_345), "lighthouse-geth");
        assert_eq!(classify(24_999), "lighthouse-geth");
    }

    #[test]
    fn test_boundary_is_exclusive_high() {
        assert_eq!(classify(24_999), "lighthouse-geth");
        assert_eq!(classify(25_000), "grandine-geth");
        assert_eq!(classify(25_999), "grandine-geth");
        assert_eq!(classify(26_000), "teku-geth");
    }

    #[test]
    fn test_every_range_low_mid_and_last() {
        for &(low, high, label) in DEFAULT_POOL_RANGES {
            let mid = low + (high - low) / 2;
            assert_eq!(classify(low), label, "low of {}", label);
            assert_eq!(classify(mid), label, "mid of {}", label);
            assert_eq!(classify(high - 1), label, "last of {}", label);
            assert_ne!(classify(high), label, "past end of {}", label);
        }
    }

    #[test]
    fn test_past_last_range_is_unlabeled() {
        assert_eq!(classify(71_999), "teku-besu");
        assert_eq!(classify(72_000), UNLABELED);
        assert_eq!(classify(100_000), UNLABELED);
        assert_eq!(classify(u64::MAX), UNLABELED);
    }

    #[test]
    fn test_default_table_labels_are_distinct() {
        let mut labels: Vec<_> = DEFAULT_POOL_RANGES.iter().map(|r| r.2).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), DEFAULT_POOL_RANGES.len());
        assert!(!labels.contains(&UNLABELED));
    }

    #[test]
    fn test_default_table_passes_validation() {
        let table = PoolTable::new(default_ranges()).unwrap();
        assert_eq!(table, PoolTable::default());
    }

    #[test]
    fn test_table_matches_free_function() {
        let table = PoolTable::default();
        for index in [0, 1, 24_999, 25_000, 53_000, 69_999, 71_999, 72_000] {
            assert_eq!(table.classify(index), classify(index));
        }
    }

    #[test]
    fn test_custom_table() {
        let table = PoolTable::new(vec![
            PoolRange::new(0, 10, "alpha"),
            PoolRange::new(20, 30, "beta"),
        ])
        .unwrap();
        assert_eq!(table.classify(0), "alpha");
        assert_eq!(table.classify(9), "alpha");
        assert_eq!(table.classify(15), UNLABELED);
        assert_eq!(table.classify(20), "beta");
        assert_eq!(table.classify(30), UNLABELED);
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let result = PoolTable::new(vec![
            PoolRange::new(0, 10, "alpha"),
            PoolRange::new(5, 30, "beta"),
        ]);
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_unsorted_ranges_rejected() {
        let result = PoolTable::new(vec![
            PoolRange::new(20, 30, "beta"),
            PoolRange::new(0, 10, "alpha"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_range_rejected() {
        let result = PoolTable::new(vec![PoolRange::new(10, 10, "alpha")]);
        assert!(result.unwrap_err().to_string().contains("is empty"));
    }

    #[test]
    fn test_empty_label_rejected() {
        let result = PoolTable::new(vec![PoolRange::new(0, 10, "")]);
        assert!(result.unwrap_err().to_string().contains("empty label"));
    }

    #[test]
    fn test_range_deserializes_from_json() {
        let ranges: Vec<PoolRange> =
            serde_json::from_str(r#"[{"low": 0, "high": 5, "label": "devnet"}]"#).unwrap();
        let table = PoolTable::new(ranges).unwrap();
        assert_eq!(table.classify(4), "devnet");
        assert_eq!(table.classify(5), UNLABELED);
    }

    #[test]
    fn test_tally() {
        let table = PoolTable::default();
        let counts = table.tally([0, 1, 2, 25_500, 100_000]);
        assert_eq!(counts.get("lighthouse-geth"), Some(&2));
        assert_eq!(counts.get("grandine-geth"), Some(&1));
        assert_eq!(counts.get(UNLABELED), Some(&2));
        assert_eq!(counts.values().sum::<usize>(), 5);
    }
}
