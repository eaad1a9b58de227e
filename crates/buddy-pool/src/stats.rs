// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool statistics for diagnostics.
//!
//! [`PoolStats`] combines a snapshot of the current free-list occupancy with
//! cumulative counters (allocations, releases, splits, merges, exhausted
//! requests) and the allocated-id high-water mark.

/// Snapshot of pool usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolStats {
    /// Number of ids managed by the pool.
    pub total_ids: u64,
    /// Ids currently sitting in free blocks.
    pub free_ids: u64,
    /// Ids currently handed out.
    pub allocated_ids: u64,
    /// Free block count per size class, indexed by `size_class - 1`.
    pub free_blocks: Vec<usize>,
    /// Successful allocations since start-up.
    pub allocations: u64,
    /// Releases since start-up.
    pub releases: u64,
    /// Blocks split to satisfy smaller requests.
    pub splits: u64,
    /// Buddy pairs coalesced back into their parent.
    pub merges: u64,
    /// Requests refused because no large enough block was free.
    pub exhausted: u64,
    /// Highest value `allocated_ids` has reached.
    pub peak_allocated_ids: u64,
}

impl PoolStats {
    /// Fraction of the pool currently handed out, in `[0.0, 1.0]`.
    pub fn utilisation(&self) -> f64 {
        if self.total_ids == 0 {
            return 0.0;
        }
        self.allocated_ids as f64 / self.total_ids as f64
    }

    pub(crate) fn record_allocation(&mut self, len: u64) {
        self.allocations += 1;
        self.allocated_ids += len;
        self.free_ids -= len;
        if self.allocated_ids > self.peak_allocated_ids {
            self.peak_allocated_ids = self.allocated_ids;
        }
    }

    pub(crate) fn record_release(&mut self, len: u64) {
        self.releases += 1;
        self.allocated_ids -= len;
        self.free_ids += len;
    }

    pub(crate) fn record_split(&mut self) {
        self.splits += 1;
    }

    pub(crate) fn record_merge(&mut self) {
        self.merges += 1;
    }

    pub(crate) fn record_exhausted(&mut self) {
        self.exhausted += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} of {} ids allocated ({:.2}%), peak {}; {} allocations, {} releases, \
             {} splits, {} merges, {} exhausted",
            self.allocated_ids,
            self.total_ids,
            self.utilisation() * 100.0,
            self.peak_allocated_ids,
            self.allocations,
            self.releases,
            self.splits,
            self.merges,
            self.exhausted,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(total: u64) -> PoolStats {
        PoolStats {
            total_ids: total,
            free_ids: total,
            ..Default::default()
        }
    }

    #[test]
    fn test_default() {
        let s = PoolStats::default();
        assert_eq!(s.allocations, 0);
        assert_eq!(s.utilisation(), 0.0);
    }

    #[test]
    fn test_peak_tracking() {
        let mut s = fresh(1024);
        s.record_allocation(100);
        s.record_allocation(200);
        s.record_release(100);
        assert_eq!(s.allocated_ids, 200);
        assert_eq!(s.free_ids, 824);
        assert_eq!(s.peak_allocated_ids, 300);
    }

    #[test]
    fn test_utilisation() {
        let mut s = fresh(1000);
        s.record_allocation(250);
        assert!((s.utilisation() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_summary() {
        let mut s = fresh(256);
        s.record_allocation(128);
        s.record_split();
        s.record_exhausted();
        let summary = s.summary();
        assert!(summary.contains("128 of 256"));
        assert!(summary.contains("1 splits"));
        assert!(summary.contains("1 exhausted"));
    }
}
