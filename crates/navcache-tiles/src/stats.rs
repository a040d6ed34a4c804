use std::fmt;

/// Point-in-time counters of a [`NavMeshTilesCache`](crate::NavMeshTilesCache).
///
/// Taken under the cache lock, so all fields describe the same moment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub max_size: usize,
    pub entries: usize,
    /// Sum of entry sizes in bytes.
    pub total_size: usize,
    pub get_count: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub inserts: u64,
    pub evictions: u64,
    /// `set` calls whose entry could never fit the budget.
    pub rejected: u64,
}

impl Stats {
    pub fn hit_ratio(&self) -> f64 {
        if self.get_count == 0 {
            0.0
        } else {
            self.hit_count as f64 / self.get_count as f64
        }
    }

    pub fn log_summary(&self) {
        log::info!(target: "navcache", "navmesh tiles cache: {}", self);
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entries={} size={}/{} gets={} hits={} misses={} hit_ratio={:.3} inserts={} evictions={} rejected={}",
            self.entries,
            self.total_size,
            self.max_size,
            self.get_count,
            self.hit_count,
            self.miss_count,
            self.hit_ratio(),
            self.inserts,
            self.evictions,
            self.rejected,
        )
    }
}
