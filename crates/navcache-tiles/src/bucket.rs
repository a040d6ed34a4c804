use hashbrown::HashMap;

use crate::eviction::NodeId;
use crate::key::PartialKey;

/// Partial key to the entries sharing it, newest first.
///
/// A bucket holds one node per geometry variant seen for an (agent, tile)
/// pair, usually a handful, so scans are linear.
#[derive(Debug, Default)]
pub struct BucketIndex {
    buckets: HashMap<PartialKey, Vec<NodeId>>,
}

impl BucketIndex {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// First node in the bucket accepted by `is_match`.
    pub fn find<F>(&self, key: &PartialKey, mut is_match: F) -> Option<NodeId>
    where
        F: FnMut(NodeId) -> bool,
    {
        self.buckets
            .get(key)?
            .iter()
            .copied()
            .find(|&id| is_match(id))
    }

    pub fn insert_front(&mut self, key: PartialKey, id: NodeId) {
        self.buckets.entry(key).or_default().insert(0, id);
    }

    /// Drops `id` from its bucket, and the bucket itself once empty.
    pub fn remove(&mut self, key: &PartialKey, id: NodeId) -> bool {
        let Some(bucket) = self.buckets.get_mut(key) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&n| n == id) else {
            return false;
        };
        bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(key);
        }
        true
    }

    pub fn bucket_len(&self, key: &PartialKey) -> usize {
        self.buckets.get(key).map_or(0, Vec::len)
    }

    /// Number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total nodes over all buckets.
    pub fn node_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
