use std::sync::Arc;

use navcache_recast::{ByteSize, RecastMesh};

use crate::key::CacheKey;

/// Stored (key, value) pair.
///
/// Entries live inside the [`EvictionList`](crate::EvictionList) node that
/// records their recency, so the node id is the entry's list position.
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub key: CacheKey,
    pub value: Arc<V>,
    /// Key plus value size, fixed at insertion.
    pub size: usize,
}

impl<V: ByteSize> CacheEntry<V> {
    pub fn new(key: CacheKey, value: Arc<V>) -> Self {
        let size = key.byte_size() + value.byte_size();
        Self { key, value, size }
    }
}

/// Budget charge for caching `value` under a key built from `recast_mesh`.
#[inline]
pub fn entry_size<V: ByteSize>(recast_mesh: &RecastMesh, value: &V) -> usize {
    CacheKey::byte_size_for(recast_mesh) + value.byte_size()
}

#[cfg(test)]
mod tests {
    use super::*;
    use navcache_geom::{AgentHalfExtents, TilePosition};
    use navcache_recast::PreparedNavMeshData;

    #[test]
    fn entry_size_matches_constructed_entry() {
        let mesh = RecastMesh::default();
        let value = PreparedNavMeshData::default();
        let expected = entry_size(&mesh, &value);
        let key = CacheKey::new(
            AgentHalfExtents::new(1.0, 1.0, 1.0),
            TilePosition::new(0, 0),
            mesh,
        );
        let entry = CacheEntry::new(key, Arc::new(value));
        assert_eq!(entry.size, expected);
    }
}
