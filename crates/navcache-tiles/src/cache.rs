use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use navcache_geom::{AgentHalfExtents, TilePosition};
use navcache_recast::{ByteSize, MeshComparison, PreparedNavMeshData, RecastMesh};

use crate::bucket::BucketIndex;
use crate::entry::{CacheEntry, entry_size};
use crate::eviction::{EvictionList, NodeId};
use crate::key::{CacheKey, PartialKey};
use crate::settings::CacheSettings;
use crate::stats::Stats;

struct CacheState<V> {
    index: BucketIndex,
    recency: EvictionList<CacheEntry<V>>,
    total_size: usize,
    get_count: u64,
    hit_count: u64,
    miss_count: u64,
    inserts: u64,
    evictions: u64,
    rejected: u64,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            index: BucketIndex::new(),
            recency: EvictionList::new(),
            total_size: 0,
            get_count: 0,
            hit_count: 0,
            miss_count: 0,
            inserts: 0,
            evictions: 0,
            rejected: 0,
        }
    }

    fn find(
        &self,
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: &RecastMesh,
        comparison: MeshComparison,
    ) -> Option<NodeId> {
        let partial = PartialKey::new(agent_half_extents, tile_position);
        self.index.find(&partial, |id| {
            self.recency.get(id).is_some_and(|entry| {
                entry
                    .key
                    .matches(agent_half_extents, tile_position, recast_mesh, comparison)
            })
        })
    }

    fn evict_lru(&mut self) -> bool {
        let Some((id, entry)) = self.recency.pop_back() else {
            return false;
        };
        self.index.remove(&entry.key.partial(), id);
        self.total_size -= entry.size;
        self.evictions += 1;
        true
    }
}

enum SetOutcome {
    Inserted { size: usize, evicted: usize },
    Existing,
    Rejected { size: usize },
}

/// Bounded, thread-safe LRU cache of baked navmesh tiles.
///
/// Keys are (agent half extents, tile position, geometry snapshot). The whole
/// state sits behind one mutex held for the duration of each call; values are
/// handed out as `Arc<V>` and stay valid after eviction.
///
/// An entry larger than `max_size` is never admitted: `set` returns it
/// uncached and nothing is evicted for it. The sum of entry sizes therefore
/// never exceeds `max_size`.
pub struct NavMeshTilesCache<V = PreparedNavMeshData> {
    max_size: usize,
    comparison: MeshComparison,
    state: Mutex<CacheState<V>>,
}

impl<V: ByteSize> NavMeshTilesCache<V> {
    pub fn new(max_size: usize) -> Self {
        Self::with_comparison(max_size, MeshComparison::default())
    }

    pub fn with_comparison(max_size: usize, comparison: MeshComparison) -> Self {
        Self {
            max_size,
            comparison,
            state: Mutex::new(CacheState::new()),
        }
    }

    pub fn with_settings(settings: &CacheSettings) -> Self {
        Self::with_comparison(settings.max_tiles_cache_size, settings.mesh_comparison)
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn comparison(&self) -> MeshComparison {
        self.comparison
    }

    /// Looks up a baked tile, marking it most recently used on a hit.
    pub fn get(
        &self,
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: &RecastMesh,
    ) -> Option<Arc<V>> {
        let mut state = self.lock();
        state.get_count += 1;
        let found = state.find(agent_half_extents, tile_position, recast_mesh, self.comparison);
        let Some(id) = found else {
            state.miss_count += 1;
            return None;
        };
        state.recency.touch(id);
        state.hit_count += 1;
        state.recency.get(id).map(|entry| Arc::clone(&entry.value))
    }

    /// Caches `value` and returns the handle callers should use.
    ///
    /// If an equal key is already cached (two workers baked the same tile) the
    /// existing value wins: it is touched and returned, and `value` is dropped.
    /// Otherwise least recently used entries are evicted until the new entry
    /// fits, then it is inserted as most recently used.
    pub fn set(
        &self,
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: &RecastMesh,
        value: V,
    ) -> Arc<V> {
        let value = Arc::new(value);
        let size = entry_size(recast_mesh, value.as_ref());

        let (result, outcome) = {
            let mut state = self.lock();
            if let Some(id) =
                state.find(agent_half_extents, tile_position, recast_mesh, self.comparison)
            {
                state.recency.touch(id);
                let existing = state.recency.get(id).map(|entry| Arc::clone(&entry.value));
                match existing {
                    Some(existing) => (existing, SetOutcome::Existing),
                    None => (value, SetOutcome::Existing),
                }
            } else if size <= self.max_size {
                let key = CacheKey::new(agent_half_extents, tile_position, recast_mesh.clone());
                let entry = CacheEntry::new(key, Arc::clone(&value));
                let mut evicted = 0;
                while state.total_size + entry.size > self.max_size && state.evict_lru() {
                    evicted += 1;
                }
                let partial = entry.key.partial();
                let id = state.recency.push_front(entry);
                state.index.insert_front(partial, id);
                state.total_size += size;
                state.inserts += 1;
                (value, SetOutcome::Inserted { size, evicted })
            } else {
                state.rejected += 1;
                (value, SetOutcome::Rejected { size })
            }
        };

        match outcome {
            SetOutcome::Inserted { size, evicted } => {
                log::trace!(
                    target: "navcache",
                    "cached tile ({}, {}) size={} evicted={}",
                    tile_position.x,
                    tile_position.y,
                    size,
                    evicted
                );
            }
            SetOutcome::Existing => {
                log::trace!(
                    target: "navcache",
                    "tile ({}, {}) already cached; keeping existing value",
                    tile_position.x,
                    tile_position.y
                );
            }
            SetOutcome::Rejected { size } => {
                log::debug!(
                    target: "navcache",
                    "tile ({}, {}) size={} exceeds cache max size {}; not cached",
                    tile_position.x,
                    tile_position.y,
                    size,
                    self.max_size
                );
            }
        }
        result
    }

    /// Lookup without touching recency or counters.
    pub fn contains(
        &self,
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: &RecastMesh,
    ) -> bool {
        self.lock()
            .find(agent_half_extents, tile_position, recast_mesh, self.comparison)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().recency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry. Cumulative counters are kept; dropped entries count
    /// as evictions.
    pub fn clear(&self) {
        let mut state = self.lock();
        let dropped = state.recency.len() as u64;
        state.recency.clear();
        state.index.clear();
        state.total_size = 0;
        state.evictions += dropped;
    }

    pub fn stats(&self) -> Stats {
        let state = self.lock();
        Stats {
            max_size: self.max_size,
            entries: state.recency.len(),
            total_size: state.total_size,
            get_count: state.get_count,
            hit_count: state.hit_count,
            miss_count: state.miss_count,
            inserts: state.inserts,
            evictions: state.evictions,
            rejected: state.rejected,
        }
    }

    // State is consistent between statements, so a panic elsewhere does not
    // leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        let state = self.lock();
        assert_eq!(state.index.node_count(), state.recency.len());
        let mut sum = 0;
        for (id, entry) in state.recency.iter() {
            let partial = entry.key.partial();
            assert_eq!(state.index.find(&partial, |n| n == id), Some(id));
            sum += entry.size;
        }
        assert_eq!(sum, state.total_size);
        assert!(state.total_size <= self.max_size);
    }

    #[cfg(test)]
    fn recency_order(&self) -> Vec<TilePosition> {
        self.lock()
            .recency
            .iter()
            .map(|(_, entry)| entry.key.tile_position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navcache_geom::Vec2i;
    use navcache_recast::generate;
    use navcache_recast::{AreaType, CellWater, Mesh, Version, Water};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn agent() -> AgentHalfExtents {
        AgentHalfExtents::new(1.0, 2.0, 3.0)
    }

    fn triangle() -> Mesh {
        Mesh::new(
            vec![0, 1, 2],
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
            vec![AreaType::Ground],
        )
    }

    fn recast_mesh() -> RecastMesh {
        RecastMesh::new(Version::new(0, 0), triangle(), Vec::new(), Vec::new(), Vec::new())
    }

    fn recast_mesh_with_water(level: i32, revision: u64) -> RecastMesh {
        let water = vec![CellWater {
            cell_position: Vec2i::default(),
            water: Water {
                cell_size: level,
                level: 0.0,
            },
        }];
        RecastMesh::new(Version::new(0, revision), triangle(), water, Vec::new(), Vec::new())
    }

    fn data(size: usize) -> PreparedNavMeshData {
        generate::prepared_navmesh_data(&mut StdRng::seed_from_u64(size as u64), size)
    }

    #[test]
    fn get_on_empty_cache_misses() {
        let cache: NavMeshTilesCache = NavMeshTilesCache::new(0);
        assert!(cache.get(agent(), TilePosition::new(0, 0), &recast_mesh()).is_none());
        let s = cache.stats();
        assert_eq!((s.get_count, s.miss_count, s.hit_count), (1, 1, 0));
    }

    #[test]
    fn set_returns_shared_cached_value() {
        let mesh = recast_mesh();
        let value = data(3);
        let max = entry_size(&mesh, &value);
        let cache = NavMeshTilesCache::new(max);
        let expected = value.clone();
        let stored = cache.set(agent(), TilePosition::new(0, 0), &mesh, value);
        assert_eq!(*stored, expected);
        let got = cache.get(agent(), TilePosition::new(0, 0), &mesh).unwrap();
        assert!(Arc::ptr_eq(&stored, &got));
        assert_eq!(cache.stats().total_size, max);
        cache.check_invariants();
    }

    #[test]
    fn set_existing_key_keeps_first_value() {
        let mesh = recast_mesh();
        let first = data(3);
        let cache = NavMeshTilesCache::new(2 * entry_size(&mesh, &first));
        let a = cache.set(agent(), TilePosition::new(0, 0), &mesh, first);
        let mut other = data(3);
        other.user_id = other.user_id.wrapping_add(1);
        let b = cache.set(agent(), TilePosition::new(0, 0), &mesh, other);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().inserts, 1);
        cache.check_invariants();
    }

    #[test]
    fn misses_by_agent_tile_or_geometry() {
        let mesh = recast_mesh();
        let cache = NavMeshTilesCache::new(usize::MAX);
        cache.set(agent(), TilePosition::new(0, 0), &mesh, data(3));
        let other_agent = AgentHalfExtents::new(1.0, 1.0, 1.0);
        assert!(cache.get(other_agent, TilePosition::new(0, 0), &mesh).is_none());
        assert!(cache.get(agent(), TilePosition::new(1, 1), &mesh).is_none());
        let changed = recast_mesh_with_water(1, 1);
        assert!(cache.get(agent(), TilePosition::new(0, 0), &changed).is_none());
        assert!(cache.get(agent(), TilePosition::new(0, 0), &mesh).is_some());
    }

    #[test]
    fn set_replaces_least_recently_used() {
        let lru = recast_mesh_with_water(1, 1);
        let mru = recast_mesh_with_water(2, 2);
        let newest = recast_mesh_with_water(3, 3);
        let one = entry_size(&lru, &data(3));
        let cache = NavMeshTilesCache::new(2 * one);
        let tile = TilePosition::new(0, 0);

        cache.set(agent(), tile, &lru, data(3));
        cache.set(agent(), tile, &mru, data(3));
        // touch in reverse so the first insert becomes most recent
        assert!(cache.get(agent(), tile, &mru).is_some());
        assert!(cache.get(agent(), tile, &lru).is_some());

        cache.set(agent(), tile, &newest, data(3));
        assert!(cache.contains(agent(), tile, &lru));
        assert!(!cache.contains(agent(), tile, &mru));
        assert!(cache.contains(agent(), tile, &newest));
        assert_eq!(cache.stats().evictions, 1);
        cache.check_invariants();
    }

    #[test]
    fn oversized_entry_is_rejected_without_evicting() {
        let small = recast_mesh();
        let cache = NavMeshTilesCache::new(2 * entry_size(&small, &data(3)));
        let tile = TilePosition::new(0, 0);
        cache.set(agent(), tile, &small, data(3));

        let large = recast_mesh_with_water(1, 1);
        let huge = data(1000);
        let expected = huge.clone();
        let handle = cache.set(agent(), tile, &large, huge);
        assert_eq!(*handle, expected);
        assert!(!cache.contains(agent(), tile, &large));
        assert!(cache.contains(agent(), tile, &small));
        let s = cache.stats();
        assert_eq!((s.entries, s.rejected, s.evictions), (1, 1, 0));
        cache.check_invariants();
    }

    #[test]
    fn zero_capacity_never_stores() {
        let cache = NavMeshTilesCache::new(0);
        let mesh = recast_mesh();
        let handle = cache.set(agent(), TilePosition::new(0, 0), &mesh, data(1));
        assert_eq!(Arc::strong_count(&handle), 1);
        assert!(cache.get(agent(), TilePosition::new(0, 0), &mesh).is_none());
        assert_eq!(cache.stats().entries, 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn handles_survive_eviction() {
        let a = recast_mesh_with_water(1, 1);
        let b = recast_mesh_with_water(2, 2);
        let cache = NavMeshTilesCache::new(entry_size(&a, &data(3)));
        let tile = TilePosition::new(0, 0);
        let held = cache.set(agent(), tile, &a, data(3));
        cache.set(agent(), tile, &b, data(3));
        assert!(!cache.contains(agent(), tile, &a));
        assert_eq!(*held, data(3));
    }

    #[test]
    fn get_moves_entry_to_front() {
        let mesh = recast_mesh();
        let cache = NavMeshTilesCache::new(usize::MAX);
        for x in 0..3 {
            cache.set(agent(), TilePosition::new(x, 0), &mesh, data(1));
        }
        assert_eq!(
            cache.recency_order(),
            vec![TilePosition::new(2, 0), TilePosition::new(1, 0), TilePosition::new(0, 0)]
        );
        cache.get(agent(), TilePosition::new(0, 0), &mesh);
        assert_eq!(
            cache.recency_order(),
            vec![TilePosition::new(0, 0), TilePosition::new(2, 0), TilePosition::new(1, 0)]
        );
    }

    #[test]
    fn clear_keeps_counters() {
        let mesh = recast_mesh();
        let cache = NavMeshTilesCache::new(usize::MAX);
        cache.set(agent(), TilePosition::new(0, 0), &mesh, data(1));
        cache.get(agent(), TilePosition::new(0, 0), &mesh);
        cache.clear();
        let s = cache.stats();
        assert_eq!((s.entries, s.total_size, s.hit_count, s.evictions), (0, 0, 1, 1));
        cache.check_invariants();
    }

    #[test]
    fn structural_comparison_separates_equal_stamps() {
        let tile = TilePosition::new(0, 0);
        let a = recast_mesh_with_water(1, 0);
        let b = recast_mesh_with_water(2, 0);

        let trusting = NavMeshTilesCache::new(usize::MAX);
        trusting.set(agent(), tile, &a, data(1));
        assert!(trusting.get(agent(), tile, &b).is_some());

        let strict = NavMeshTilesCache::with_comparison(usize::MAX, MeshComparison::Structural);
        strict.set(agent(), tile, &a, data(1));
        assert!(strict.get(agent(), tile, &b).is_none());
        assert!(strict.get(agent(), tile, &a).is_some());
    }

    #[test]
    fn byte_buffers_are_charged_by_length() {
        let mesh = recast_mesh();
        let one = entry_size(&mesh, &vec![0u8; 64]);
        assert_eq!(
            one,
            CacheKey::byte_size_for(&mesh) + std::mem::size_of::<Vec<u8>>() + 64
        );
        let cache: NavMeshTilesCache<Vec<u8>> = NavMeshTilesCache::new(2 * one);

        let first = cache.set(agent(), TilePosition::new(0, 0), &mesh, vec![1u8; 64]);
        cache.set(agent(), TilePosition::new(1, 0), &mesh, vec![2u8; 64]);
        assert_eq!(cache.stats().total_size, 2 * one);
        cache.set(agent(), TilePosition::new(2, 0), &mesh, vec![3u8; 64]);

        assert!(cache.get(agent(), TilePosition::new(0, 0), &mesh).is_none());
        assert_eq!(*first, vec![1u8; 64]);
        let got = cache.get(agent(), TilePosition::new(2, 0), &mesh).unwrap();
        assert_eq!(got.len(), 64);
        assert_eq!(cache.stats().evictions, 1);

        let oversized = cache.set(agent(), TilePosition::new(3, 0), &mesh, vec![0u8; 4096]);
        assert_eq!(oversized.len(), 4096);
        assert_eq!(cache.stats().rejected, 1);
        cache.check_invariants();
    }
}
