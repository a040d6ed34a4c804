//! Bounded LRU cache of baked navmesh tiles keyed by agent size, tile and geometry snapshot.
#![forbid(unsafe_code)]

mod bucket;
mod cache;
mod entry;
mod eviction;
mod key;
mod settings;
mod stats;

pub use bucket::BucketIndex;
pub use cache::NavMeshTilesCache;
pub use entry::{CacheEntry, entry_size};
pub use eviction::{EvictionList, NodeId};
pub use key::{CacheKey, PartialKey};
pub use settings::{CacheSettings, DEFAULT_MAX_TILES_CACHE_SIZE};
pub use stats::Stats;

pub use navcache_geom::{AgentHalfExtents, TilePosition};
pub use navcache_recast::{ByteSize, MeshComparison, PreparedNavMeshData, RecastMesh};
