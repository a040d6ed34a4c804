use std::mem::size_of;

use navcache_geom::{AgentHalfExtents, TilePosition};
use navcache_recast::{MeshComparison, RecastMesh};

/// Cheap projection of [`CacheKey`] used to pick a bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PartialKey {
    pub agent_half_extents: AgentHalfExtents,
    pub tile_position: TilePosition,
}

impl PartialKey {
    #[inline]
    pub fn new(agent_half_extents: AgentHalfExtents, tile_position: TilePosition) -> Self {
        Self {
            agent_half_extents,
            tile_position,
        }
    }
}

/// Full cache key. Owns its own copy of the geometry snapshot.
#[derive(Clone, Debug)]
pub struct CacheKey {
    pub agent_half_extents: AgentHalfExtents,
    pub tile_position: TilePosition,
    pub recast_mesh: RecastMesh,
}

impl CacheKey {
    pub fn new(
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: RecastMesh,
    ) -> Self {
        Self {
            agent_half_extents,
            tile_position,
            recast_mesh,
        }
    }

    #[inline]
    pub fn partial(&self) -> PartialKey {
        PartialKey::new(self.agent_half_extents, self.tile_position)
    }

    /// Full-key equality; the bucket already guarantees the partial key matches
    /// but it is rechecked so the method stands on its own.
    pub fn matches(
        &self,
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: &RecastMesh,
        comparison: MeshComparison,
    ) -> bool {
        self.agent_half_extents == agent_half_extents
            && self.tile_position == tile_position
            && self.recast_mesh.matches(recast_mesh, comparison)
    }

    /// Size a key built from `recast_mesh` would occupy.
    #[inline]
    pub fn byte_size_for(recast_mesh: &RecastMesh) -> usize {
        size_of::<CacheKey>() + recast_mesh.heap_bytes()
    }

    #[inline]
    pub fn byte_size(&self) -> usize {
        Self::byte_size_for(&self.recast_mesh)
    }
}
