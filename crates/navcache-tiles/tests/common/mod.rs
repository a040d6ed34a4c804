#![allow(dead_code)]

use navcache_recast::generate;
use navcache_recast::{PreparedNavMeshData, RecastMesh, Version};
use navcache_tiles::{AgentHalfExtents, TilePosition, entry_size};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub fn agent() -> AgentHalfExtents {
    AgentHalfExtents::new(29.0, 29.0, 66.0)
}

pub fn tile(x: i32) -> TilePosition {
    TilePosition::new(x, 0)
}

/// Snapshot whose stamp encodes `variant`, so stamp-trusting lookups stay exact.
pub fn snapshot(variant: u64, triangles: usize) -> RecastMesh {
    snapshot_with_version(variant, Version::new(1, variant), triangles)
}

/// Content seeded by `seed`, stamped with whatever `version` the caller picks.
pub fn snapshot_with_version(seed: u64, version: Version, triangles: usize) -> RecastMesh {
    generate::recast_mesh(&mut StdRng::seed_from_u64(seed), version, triangles)
}

/// Triangles only, so every variant with the same triangle count has the same size.
pub fn flat_snapshot(variant: u64, triangles: usize) -> RecastMesh {
    let mesh = generate::mesh(&mut StdRng::seed_from_u64(variant), triangles);
    RecastMesh::new(Version::new(1, variant), mesh, Vec::new(), Vec::new(), Vec::new())
}

pub fn baked(seed: u64, size: usize) -> PreparedNavMeshData {
    generate::prepared_navmesh_data(&mut StdRng::seed_from_u64(seed), size)
}

pub fn size_of_entry(mesh: &RecastMesh, value: &PreparedNavMeshData) -> usize {
    entry_size(mesh, value)
}
