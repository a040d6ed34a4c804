//! Geometry snapshots ("recast meshes") and baked tile payloads consumed by the tile cache.
#![forbid(unsafe_code)]

pub mod area;
pub mod generate;
pub mod mesh;
pub mod prepared;
pub mod size;

pub use area::AreaType;
pub use mesh::{
    CellWater, FlatHeightfield, Heightfield, Mesh, MeshComparison, RecastMesh, Version, Water,
};
pub use prepared::{PolyMesh, PolyMeshDetail, PreparedNavMeshData};
pub use size::ByteSize;
