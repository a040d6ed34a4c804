//! Seeded generators for synthetic snapshots and baked tiles.
//!
//! Used by the simulator, the benches and the tests; the output depends only
//! on the RNG state so a fixed seed gives a fixed workload.

use navcache_geom::{Vec2i, Vec3};
use rand::Rng;

use crate::area::AreaType;
use crate::mesh::{CellWater, FlatHeightfield, Heightfield, Mesh, RecastMesh, Version, Water};
use crate::prepared::{PolyMesh, PolyMeshDetail, PreparedNavMeshData};

pub const CELL_SIZE: i32 = 8192;
const MAX_VERTS_PER_POLY: usize = 6;

pub fn mesh<R: Rng + ?Sized>(rng: &mut R, triangles: usize) -> Mesh {
    let vertex_count = (triangles + 2).max(3);
    let vertices: Vec<f32> = (0..vertex_count * 3)
        .map(|_| rng.random_range(-4096.0f32..4096.0))
        .collect();
    let indices: Vec<i32> = (0..triangles * 3)
        .map(|_| rng.random_range(0..vertex_count as i32))
        .collect();
    let area_types: Vec<AreaType> = (0..triangles)
        .map(|_| AreaType::ALL[rng.random_range(0..AreaType::ALL.len())])
        .collect();
    Mesh::new(indices, vertices, area_types)
}

pub fn cell_water<R: Rng + ?Sized>(rng: &mut R) -> CellWater {
    CellWater {
        cell_position: Vec2i::new(rng.random_range(-32..32), rng.random_range(-32..32)),
        water: Water {
            cell_size: CELL_SIZE,
            level: rng.random_range(-512.0f32..512.0),
        },
    }
}

pub fn heightfield<R: Rng + ?Sized>(rng: &mut R, length: u8) -> Heightfield {
    let side = usize::from(length.max(2));
    let heights: Vec<f32> = (0..side * side)
        .map(|_| rng.random_range(-2048.0f32..2048.0))
        .collect();
    let min_height = heights.iter().copied().fold(f32::INFINITY, f32::min);
    let max_height = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    Heightfield {
        cell_position: Vec2i::new(rng.random_range(-32..32), rng.random_range(-32..32)),
        cell_size: CELL_SIZE,
        length: side as u8,
        min_height,
        max_height,
        heights,
        original_size: 65,
        min_x: 0,
        min_y: 0,
    }
}

pub fn flat_heightfield<R: Rng + ?Sized>(rng: &mut R) -> FlatHeightfield {
    FlatHeightfield {
        cell_position: Vec2i::new(rng.random_range(-32..32), rng.random_range(-32..32)),
        cell_size: CELL_SIZE,
        height: rng.random_range(-512.0f32..512.0),
    }
}

/// Snapshot with `triangles` triangles and a random mix of water and terrain.
pub fn recast_mesh<R: Rng + ?Sized>(rng: &mut R, version: Version, triangles: usize) -> RecastMesh {
    let mesh = mesh(rng, triangles);
    let water = (0..rng.random_range(0..=2)).map(|_| cell_water(rng)).collect();
    let heightfields = (0..rng.random_range(0..=1))
        .map(|_| {
            let length = rng.random_range(5u8..=17);
            heightfield(rng, length)
        })
        .collect();
    let flat_heightfields = (0..rng.random_range(0..=1))
        .map(|_| flat_heightfield(rng))
        .collect();
    RecastMesh::new(version, mesh, water, heightfields, flat_heightfields)
}

/// Baked tile whose buffers scale linearly with `size`.
pub fn prepared_navmesh_data<R: Rng + ?Sized>(rng: &mut R, size: usize) -> PreparedNavMeshData {
    let nvp = MAX_VERTS_PER_POLY;
    let poly_mesh = PolyMesh {
        verts: (0..size * 3).map(|_| rng.random()).collect(),
        polys: (0..size * 2 * nvp).map(|_| rng.random()).collect(),
        regs: (0..size).map(|_| rng.random()).collect(),
        flags: (0..size).map(|_| rng.random()).collect(),
        areas: (0..size)
            .map(|_| AreaType::ALL[rng.random_range(0..AreaType::ALL.len())])
            .collect(),
        nvp,
        bmin: Vec3::new(-1.0, -2.0, -3.0),
        bmax: Vec3::new(3.0, 2.0, 1.0),
        cs: rng.random(),
        ch: rng.random(),
        border_size: rng.random_range(0..16),
        max_edge_error: rng.random(),
    };
    let poly_mesh_detail = PolyMeshDetail {
        meshes: (0..size * 4).map(|_| rng.random()).collect(),
        verts: (0..size * 3).map(|_| rng.random()).collect(),
        tris: (0..size * 4).map(|_| rng.random()).collect(),
    };
    PreparedNavMeshData {
        user_id: rng.random(),
        cell_size: rng.random(),
        cell_height: rng.random(),
        poly_mesh,
        poly_mesh_detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshComparison;
    use crate::size::ByteSize;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn same_seed_same_snapshot() {
        let a = recast_mesh(&mut StdRng::seed_from_u64(7), Version::new(1, 2), 32);
        let b = recast_mesh(&mut StdRng::seed_from_u64(7), Version::new(1, 2), 32);
        assert_eq!(a, b);
        assert!(a.matches(&b, MeshComparison::Structural));
        assert_eq!(a.mesh().triangle_count(), 32);
    }

    #[test]
    fn prepared_size_grows_with_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let small = prepared_navmesh_data(&mut rng, 3);
        let large = prepared_navmesh_data(&mut rng, 10);
        assert!(small.byte_size() < large.byte_size());
    }
}
