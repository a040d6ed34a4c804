use std::hint::black_box;

use navcache_geom::{AgentHalfExtents, TilePosition, Vec3};
use navcache_recast::{PolyMesh, PolyMeshDetail, PreparedNavMeshData, RecastMesh};

/// Produces a baked tile from a geometry snapshot.
///
/// Real implementations run the recast pipeline; `None` means the tile has no
/// walkable surface.
pub trait TileBaker {
    fn bake(
        &self,
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: &RecastMesh,
    ) -> Option<PreparedNavMeshData>;
}

/// Deterministic stand-in for the recast pipeline.
///
/// Output buffers scale with the snapshot; `passes` repeats a walk over the
/// vertices to make a bake cost something.
pub struct SyntheticBaker {
    passes: u32,
}

impl SyntheticBaker {
    pub fn new(passes: u32) -> Self {
        Self { passes }
    }
}

fn quantize(v: f32, origin: f32, cell: f32) -> u16 {
    ((v - origin) / cell).clamp(0.0, f32::from(u16::MAX)) as u16
}

impl TileBaker for SyntheticBaker {
    fn bake(
        &self,
        agent_half_extents: AgentHalfExtents,
        tile_position: TilePosition,
        recast_mesh: &RecastMesh,
    ) -> Option<PreparedNavMeshData> {
        if recast_mesh.is_empty() {
            return None;
        }
        let mesh = recast_mesh.mesh();
        let vertices = mesh.vertices();
        let extents = agent_half_extents.extents();

        let mut checksum = 0u32;
        for _ in 0..self.passes {
            for v in vertices {
                checksum = checksum.rotate_left(5) ^ black_box(v.to_bits());
            }
        }

        let mut bmin = Vec3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut bmax = Vec3::new(f32::MIN, f32::MIN, f32::MIN);
        for p in vertices.chunks_exact(3) {
            bmin = Vec3::new(bmin.x.min(p[0]), bmin.y.min(p[1]), bmin.z.min(p[2]));
            bmax = Vec3::new(bmax.x.max(p[0]), bmax.y.max(p[1]), bmax.z.max(p[2]));
        }
        if vertices.is_empty() {
            bmin = Vec3::ZERO;
            bmax = Vec3::ZERO;
        }

        let cs = (extents.x.max(extents.y) / 2.0).max(1.0);
        let ch = (extents.z / 4.0).max(1.0);
        let walkable: Vec<_> = mesh
            .area_types()
            .iter()
            .copied()
            .filter(|a| a.is_walkable())
            .collect();
        let polys = walkable.len();
        let nvp = 6;

        let poly_mesh = PolyMesh {
            verts: vertices
                .chunks_exact(3)
                .flat_map(|p| {
                    [
                        quantize(p[0], bmin.x, cs),
                        quantize(p[1], bmin.y, ch),
                        quantize(p[2], bmin.z, cs),
                    ]
                })
                .collect(),
            polys: mesh
                .indices()
                .chunks_exact(3)
                .flat_map(|t| {
                    let mut poly = [u16::MAX; 12];
                    for (slot, &i) in poly.iter_mut().zip(t) {
                        *slot = i as u16;
                    }
                    poly
                })
                .take(polys * 2 * nvp)
                .collect(),
            regs: (0..polys).map(|i| (i % 64) as u16).collect(),
            flags: vec![1; polys],
            areas: walkable,
            nvp,
            bmin,
            bmax,
            cs,
            ch,
            border_size: 0,
            max_edge_error: 1.3,
        };
        let poly_mesh_detail = PolyMeshDetail {
            meshes: (0..polys as u32).flat_map(|i| [i * 3, 3, i, 1]).collect(),
            verts: vertices.to_vec(),
            tris: (0..polys).flat_map(|_| [0u8, 1, 2, 0]).collect(),
        };
        Some(PreparedNavMeshData {
            user_id: checksum ^ (tile_position.x as u32).rotate_left(16) ^ tile_position.y as u32,
            cell_size: cs,
            cell_height: ch,
            poly_mesh,
            poly_mesh_detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navcache_recast::{ByteSize, Version, generate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn bake_is_deterministic() {
        let mesh = generate::recast_mesh(&mut StdRng::seed_from_u64(3), Version::new(1, 0), 16);
        let baker = SyntheticBaker::new(2);
        let agent = AgentHalfExtents::new(29.0, 29.0, 66.0);
        let a = baker.bake(agent, TilePosition::new(1, 2), &mesh).unwrap();
        let b = baker.bake(agent, TilePosition::new(1, 2), &mesh).unwrap();
        assert_eq!(a, b);
        assert!(a.byte_size() > 0);
    }

    #[test]
    fn empty_snapshot_bakes_nothing() {
        let baker = SyntheticBaker::new(1);
        let agent = AgentHalfExtents::new(29.0, 29.0, 66.0);
        assert!(baker.bake(agent, TilePosition::new(0, 0), &RecastMesh::default()).is_none());
    }
}
