use std::mem::size_of;

use navcache_geom::Vec3;

use crate::area::AreaType;
use crate::size::{ByteSize, slice_bytes};

/// Polygon mesh produced by the recast stage of a bake.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyMesh {
    pub verts: Vec<u16>,
    pub polys: Vec<u16>,
    pub regs: Vec<u16>,
    pub flags: Vec<u16>,
    pub areas: Vec<AreaType>,
    /// Max vertices per polygon.
    pub nvp: usize,
    pub bmin: Vec3,
    pub bmax: Vec3,
    pub cs: f32,
    pub ch: f32,
    pub border_size: i32,
    pub max_edge_error: f32,
}

impl PolyMesh {
    #[inline]
    pub fn poly_count(&self) -> usize {
        self.areas.len()
    }

    fn heap_bytes(&self) -> usize {
        slice_bytes(&self.verts)
            + slice_bytes(&self.polys)
            + slice_bytes(&self.regs)
            + slice_bytes(&self.flags)
            + slice_bytes(&self.areas)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyMeshDetail {
    pub meshes: Vec<u32>,
    pub verts: Vec<f32>,
    pub tris: Vec<u8>,
}

impl PolyMeshDetail {
    fn heap_bytes(&self) -> usize {
        slice_bytes(&self.meshes) + slice_bytes(&self.verts) + slice_bytes(&self.tris)
    }
}

/// Baked navmesh tile ready to be turned into detour tile data.
///
/// Immutable once baked; the tile cache hands it out behind an `Arc`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreparedNavMeshData {
    pub user_id: u32,
    pub cell_size: f32,
    pub cell_height: f32,
    pub poly_mesh: PolyMesh,
    pub poly_mesh_detail: PolyMeshDetail,
}

impl PreparedNavMeshData {
    pub fn is_empty(&self) -> bool {
        self.poly_mesh.poly_count() == 0
    }
}

impl ByteSize for PreparedNavMeshData {
    fn byte_size(&self) -> usize {
        size_of::<Self>() + self.poly_mesh.heap_bytes() + self.poly_mesh_detail.heap_bytes()
    }
}
