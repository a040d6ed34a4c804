use std::mem::size_of;

use navcache_geom::Vec2i;
use serde::Deserialize;

use crate::area::AreaType;
use crate::size::{ByteSize, slice_bytes};

/// Version stamp of a geometry snapshot.
///
/// `generation` identifies the loaded content, `revision` counts local
/// mutations since then. Producers bump one of them whenever content changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub generation: u64,
    pub revision: u64,
}

impl Version {
    #[inline]
    pub const fn new(generation: u64, revision: u64) -> Self {
        Self {
            generation,
            revision,
        }
    }
}

/// How the tile cache decides that two snapshots describe the same input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshComparison {
    /// Equal version stamps mean equal content. Different stamps never match.
    #[default]
    TrustVersion,
    /// Equal stamps are confirmed with a full element-wise comparison.
    Structural,
}

#[inline]
fn f32_slice_eq(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    indices: Vec<i32>,
    vertices: Vec<f32>,
    area_types: Vec<AreaType>,
}

impl Mesh {
    /// Panics when the buffers do not describe whole triangles.
    pub fn new(indices: Vec<i32>, vertices: Vec<f32>, area_types: Vec<AreaType>) -> Self {
        assert_eq!(
            indices.len(),
            area_types.len() * 3,
            "each triangle needs three indices and one area type"
        );
        assert_eq!(vertices.len() % 3, 0, "vertices are xyz triples");
        Self {
            indices,
            vertices,
            area_types,
        }
    }

    #[inline]
    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    #[inline]
    pub fn area_types(&self) -> &[AreaType] {
        &self.area_types
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.area_types.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.indices.len() == other.indices.len()
            && self.vertices.len() == other.vertices.len()
            && self.area_types.len() == other.area_types.len()
    }

    fn heap_bytes(&self) -> usize {
        slice_bytes(&self.indices) + slice_bytes(&self.vertices) + slice_bytes(&self.area_types)
    }
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(other)
            && self.indices == other.indices
            && self.area_types == other.area_types
            && f32_slice_eq(&self.vertices, &other.vertices)
    }
}

impl Eq for Mesh {}

#[derive(Clone, Copy, Debug, Default)]
pub struct Water {
    pub cell_size: i32,
    pub level: f32,
}

impl PartialEq for Water {
    fn eq(&self, other: &Self) -> bool {
        self.cell_size == other.cell_size && self.level.to_bits() == other.level.to_bits()
    }
}

impl Eq for Water {}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellWater {
    pub cell_position: Vec2i,
    pub water: Water,
}

/// Terrain height samples of one cell (or a sub-rectangle of it).
#[derive(Clone, Debug, Default)]
pub struct Heightfield {
    pub cell_position: Vec2i,
    pub cell_size: i32,
    /// Samples per side of the grid.
    pub length: u8,
    pub min_height: f32,
    pub max_height: f32,
    pub heights: Vec<f32>,
    /// Samples per side of the source terrain before cropping.
    pub original_size: usize,
    pub min_x: u8,
    pub min_y: u8,
}

impl PartialEq for Heightfield {
    fn eq(&self, other: &Self) -> bool {
        self.heights.len() == other.heights.len()
            && self.cell_position == other.cell_position
            && self.cell_size == other.cell_size
            && self.length == other.length
            && self.min_height.to_bits() == other.min_height.to_bits()
            && self.max_height.to_bits() == other.max_height.to_bits()
            && self.original_size == other.original_size
            && self.min_x == other.min_x
            && self.min_y == other.min_y
            && f32_slice_eq(&self.heights, &other.heights)
    }
}

impl Eq for Heightfield {}

/// Cell covered by a single flat plane.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatHeightfield {
    pub cell_position: Vec2i,
    pub cell_size: i32,
    pub height: f32,
}

impl PartialEq for FlatHeightfield {
    fn eq(&self, other: &Self) -> bool {
        self.cell_position == other.cell_position
            && self.cell_size == other.cell_size
            && self.height.to_bits() == other.height.to_bits()
    }
}

impl Eq for FlatHeightfield {}

/// Immutable geometry snapshot of one tile: the input of a navmesh bake.
///
/// `PartialEq` is full structural equality (version stamp included). The tile
/// cache goes through [`RecastMesh::matches`] instead, which can short-circuit
/// on the version stamp.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecastMesh {
    version: Version,
    mesh: Mesh,
    water: Vec<CellWater>,
    heightfields: Vec<Heightfield>,
    flat_heightfields: Vec<FlatHeightfield>,
}

impl RecastMesh {
    pub fn new(
        version: Version,
        mesh: Mesh,
        water: Vec<CellWater>,
        heightfields: Vec<Heightfield>,
        flat_heightfields: Vec<FlatHeightfield>,
    ) -> Self {
        Self {
            version,
            mesh,
            water,
            heightfields,
            flat_heightfields,
        }
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[inline]
    pub fn water(&self) -> &[CellWater] {
        &self.water
    }

    #[inline]
    pub fn heightfields(&self) -> &[Heightfield] {
        &self.heightfields
    }

    #[inline]
    pub fn flat_heightfields(&self) -> &[FlatHeightfield] {
        &self.flat_heightfields
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.triangle_count() == 0
            && self.water.is_empty()
            && self.heightfields.is_empty()
            && self.flat_heightfields.is_empty()
    }

    /// Cache-side equality.
    ///
    /// Version stamps are checked first. With [`MeshComparison::TrustVersion`]
    /// that is the whole test. With [`MeshComparison::Structural`] sequence
    /// lengths are compared next and element data last, bailing out on the
    /// first difference.
    pub fn matches(&self, other: &Self, comparison: MeshComparison) -> bool {
        if self.version.generation != other.version.generation {
            return false;
        }
        if self.version.revision != other.version.revision {
            return false;
        }
        match comparison {
            MeshComparison::TrustVersion => true,
            MeshComparison::Structural => self.same_lengths(other) && self.same_content(other),
        }
    }

    fn same_lengths(&self, other: &Self) -> bool {
        self.mesh.same_shape(&other.mesh)
            && self.water.len() == other.water.len()
            && self.heightfields.len() == other.heightfields.len()
            && self.flat_heightfields.len() == other.flat_heightfields.len()
    }

    fn same_content(&self, other: &Self) -> bool {
        self.mesh == other.mesh
            && self.water == other.water
            && self.heightfields == other.heightfields
            && self.flat_heightfields == other.flat_heightfields
    }

    /// Bytes owned on the heap, excluding the inline struct.
    pub fn heap_bytes(&self) -> usize {
        self.mesh.heap_bytes()
            + slice_bytes(&self.water)
            + slice_bytes(&self.heightfields)
            + self
                .heightfields
                .iter()
                .map(|h| slice_bytes(&h.heights))
                .sum::<usize>()
            + slice_bytes(&self.flat_heightfields)
    }
}

impl ByteSize for RecastMesh {
    fn byte_size(&self) -> usize {
        size_of::<Self>() + self.heap_bytes()
    }
}
