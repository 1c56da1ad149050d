//! Flattening of decoded meshes and collision volumes into plain triangle lists

use crate::nodes::{Collision, MeshChunk, PrimitiveType, Vertex};
use glam::{Vec2, Vec3};

/// Synthesizes triangle list indices for `count` vertices drawn with the given primitive.
///
/// Strips alternate their winding so every triangle keeps the orientation of the first one.
/// Primitives that don't make up triangles yield nothing.
///
/// ```
/// use vexx::{geometry::triangle_indices, nodes::PrimitiveType};
/// assert_eq!(triangle_indices(PrimitiveType::TriangleStrip, 4), vec![0, 1, 2, 2, 1, 3]);
/// assert_eq!(triangle_indices(PrimitiveType::TriangleFan, 4), vec![0, 1, 2, 0, 2, 3]);
/// ```
pub fn triangle_indices(primitive: PrimitiveType, count: usize) -> Vec<u32> {
    let count = count as u32;
    match primitive {
        PrimitiveType::Triangles => (0..count - count % 3).collect(),
        PrimitiveType::TriangleStrip => (0..count.saturating_sub(2))
            .flat_map(|j| match j % 2 {
                0 => [j, j + 1, j + 2],
                _ => [j + 1, j, j + 2],
            })
            .collect(),
        PrimitiveType::TriangleFan => (0..count.saturating_sub(2))
            .flat_map(|j| [0, j + 1, j + 2])
            .collect(),
        _ => Vec::new(),
    }
}

/// Vertex attribute arrays of a single mesh chunk, ready for a triangle list draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkGeometry {
    pub material_id: u8,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    /// Raw vertex colors, in their stored format
    pub colors: Option<Vec<u32>>,
    pub indices: Vec<u32>,
}

impl ChunkGeometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn attribute<T>(vertices: &[&Vertex], get: impl Fn(&Vertex) -> Option<T>) -> Option<Vec<T>> {
    vertices.iter().map(|&v| get(v)).collect()
}

/// Flattens a chunk. Both vertex groups share the attribute arrays but are assembled as separate
/// primitives. Invalid chunks and chunks without positions produce nothing.
pub fn chunk_geometry(chunk: &MeshChunk) -> Option<ChunkGeometry> {
    if !chunk.valid {
        return None;
    }

    let vertices: Vec<&Vertex> = chunk.vertices().collect();
    let positions = attribute(&vertices, |v| v.position)?;

    let mut indices = triangle_indices(chunk.primitive(), chunk.group1.len());
    let base = chunk.group1.len() as u32;
    indices.extend(
        triangle_indices(chunk.primitive(), chunk.group2.len())
            .into_iter()
            .map(|i| i + base),
    );

    Some(ChunkGeometry {
        material_id: chunk.header.material_id,
        positions,
        normals: attribute(&vertices, |v| v.normal),
        uvs: attribute(&vertices, |v| v.uv),
        colors: attribute(&vertices, |v| v.color),
        indices,
    })
}

/// All triangles of a collision volume. Blocks lacking either pool contribute nothing, as do
/// triangles referencing vertices that don't exist.
pub fn collision_triangles(collision: &Collision) -> Vec<[Vec3; 3]> {
    let mut triangles = Vec::new();
    for block in &collision.blocks {
        let (vertices, indices) = match (block.vertices(), block.indices()) {
            (Some(v), Some(i)) => (v, i),
            _ => continue,
        };
        triangles.extend(indices.iter().filter_map(|&[a, b, c]| {
            Some([
                *vertices.get(a as usize)?,
                *vertices.get(b as usize)?,
                *vertices.get(c as usize)?,
            ])
        }));
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DecodeOptions,
        nodes::{
            collision::tests::{quad_collision, read_collision},
            mesh::tests::{chunk_bytes, mesh_body, triangle_positions, POS_16},
            DecodeContext, Mesh,
        },
        range::{ByteRange, Endian},
        registry::Generation,
    };

    #[test]
    fn lists_drop_incomplete_triangles() {
        assert_eq!(triangle_indices(PrimitiveType::Triangles, 7), vec![0, 1, 2, 3, 4, 5]);
        assert!(triangle_indices(PrimitiveType::Triangles, 2).is_empty());
    }

    #[test]
    fn strips_alternate_winding() {
        assert_eq!(
            triangle_indices(PrimitiveType::TriangleStrip, 5),
            vec![0, 1, 2, 2, 1, 3, 2, 3, 4]
        );
        assert!(triangle_indices(PrimitiveType::TriangleStrip, 2).is_empty());
        assert!(triangle_indices(PrimitiveType::TriangleFan, 0).is_empty());
    }

    #[test]
    fn other_primitives_have_no_triangles() {
        assert!(triangle_indices(PrimitiveType::Lines, 6).is_empty());
        assert!(triangle_indices(PrimitiveType::Unknown(9), 6).is_empty());
    }

    fn read_mesh(chunks: &[Vec<u8>]) -> Mesh {
        let body = mesh_body(&[0], chunks);
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(Generation::V6, &options);
        Mesh::read(&mut ctx, &ByteRange::new(&body, Endian::Little)).unwrap()
    }

    #[test]
    fn chunk_to_triangles() {
        let mesh = read_mesh(&[chunk_bytes(0, 4, POS_16, (3, 0), 32, 1.0, &triangle_positions())]);
        let geometry = chunk_geometry(&mesh.chunks[0]).unwrap();

        assert_eq!(geometry.positions.len(), 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.triangle_count(), 1);
        assert!(geometry.normals.is_none());
        assert!(geometry.uvs.is_none());
    }

    #[test]
    fn invalid_chunks_are_skipped() {
        let mesh = read_mesh(&[chunk_bytes(0, 3, POS_16, (3, 0), 48, 1.0, &triangle_positions())]);
        assert!(!mesh.chunks[0].valid);
        assert!(chunk_geometry(&mesh.chunks[0]).is_none());
    }

    #[test]
    fn collision_quad() {
        let collision = read_collision(&quad_collision()).0.unwrap();
        let triangles = collision_triangles(&collision);

        assert_eq!(triangles.len(), 2);
        assert_eq!(
            triangles[1],
            [
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0)
            ]
        );
    }
}
