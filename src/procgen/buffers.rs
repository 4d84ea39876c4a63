//! Mesh buffers shared by ribbons and junctions, and the sink they are pushed to.

use bevy::prelude::*;

/// Submesh holding road ribbon triangles (road material).
pub const ROAD_SUBMESH: usize = 0;
/// Submesh holding junction fan triangles (junction material).
pub const JUNCTION_SUBMESH: usize = 1;

/// Vertex, UV and per-submesh index buffers of one road.
///
/// Both submeshes index into the same vertex and UV arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub submeshes: [Vec<u32>; 2],
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self, submesh: usize) -> usize {
        self.submeshes[submesh].len() / 3
    }

    /// Triangles of one submesh as vertex index triples.
    pub fn triangles(&self, submesh: usize) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.submeshes[submesh]
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    pub(crate) fn push_vertex(&mut self, position: Vec3, uv: Vec2) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.uvs.push(uv);
        index
    }

    pub(crate) fn push_triangle(&mut self, submesh: usize, triangle: [u32; 3]) {
        self.submeshes[submesh].extend_from_slice(&triangle);
    }

    pub fn push_to<S: MeshSink + ?Sized>(&self, sink: &mut S) {
        sink.set_submeshes(&self.vertices, &self.submeshes, &self.uvs);
    }
}

/// Receiver of generated mesh data, e.g. a render mesh.
///
/// The sink is responsible for normals and tangents.
pub trait MeshSink {
    fn set_submeshes(&mut self, vertices: &[Vec3], submeshes: &[Vec<u32>], uvs: &[Vec2]);
}

/// Copies the pushed buffers, replacing previous contents.
impl MeshSink for MeshBuffers {
    fn set_submeshes(&mut self, vertices: &[Vec3], submeshes: &[Vec<u32>], uvs: &[Vec2]) {
        self.vertices = vertices.to_vec();
        self.uvs = uvs.to_vec();
        for (slot, indices) in self.submeshes.iter_mut().zip(submeshes) {
            *slot = indices.clone();
        }
    }
}
