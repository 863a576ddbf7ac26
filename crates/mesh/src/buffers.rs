//! Flattening a [`Mesh`] into vertex and index buffers for the GPU layer.
//!
//! The GPU layer consumes one interleaved vertex stream and a `u32` index
//! list of triangles. Identical face corners share a vertex.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::collections::HashMap;

use crate::mesh::{Mesh, MeshError, VertexRef};

/// Interleaved vertex layout uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
    pub tangent: [f32; 3],
}

/// Vertex and index buffers ready for upload.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Byte stride of one [`GpuVertex`].
    pub const STRIDE: usize = std::mem::size_of::<GpuVertex>();

    /// Flatten a mesh, fan-splitting polygons and deduplicating corners.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self, MeshError> {
        mesh.check_indices()?;

        let mut buffers = Self {
            vertices: Vec::with_capacity(mesh.positions.len()),
            indices: Vec::with_capacity(mesh.triangle_count() * 3),
        };
        let mut seen: HashMap<VertexRef, u32> = HashMap::new();

        for face in &mesh.faces {
            for tri in face.fan() {
                for corner in tri {
                    let key = face.vertices[corner];
                    let index = match seen.get(&key) {
                        Some(&i) => i,
                        None => {
                            let i = buffers.vertices.len() as u32;
                            buffers.vertices.push(gpu_vertex(mesh, key));
                            seen.insert(key, i);
                            i
                        }
                    };
                    buffers.indices.push(index);
                }
            }
        }

        tracing::debug!(
            vertices = buffers.vertices.len(),
            indices = buffers.indices.len(),
            "flattened mesh buffers"
        );
        Ok(buffers)
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn gpu_vertex(mesh: &Mesh, key: VertexRef) -> GpuVertex {
    let p = key.position as usize;
    let normal = key
        .normal
        .map_or(Vec3::ZERO, |n| mesh.normals[n as usize]);
    let texcoord = key
        .texcoord
        .map_or(Vec2::ZERO, |t| mesh.texcoords[t as usize]);
    let tangent = mesh.tangents.get(p).copied().unwrap_or(Vec3::ZERO);
    GpuVertex {
        position: mesh.positions[p].to_array(),
        normal: normal.to_array(),
        texcoord: texcoord.to_array(),
        tangent: tangent.to_array(),
    }
}
