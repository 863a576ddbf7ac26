//! Mesh data model shared by the OBJ pipeline and the GPU layer.
//!
//! # Invariants
//! - Face vertices reference attributes by zero-based index.
//! - Tangents are keyed by position index.
//! - A mesh handed to the GPU layer has passed [`Mesh::check_indices`].

mod buffers;
mod mesh;
mod summary;

pub use buffers::{GpuVertex, MeshBuffers};
pub use mesh::{Attribute, Face, Mesh, MeshError, VertexRef};
pub use summary::MeshSummary;

pub fn crate_info() -> &'static str {
    "objkit-mesh v0.1.0"
}
