use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Vertex attribute sequences a face can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Position,
    Normal,
    TexCoord,
    Tangent,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Position => "position",
            Attribute::Normal => "normal",
            Attribute::TexCoord => "texcoord",
            Attribute::Tangent => "tangent",
        };
        f.write_str(name)
    }
}

/// Errors from mesh consistency checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// `index` is one-based, as it appears in the source file.
    #[error("face on line {line} references {attribute} {index}, but only {len} are defined")]
    DanglingIndex {
        line: usize,
        attribute: Attribute,
        index: usize,
        len: usize,
    },
}

/// One corner of a face: zero-based indices into the mesh sequences.
///
/// The tangent of a corner is `tangents[position]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexRef {
    pub position: u32,
    pub texcoord: Option<u32>,
    pub normal: Option<u32>,
}

impl VertexRef {
    pub fn new(position: u32) -> Self {
        Self {
            position,
            texcoord: None,
            normal: None,
        }
    }
}

/// A polygon: an ordered list of corners plus its origin in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub vertices: Vec<VertexRef>,
    /// 1-based source line the face was read from.
    pub line: usize,
    /// Index into [`Mesh::materials`].
    pub material: Option<usize>,
}

impl Face {
    pub fn new(vertices: Vec<VertexRef>, line: usize) -> Self {
        Self {
            vertices,
            line,
            material: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.vertices.len()
    }

    /// Fan triangles `(0, i, i + 1)` as corner positions within this face.
    pub fn fan(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (1..self.vertices.len().saturating_sub(1)).map(|i| [0, i, i + 1])
    }
}

/// The in-memory mesh produced by the OBJ pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub tangents: Vec<Vec3>,
    pub faces: Vec<Face>,
    /// Material names in first-use order.
    pub materials: Vec<String>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of triangles once every face is fan-split.
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|f| f.arity().saturating_sub(2))
            .sum()
    }

    /// True when every face has exactly three corners.
    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(|f| f.arity() == 3)
    }

    /// Check every face corner against the attribute sequences.
    ///
    /// Tangents are only checked once they have been generated.
    pub fn check_indices(&self) -> Result<(), MeshError> {
        for face in &self.faces {
            for v in &face.vertices {
                check(face.line, Attribute::Position, v.position, self.positions.len())?;
                if let Some(t) = v.texcoord {
                    check(face.line, Attribute::TexCoord, t, self.texcoords.len())?;
                }
                if let Some(n) = v.normal {
                    check(face.line, Attribute::Normal, n, self.normals.len())?;
                }
                if !self.tangents.is_empty() {
                    check(face.line, Attribute::Tangent, v.position, self.tangents.len())?;
                }
            }
        }
        Ok(())
    }

    /// Content hash over every attribute value and face index.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        for seq in [&self.positions, &self.normals, &self.tangents] {
            hasher.update((seq.len() as u64).to_le_bytes());
            for v in seq {
                for c in v.to_array() {
                    hasher.update(c.to_le_bytes());
                }
            }
        }
        hasher.update((self.texcoords.len() as u64).to_le_bytes());
        for t in &self.texcoords {
            hasher.update(t.x.to_le_bytes());
            hasher.update(t.y.to_le_bytes());
        }
        hasher.update((self.faces.len() as u64).to_le_bytes());
        for face in &self.faces {
            hasher.update((face.vertices.len() as u32).to_le_bytes());
            for v in &face.vertices {
                hasher.update(v.position.to_le_bytes());
                hasher.update(v.texcoord.unwrap_or(u32::MAX).to_le_bytes());
                hasher.update(v.normal.unwrap_or(u32::MAX).to_le_bytes());
            }
            hasher.update(face.material.map_or(u64::MAX, |m| m as u64).to_le_bytes());
        }
        for m in &self.materials {
            hasher.update(m.as_bytes());
            hasher.update([0u8]);
        }
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        u64::from_le_bytes(bytes)
    }
}

fn check(line: usize, attribute: Attribute, index: u32, len: usize) -> Result<(), MeshError> {
    if (index as usize) < len {
        Ok(())
    } else {
        Err(MeshError::DanglingIndex {
            line,
            attribute,
            index: index as usize + 1,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new("tri");
        mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        mesh.faces.push(Face::new(
            vec![VertexRef::new(0), VertexRef::new(1), VertexRef::new(2)],
            4,
        ));
        mesh
    }

    #[test]
    fn valid_indices_pass() {
        assert!(triangle().check_indices().is_ok());
    }

    #[test]
    fn dangling_position_reports_one_based_index() {
        let mut mesh = triangle();
        mesh.faces[0].vertices[2].position = 98;
        assert_eq!(
            mesh.check_indices(),
            Err(MeshError::DanglingIndex {
                line: 4,
                attribute: Attribute::Position,
                index: 99,
                len: 3,
            })
        );
    }

    #[test]
    fn dangling_normal_detected() {
        let mut mesh = triangle();
        mesh.faces[0].vertices[0].normal = Some(0);
        let err = mesh.check_indices().unwrap_err();
        assert!(matches!(
            err,
            MeshError::DanglingIndex {
                attribute: Attribute::Normal,
                ..
            }
        ));
    }

    #[test]
    fn tangents_checked_only_once_present() {
        let mut mesh = triangle();
        mesh.tangents = vec![Vec3::X; 2];
        let err = mesh.check_indices().unwrap_err();
        assert!(err.to_string().contains("tangent 3"));
    }

    #[test]
    fn fan_of_quad_uses_first_corner() {
        let face = Face::new((0..4).map(VertexRef::new).collect(), 1);
        let fan: Vec<_> = face.fan().collect();
        assert_eq!(fan, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn triangle_count_counts_fan_splits() {
        let mut mesh = triangle();
        mesh.faces
            .push(Face::new((0..5).map(VertexRef::new).collect(), 5));
        assert_eq!(mesh.triangle_count(), 1 + 3);
        assert!(!mesh.is_triangulated());
    }

    #[test]
    fn content_hash_tracks_changes() {
        let a = triangle();
        let mut b = triangle();
        assert_eq!(a.content_hash(), b.content_hash());
        b.positions[1] = Vec3::new(2.0, 0.0, 0.0);
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
