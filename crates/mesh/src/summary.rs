use glam::Vec3;
use serde::Serialize;

use crate::mesh::Mesh;

/// Read-only overview of a mesh for tooling and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshSummary {
    pub name: String,
    pub positions: usize,
    pub normals: usize,
    pub texcoords: usize,
    pub tangents: usize,
    pub faces: usize,
    pub triangles: usize,
    pub quads: usize,
    /// Faces with five or more corners.
    pub polygons: usize,
    pub materials: usize,
    pub bounds: Option<(Vec3, Vec3)>,
}

impl MeshSummary {
    pub fn of(mesh: &Mesh) -> Self {
        let arity = |n: usize| mesh.faces.iter().filter(|f| f.arity() == n).count();
        let bounds = mesh.positions.split_first().map(|(first, rest)| {
            rest.iter()
                .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)))
        });
        Self {
            name: mesh.name.clone(),
            positions: mesh.positions.len(),
            normals: mesh.normals.len(),
            texcoords: mesh.texcoords.len(),
            tangents: mesh.tangents.len(),
            faces: mesh.faces.len(),
            triangles: mesh.triangle_count(),
            quads: arity(4),
            polygons: mesh.faces.iter().filter(|f| f.arity() > 4).count(),
            materials: mesh.materials.len(),
            bounds,
        }
    }
}

impl std::fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh: {}", self.name)?;
        writeln!(
            f,
            "  positions={} normals={} texcoords={} tangents={}",
            self.positions, self.normals, self.texcoords, self.tangents
        )?;
        writeln!(
            f,
            "  faces={} triangles={} quads={} polygons={} materials={}",
            self.faces, self.triangles, self.quads, self.polygons, self.materials
        )?;
        match self.bounds {
            Some((lo, hi)) => write!(
                f,
                "  bounds=({:.3}, {:.3}, {:.3})..({:.3}, {:.3}, {:.3})",
                lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
            ),
            None => write!(f, "  bounds=empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Face, VertexRef};

    #[test]
    fn empty_mesh_summary() {
        let summary = MeshSummary::of(&Mesh::new("empty"));
        assert_eq!(summary.faces, 0);
        assert_eq!(summary.bounds, None);
        assert!(summary.to_string().contains("bounds=empty"));
    }

    #[test]
    fn summary_counts_face_kinds_and_bounds() {
        let mut mesh = Mesh::new("mixed");
        mesh.positions = vec![
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, -2.0, 0.0),
            Vec3::new(0.0, 5.0, 1.0),
            Vec3::ZERO,
            Vec3::ONE,
        ];
        mesh.faces.push(Face::new((0..3).map(VertexRef::new).collect(), 1));
        mesh.faces.push(Face::new((0..4).map(VertexRef::new).collect(), 2));
        mesh.faces.push(Face::new((0..5).map(VertexRef::new).collect(), 3));

        let summary = MeshSummary::of(&mesh);
        assert_eq!(summary.faces, 3);
        assert_eq!(summary.triangles, 1 + 2 + 3);
        assert_eq!(summary.quads, 1);
        assert_eq!(summary.polygons, 1);
        assert_eq!(
            summary.bounds,
            Some((Vec3::new(-1.0, -2.0, 0.0), Vec3::new(3.0, 5.0, 2.0)))
        );
        assert!(summary.to_string().contains("Mesh: mixed"));
    }

    #[test]
    fn summary_serializes_to_json() {
        let json = serde_json::to_value(MeshSummary::of(&Mesh::new("j"))).unwrap();
        assert_eq!(json["name"], "j");
        assert!(json["bounds"].is_null());
    }
}
