use objkit_mesh::Face;

use super::Stage;
use crate::context::ParseContext;
use crate::error::ObjError;

/// Splits quads into triangles along the 0-2 diagonal.
///
/// A quad `(a, b, c, d)` becomes `(a, b, c)` and `(a, c, d)`. Triangles pass
/// through; any other arity fails with [`ObjError::InvalidFaceArity`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Quad2TriangleParser;

impl Stage for Quad2TriangleParser {
    fn name(&self) -> &'static str {
        "quad2triangle"
    }

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError> {
        let faces = std::mem::take(&mut ctx.mesh.faces);
        let mut out = Vec::with_capacity(faces.len() * 2);
        let mut split = 0usize;

        for face in faces {
            match face.arity() {
                3 => out.push(face),
                4 => {
                    let [a, b, c, d] = [0, 1, 2, 3].map(|i| face.vertices[i]);
                    tracing::trace!(line = face.line, "splitting quad");
                    out.push(Face {
                        vertices: vec![a, b, c],
                        line: face.line,
                        material: face.material,
                    });
                    out.push(Face {
                        vertices: vec![a, c, d],
                        ..face
                    });
                    split += 1;
                }
                arity => {
                    return Err(ObjError::InvalidFaceArity {
                        line: face.line,
                        arity,
                    });
                }
            }
        }

        tracing::debug!(split, faces = out.len(), "triangulated quads");
        ctx.mesh.faces = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stages::MeshParser;

    fn run(text: &str) -> Result<ParseContext, ObjError> {
        let mut ctx = ParseContext::from_source("a.obj", text);
        MeshParser.parse(&mut ctx)?;
        Quad2TriangleParser.parse(&mut ctx)?;
        Ok(ctx)
    }

    fn corners(ctx: &ParseContext) -> Vec<Vec<u32>> {
        ctx.mesh
            .faces
            .iter()
            .map(|f| f.vertices.iter().map(|v| v.position + 1).collect())
            .collect()
    }

    #[test]
    fn quad_splits_on_fixed_diagonal() {
        let ctx = run("f 1 2 3 4\n").unwrap();
        assert_eq!(corners(&ctx), vec![vec![1, 2, 3], vec![1, 3, 4]]);
    }

    #[test]
    fn triangles_pass_through_in_order() {
        let ctx = run("f 1 2 3\nf 4 5 6 7\nf 7 8 9\n").unwrap();
        assert_eq!(
            corners(&ctx),
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![4, 6, 7], vec![7, 8, 9]]
        );
    }

    #[test]
    fn split_faces_keep_line_and_material() {
        let ctx = run("usemtl stone\nf 1/1/1 2/2/1 3/3/1 4/4/1\n").unwrap();
        for face in &ctx.mesh.faces {
            assert_eq!(face.line, 2);
            assert_eq!(face.material, Some(0));
            assert!(face.vertices.iter().all(|v| v.normal == Some(0)));
        }
        assert_eq!(ctx.mesh.faces[1].vertices[2].texcoord, Some(3));
    }

    #[test]
    fn pentagon_is_invalid_arity() {
        let err = run("f 1 2 3\nf 1 2 3 4 5\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFaceArity);
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("5 vertices"));
    }
}
