use glam::{Vec2, Vec3};
use objkit_mesh::{Attribute, MeshError, VertexRef};

use super::Stage;
use crate::context::ParseContext;
use crate::error::ObjError;

/// Below this the texcoord system has no usable solution.
const DEGENERATE_EPSILON: f32 = 1e-8;

/// Accumulates per-position tangents from triangle edges and texcoord deltas.
///
/// Polygons are walked as fans `(0, i, i + 1)`, so quads contribute the same
/// triangles whether or not they were split earlier. Triangles lacking
/// texcoords on any corner, or with a singular texcoord system, contribute
/// nothing. The sums are left unnormalized; the pipeline normalizes them
/// once every face has been visited. The first usable contribution of each
/// position is kept alongside, for sums that cancel out (mirrored UVs).
#[derive(Debug, Default, Clone, Copy)]
pub struct TangentParser;

impl Stage for TangentParser {
    fn name(&self) -> &'static str {
        "tangent"
    }

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError> {
        let mesh = &ctx.mesh;
        let mut tangents = vec![Vec3::ZERO; mesh.positions.len()];
        let mut fallbacks: Vec<Option<Vec3>> = vec![None; mesh.positions.len()];
        let mut contributing = 0usize;
        let mut degenerate = 0usize;
        let mut untextured = 0usize;

        for face in &mesh.faces {
            for tri in face.fan() {
                let corners = tri.map(|i| face.vertices[i]);
                let Some(uvs) = texcoords(&mesh.texcoords, &corners, face.line)? else {
                    untextured += 1;
                    continue;
                };
                let mut positions = [Vec3::ZERO; 3];
                for (slot, corner) in positions.iter_mut().zip(&corners) {
                    *slot = fetch(&mesh.positions, corner.position, Attribute::Position, face.line)?;
                }
                match triangle_tangent(positions, uvs) {
                    Some(t) => {
                        for corner in &corners {
                            let at = corner.position as usize;
                            tangents[at] += t;
                            if fallbacks[at].is_none() {
                                fallbacks[at] = Some(t);
                            }
                        }
                        contributing += 1;
                    }
                    None => degenerate += 1,
                }
            }
        }

        tracing::debug!(
            contributing,
            degenerate,
            untextured,
            "accumulated tangents"
        );
        ctx.mesh.tangents = tangents;
        ctx.tangent_fallbacks = fallbacks;
        ctx.tangents_accumulated = true;
        Ok(())
    }
}

/// Solve the two-edge system for one triangle.
fn triangle_tangent(p: [Vec3; 3], uv: [Vec2; 3]) -> Option<Vec3> {
    let e1 = p[1] - p[0];
    let e2 = p[2] - p[0];
    let d1 = uv[1] - uv[0];
    let d2 = uv[2] - uv[0];
    let r = d1.x * d2.y - d2.x * d1.y;
    if r.abs() < DEGENERATE_EPSILON {
        return None;
    }
    Some((e1 * d2.y - e2 * d1.y) / r)
}

fn texcoords(
    texcoords: &[Vec2],
    corners: &[VertexRef; 3],
    line: usize,
) -> Result<Option<[Vec2; 3]>, ObjError> {
    let mut out = [Vec2::ZERO; 3];
    for (slot, corner) in out.iter_mut().zip(corners) {
        let Some(t) = corner.texcoord else {
            return Ok(None);
        };
        *slot = fetch(texcoords, t, Attribute::TexCoord, line)?;
    }
    Ok(Some(out))
}

fn fetch<T: Copy>(items: &[T], index: u32, attribute: Attribute, line: usize) -> Result<T, ObjError> {
    items.get(index as usize).copied().ok_or_else(|| {
        MeshError::DanglingIndex {
            line,
            attribute,
            index: index as usize + 1,
            len: items.len(),
        }
        .into()
    })
}

/// Finishing step: scale accumulated tangents to unit length.
///
/// A sum that cancelled to (near) zero takes the direction of its position's
/// first contribution. Tangents that received no usable contribution stay
/// zero.
pub(crate) fn normalize_tangents(tangents: &mut [Vec3], fallbacks: &[Option<Vec3>]) {
    for (i, t) in tangents.iter_mut().enumerate() {
        let fallback = fallbacks.get(i).copied().flatten();
        *t = if t.length() > DEGENERATE_EPSILON {
            t.normalize()
        } else {
            fallback.map_or(Vec3::ZERO, Vec3::normalize_or_zero)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::stages::{LocationParser, MeshParser, TexCoordParser};

    fn accumulate(text: &str) -> Result<ParseContext, ObjError> {
        let mut ctx = ParseContext::from_source("a.obj", text);
        LocationParser.parse(&mut ctx)?;
        MeshParser.parse(&mut ctx)?;
        TexCoordParser.parse(&mut ctx)?;
        TangentParser.parse(&mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn axis_aligned_triangle_tangent_follows_u() {
        let ctx = accumulate("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n")
            .unwrap();
        assert!(ctx.tangents_accumulated);
        assert_eq!(ctx.mesh.tangents, vec![Vec3::X; 3]);
    }

    #[test]
    fn scaled_uvs_leave_unnormalized_sum() {
        let ctx = accumulate("v 0 0 0\nv 2 0 0\nv 0 2 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n")
            .unwrap();
        assert_eq!(ctx.mesh.tangents[0], Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn shared_vertices_sum_contributions() {
        // Second triangle maps u along +y, so vertex 1 collects both directions.
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv -1 0 0\n\
                    vt 0 0\nvt 1 0\nvt 0 1\nvt 0 -1\n\
                    f 1/1 2/2 3/3\nf 1/1 3/2 4/4\n";
        let ctx = accumulate(text).unwrap();
        let t = ctx.mesh.tangents[0];
        assert!((t - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6, "{t:?}");
    }

    #[test]
    fn mirrored_uvs_keep_first_contribution_when_sum_cancels() {
        // Both triangles are valid but map u in opposite directions, so the
        // shared vertices 1 and 2 sum to zero.
        let text = "v 0 0 0\nv 0 1 0\nv 1 0 0\nv -1 0 0\n\
                    vt 0 0\nvt 0 1\nvt 1 0\nvt 1 0\n\
                    f 1/1 3/3 2/2\nf 1/1 2/2 4/4\n";
        let mut ctx = accumulate(text).unwrap();
        assert_eq!(ctx.mesh.tangents[0], Vec3::ZERO);
        assert_eq!(ctx.tangent_fallbacks[0], Some(Vec3::X));
        assert_eq!(ctx.tangent_fallbacks[3], Some(Vec3::NEG_X));

        normalize_tangents(&mut ctx.mesh.tangents, &ctx.tangent_fallbacks);
        assert_eq!(
            ctx.mesh.tangents,
            vec![Vec3::X, Vec3::X, Vec3::X, Vec3::NEG_X]
        );
    }

    #[test]
    fn degenerate_texcoords_contribute_zero() {
        let ctx = accumulate("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5\nf 1/1 2/1 3/1\n").unwrap();
        assert_eq!(ctx.mesh.tangents, vec![Vec3::ZERO; 3]);
        assert_eq!(ctx.tangent_fallbacks, vec![None; 3]);
    }

    #[test]
    fn untextured_faces_contribute_zero() {
        let ctx = accumulate("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(ctx.mesh.tangents, vec![Vec3::ZERO; 3]);
    }

    #[test]
    fn dangling_texcoord_is_reported() {
        let err = accumulate("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/2 3/1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DanglingIndex);
        assert!(err.to_string().contains("texcoord 2"));
    }

    #[test]
    fn normalization_yields_unit_or_zero() {
        let mut tangents = vec![Vec3::new(3.0, 4.0, 0.0), Vec3::ZERO, Vec3::splat(1e-10)];
        normalize_tangents(&mut tangents, &[None, None, None]);
        assert!((tangents[0].length() - 1.0).abs() < 1e-6);
        assert_eq!(tangents[1], Vec3::ZERO);
        assert_eq!(tangents[2], Vec3::ZERO);
    }
}
