use objkit_mesh::{Face, VertexRef};
use std::num::IntErrorKind;

use super::{Stage, malformed};
use crate::context::{ParseContext, SourceLine};
use crate::error::ObjError;

const STAGE: &str = "mesh";

/// Reads `f` face records and `usemtl` material switches.
///
/// Corners are `v`, `v/vt`, `v//vn` or `v/vt/vn`; a trailing empty slot
/// (`1/`, `1//`) is malformed. Negative indices count back from the records
/// defined so far. Upper bounds are checked when the pipeline finishes, once
/// every attribute sequence is complete, so an index too large for `u32` is
/// kept as `u32::MAX` and reported there as dangling.
///
/// Faces with fewer than 3 corners fail here as malformed; the
/// quad-to-triangle stage only ever sees faces of arity 3 or more.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshParser;

/// Attribute records seen before the current line.
#[derive(Debug, Default, Clone, Copy)]
struct Defined {
    positions: usize,
    texcoords: usize,
    normals: usize,
}

impl Stage for MeshParser {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError> {
        let mut defined = Defined::default();
        let mut materials = std::mem::take(&mut ctx.mesh.materials);
        let mut current_material: Option<usize> = None;
        let mut faces = Vec::with_capacity(ctx.counts.faces);

        for line in ctx.lines() {
            match line.tag.as_str() {
                "v" => defined.positions += 1,
                "vt" => defined.texcoords += 1,
                "vn" => defined.normals += 1,
                "usemtl" => {
                    let name = line.fields.join(" ");
                    if name.is_empty() {
                        return Err(malformed(STAGE, line, "`usemtl` without a material name"));
                    }
                    let index = match materials.iter().position(|m| *m == name) {
                        Some(i) => i,
                        None => {
                            materials.push(name);
                            materials.len() - 1
                        }
                    };
                    current_material = Some(index);
                }
                "f" => {
                    let mut face = parse_face(line, defined)?;
                    face.material = current_material;
                    faces.push(face);
                }
                _ => {}
            }
        }

        tracing::debug!(
            faces = faces.len(),
            materials = materials.len(),
            "parsed face topology"
        );
        ctx.mesh.faces.extend(faces);
        ctx.mesh.materials = materials;
        Ok(())
    }
}

fn parse_face(line: &SourceLine, defined: Defined) -> Result<Face, ObjError> {
    if line.fields.len() < 3 {
        return Err(malformed(
            STAGE,
            line,
            format!("face needs at least 3 vertices, found {}", line.fields.len()),
        ));
    }
    let vertices = line
        .fields
        .iter()
        .map(|token| parse_corner(line, token, defined))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Face::new(vertices, line.number))
}

fn parse_corner(line: &SourceLine, token: &str, defined: Defined) -> Result<VertexRef, ObjError> {
    let slots: Vec<&str> = token.split('/').collect();
    let bad = |reason: &str| malformed(STAGE, line, format!("`{token}` {reason}"));
    let (position, texcoord, normal) = match slots.as_slice() {
        [v] => (*v, "", ""),
        [v, vt] => (*v, *vt, ""),
        [v, vt, vn] => (*v, *vt, *vn),
        _ => return Err(bad("has more than three index slots")),
    };
    if position.is_empty() {
        return Err(bad("has no position index"));
    }
    if slots.last().is_some_and(|s| s.is_empty()) {
        return Err(bad("ends with an empty index slot"));
    }
    let optional = |raw: &str, defined: usize| -> Result<Option<u32>, ObjError> {
        if raw.is_empty() {
            Ok(None)
        } else {
            resolve(line, token, raw, defined).map(Some)
        }
    };
    Ok(VertexRef {
        position: resolve(line, token, position, defined.positions)?,
        texcoord: optional(texcoord, defined.texcoords)?,
        normal: optional(normal, defined.normals)?,
    })
}

/// Turn a 1-based or negative relative index into a zero-based one.
fn resolve(line: &SourceLine, token: &str, raw: &str, defined: usize) -> Result<u32, ObjError> {
    let value: i64 = match raw.parse() {
        Ok(v) => v,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => return Ok(u32::MAX),
        Err(_) => {
            return Err(malformed(
                STAGE,
                line,
                format!("`{token}` is not a valid index"),
            ));
        }
    };
    let resolved = match value {
        0 => return Err(malformed(STAGE, line, format!("`{token}` uses index 0"))),
        v if v > 0 => v - 1,
        v => defined as i64 + v,
    };
    if resolved < 0 {
        return Err(malformed(
            STAGE,
            line,
            format!("relative index {value} in `{token}` points before the first record"),
        ));
    }
    Ok(u32::try_from(resolved).unwrap_or(u32::MAX))
}
