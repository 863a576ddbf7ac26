use std::collections::BTreeSet;

use super::{Stage, malformed};
use crate::context::{ParseContext, RecordCounts};
use crate::error::ObjError;

/// Record tags that are understood but carry nothing this pipeline keeps.
const IGNORED_TAGS: &[&str] = &["g", "s", "l", "p", "usemtl", "vp"];

/// Counts records, names the mesh and reserves capacity for later stages.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeneralityParser;

impl Stage for GeneralityParser {
    fn name(&self) -> &'static str {
        "generality"
    }

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError> {
        let mut counts = RecordCounts::default();
        let mut object_name: Option<String> = None;
        let mut unknown: BTreeSet<&str> = BTreeSet::new();

        for line in ctx.lines() {
            match line.tag.as_str() {
                "v" => counts.positions += 1,
                "vn" => counts.normals += 1,
                "vt" => counts.texcoords += 1,
                "f" => counts.faces += 1,
                "o" => {
                    if line.fields.is_empty() {
                        return Err(malformed(self.name(), line, "object record without a name"));
                    }
                    counts.objects += 1;
                    if object_name.is_none() {
                        object_name = Some(line.fields.join(" "));
                    }
                }
                "mtllib" => counts
                    .material_libraries
                    .extend(line.fields.iter().cloned()),
                tag if IGNORED_TAGS.contains(&tag) => {}
                tag => {
                    unknown.insert(tag);
                }
            }
        }
        for tag in unknown {
            tracing::debug!(tag, "skipping unsupported record tag");
        }

        let name = object_name
            .or_else(|| {
                ctx.source()
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "unnamed".into());

        tracing::debug!(
            %name,
            positions = counts.positions,
            normals = counts.normals,
            texcoords = counts.texcoords,
            faces = counts.faces,
            "counted records"
        );

        let mesh = &mut ctx.mesh;
        mesh.name = name;
        mesh.positions.reserve(counts.positions);
        mesh.normals.reserve(counts.normals);
        mesh.texcoords.reserve(counts.texcoords);
        mesh.faces.reserve(counts.faces);
        ctx.counts = counts;
        Ok(())
    }
}
