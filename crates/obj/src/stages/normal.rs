use glam::Vec3;

use super::{Stage, parse_floats};
use crate::context::ParseContext;
use crate::error::ObjError;

/// Reads `vn x y z` normal records. Normals are stored as written.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalParser;

impl Stage for NormalParser {
    fn name(&self) -> &'static str {
        "normal"
    }

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError> {
        let normals = ctx
            .records("vn")
            .map(|line| parse_floats::<3>(self.name(), line).map(Vec3::from_array))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = normals.len(), "parsed normals");
        ctx.mesh.normals.extend(normals);
        Ok(())
    }
}
