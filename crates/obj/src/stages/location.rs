use glam::Vec3;

use super::{Stage, parse_floats};
use crate::context::ParseContext;
use crate::error::ObjError;

/// Reads `v x y z` position records.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationParser;

impl Stage for LocationParser {
    fn name(&self) -> &'static str {
        "location"
    }

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError> {
        let positions = ctx
            .records("v")
            .map(|line| parse_floats::<3>(self.name(), line).map(Vec3::from_array))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = positions.len(), "parsed positions");
        ctx.mesh.positions.extend(positions);
        Ok(())
    }
}
