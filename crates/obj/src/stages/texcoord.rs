use glam::Vec2;

use super::{Stage, parse_floats};
use crate::context::ParseContext;
use crate::error::ObjError;

/// Reads `vt u v` texture coordinate records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TexCoordParser;

impl Stage for TexCoordParser {
    fn name(&self) -> &'static str {
        "texcoord"
    }

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError> {
        let texcoords = ctx
            .records("vt")
            .map(|line| parse_floats::<2>(self.name(), line).map(Vec2::from_array))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = texcoords.len(), "parsed texcoords");
        ctx.mesh.texcoords.extend(texcoords);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn reads_texcoords() {
        let mut ctx = ParseContext::from_source("a.obj", "vt 0 0\nvt 1 0.5\n");
        TexCoordParser.parse(&mut ctx).unwrap();
        assert_eq!(ctx.mesh.texcoords, vec![Vec2::ZERO, Vec2::new(1.0, 0.5)]);
    }

    #[test]
    fn three_component_texcoord_is_malformed() {
        let mut ctx = ParseContext::from_source("a.obj", "vt 0 0 0\n");
        let err = TexCoordParser.parse(&mut ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedLine);
        assert_eq!(err.line(), Some(1));
    }
}
