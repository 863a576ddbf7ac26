//! Pipeline stages. Each one extends the context with one category of data.

mod generality;
mod location;
mod normal;
mod quad;
mod tangent;
mod texcoord;
mod topology;

pub use generality::GeneralityParser;
pub use location::LocationParser;
pub use normal::NormalParser;
pub use quad::Quad2TriangleParser;
pub use tangent::TangentParser;
pub use texcoord::TexCoordParser;
pub use topology::MeshParser;

pub(crate) use tangent::normalize_tangents;

use crate::context::{ParseContext, SourceLine};
use crate::error::ObjError;

/// One step of the OBJ pipeline.
///
/// Stages mutate the shared context in place. Records belonging to other
/// stages are skipped; a malformed record of the stage's own tag fails it.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, ctx: &mut ParseContext) -> Result<(), ObjError>;
}

pub(crate) fn malformed(stage: &'static str, line: &SourceLine, reason: impl Into<String>) -> ObjError {
    ObjError::MalformedLine {
        stage,
        line: line.number,
        reason: reason.into(),
    }
}

/// Parse exactly `N` finite floats from a record's fields.
pub(crate) fn parse_floats<const N: usize>(
    stage: &'static str,
    line: &SourceLine,
) -> Result<[f32; N], ObjError> {
    if line.fields.len() != N {
        return Err(malformed(
            stage,
            line,
            format!(
                "`{}` expects {} fields, found {}",
                line.tag,
                N,
                line.fields.len()
            ),
        ));
    }
    let mut out = [0.0f32; N];
    for (slot, token) in out.iter_mut().zip(&line.fields) {
        let value: f32 = token
            .parse()
            .map_err(|_| malformed(stage, line, format!("`{token}` is not a number")))?;
        if !value.is_finite() {
            return Err(malformed(stage, line, format!("`{token}` is not finite")));
        }
        *slot = value;
    }
    Ok(out)
}
