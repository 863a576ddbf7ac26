//! OBJ loading: a staged pipeline over one shared parse context.
//!
//! # Invariants
//! - Each stage reads only its own record tag and skips the rest.
//! - The first failing stage aborts the parse; no partial mesh escapes.
//! - A returned mesh is index-consistent and its tangents are normalized.
//!
//! # Stage order
//! generality, location, mesh, normal, texcoord, quad2triangle (optional),
//! tangent, then the finishing step (index check, tangent normalization).

mod config;
mod context;
mod error;
mod pipeline;
pub mod stages;

pub use config::{ConfigError, PipelineConfig};
pub use context::{ParseContext, RecordCounts, SourceLine};
pub use error::{ErrorKind, ObjError};
pub use pipeline::{ObjPipeline, ParseResult};
pub use stages::Stage;

pub fn crate_info() -> &'static str {
    "objkit-obj v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("obj"));
    }
}
