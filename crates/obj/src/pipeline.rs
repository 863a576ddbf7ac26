use objkit_mesh::Mesh;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::context::ParseContext;
use crate::error::ObjError;
use crate::stages::{
    GeneralityParser, LocationParser, MeshParser, NormalParser, Quad2TriangleParser, Stage,
    TangentParser, TexCoordParser, normalize_tangents,
};

/// Outcome of one parse: the finished mesh or the failure that stopped it.
pub type ParseResult = Result<Mesh, ObjError>;

/// Ordered stage list run against one context per parse.
///
/// Stages run as generality, location, mesh, normal, texcoord, the optional
/// quad split, then tangent. Location runs early, not last, because
/// tangent generation reads the positions.
///
/// The pipeline holds no per-parse state, so one instance can serve
/// concurrent parses from several threads.
pub struct ObjPipeline {
    config: PipelineConfig,
    stages: Vec<Box<dyn Stage>>,
}

impl Default for ObjPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl ObjPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(GeneralityParser),
            Box::new(LocationParser),
            Box::new(MeshParser),
            Box::new(NormalParser),
            Box::new(TexCoordParser),
        ];
        if config.triangulate {
            stages.push(Box::new(Quad2TriangleParser));
        }
        stages.push(Box::new(TangentParser));
        Self { config, stages }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Names of the configured stages, in run order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Read and parse an OBJ file.
    pub fn parse(&self, path: impl AsRef<Path>) -> ParseResult {
        let path = path.as_ref();
        let _span = tracing::info_span!("obj_parse", source = %path.display()).entered();
        let ctx = ParseContext::from_path(path)?;
        self.run(ctx)
    }

    /// Parse in-memory OBJ text. `label` stands in for the file path.
    pub fn parse_source(&self, label: impl AsRef<Path>, text: &str) -> ParseResult {
        let label = label.as_ref();
        let _span = tracing::info_span!("obj_parse", source = %label.display()).entered();
        self.run(ParseContext::from_source(label, text))
    }

    fn run(&self, mut ctx: ParseContext) -> ParseResult {
        for stage in &self.stages {
            let _span = tracing::debug_span!("stage", name = stage.name()).entered();
            if let Err(err) = stage.parse(&mut ctx) {
                tracing::warn!(stage = stage.name(), error = %err, "stage failed, aborting parse");
                return Err(err);
            }
        }
        if let Err(err) = finish(&mut ctx) {
            tracing::warn!(error = %err, "mesh failed final validation");
            return Err(err);
        }

        let mesh = ctx.into_mesh();
        tracing::debug!(
            name = %mesh.name,
            positions = mesh.positions.len(),
            faces = mesh.faces.len(),
            hash = mesh.content_hash(),
            "parse complete"
        );
        Ok(mesh)
    }
}

/// Validate indices, then normalize the accumulated tangents.
fn finish(ctx: &mut ParseContext) -> Result<(), ObjError> {
    ctx.mesh.check_indices()?;
    if ctx.tangents_accumulated {
        normalize_tangents(&mut ctx.mesh.tangents, &ctx.tangent_fallbacks);
        ctx.tangents_accumulated = false;
    }
    Ok(())
}
