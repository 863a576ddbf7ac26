use anyhow::Context;
use clap::{Parser, Subcommand};
use objkit_mesh::{MeshBuffers, MeshSummary};
use objkit_obj::{ObjPipeline, PipelineConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "objkit", about = "CLI tool for OBJ mesh loading")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Pipeline config (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keep quads instead of splitting them into triangles
    #[arg(long, global = true)]
    no_triangulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Parse a file and print a summary of the mesh
    Inspect {
        file: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse each file and report OK or the first error
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse a file and write the mesh as JSON
    Export {
        file: PathBuf,
        /// Output path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Parse a file and report the GPU buffer layout
    Buffers { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if cli.no_triangulate {
        config.triangulate = false;
    }
    let pipeline = ObjPipeline::new(config);
    tracing::debug!(stages = ?pipeline.stage_names(), "pipeline ready");

    match cli.command {
        Commands::Info => {
            println!("objkit v{}", env!("CARGO_PKG_VERSION"));
            println!("mesh: {}", objkit_mesh::crate_info());
            println!("obj: {}", objkit_obj::crate_info());
            println!("stages: {}", pipeline.stage_names().join(" -> "));
        }
        Commands::Inspect { file, json } => {
            let mesh = pipeline
                .parse(&file)
                .with_context(|| format!("parsing {}", file.display()))?;
            let summary = MeshSummary::of(&mesh);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
                println!("  hash={:#018x}", mesh.content_hash());
            }
        }
        Commands::Validate { files } => {
            let mut failed = 0usize;
            for file in &files {
                match pipeline.parse(file) {
                    Ok(_) => println!("OK   {}", file.display()),
                    Err(err) => {
                        failed += 1;
                        println!("FAIL {}: {err}", file.display());
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} of {} files failed validation", files.len());
            }
        }
        Commands::Export { file, out } => {
            let mesh = pipeline
                .parse(&file)
                .with_context(|| format!("parsing {}", file.display()))?;
            let writer = std::fs::File::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            serde_json::to_writer_pretty(writer, &mesh)?;
            println!(
                "Exported {} ({} faces) to {}",
                mesh.name,
                mesh.faces.len(),
                out.display()
            );
        }
        Commands::Buffers { file } => {
            let mesh = pipeline
                .parse(&file)
                .with_context(|| format!("parsing {}", file.display()))?;
            let buffers = MeshBuffers::from_mesh(&mesh)?;
            println!(
                "vertices={} indices={} triangles={} stride={}",
                buffers.vertices.len(),
                buffers.indices.len(),
                buffers.triangle_count(),
                MeshBuffers::STRIDE
            );
            println!(
                "vertex_bytes={} index_bytes={}",
                buffers.vertex_bytes().len(),
                buffers.index_bytes().len()
            );
        }
    }

    Ok(())
}
