use glam::Vec3;
use objkit_mesh::Mesh;
use std::path::{Path, PathBuf};

use crate::error::ObjError;

/// One logical record of the source file: a tag and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based number of the physical line the record starts on.
    pub number: usize,
    pub tag: String,
    pub fields: Vec<String>,
}

/// Record counts gathered by the generality stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub positions: usize,
    pub normals: usize,
    pub texcoords: usize,
    pub faces: usize,
    pub objects: usize,
    pub material_libraries: Vec<String>,
}

/// State shared by every stage of one parse.
///
/// Created per parse and dropped once the mesh has been extracted.
#[derive(Debug)]
pub struct ParseContext {
    source: PathBuf,
    lines: Vec<SourceLine>,
    /// The mesh under construction.
    pub mesh: Mesh,
    /// Filled by the generality stage.
    pub counts: RecordCounts,
    /// Set once the tangent stage has accumulated unnormalized tangents.
    pub tangents_accumulated: bool,
    /// First usable contribution per position, used when opposing
    /// contributions cancel the accumulated sum.
    pub tangent_fallbacks: Vec<Option<Vec3>>,
}

impl ParseContext {
    /// Read a whole file into a new context.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ObjError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ObjError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ObjError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(Self::from_source(path, &text))
    }

    /// Build a context from in-memory text. `source` labels it in logs and
    /// supplies the fallback mesh name.
    pub fn from_source(source: impl AsRef<Path>, text: &str) -> Self {
        let lines = split_records(text);
        tracing::debug!(records = lines.len(), "loaded source records");
        Self {
            source: source.as_ref().to_path_buf(),
            lines,
            mesh: Mesh::default(),
            counts: RecordCounts::default(),
            tangents_accumulated: false,
            tangent_fallbacks: Vec::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All records in file order.
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Records carrying the given tag, in file order.
    pub fn records<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a SourceLine> + 'a {
        self.lines.iter().filter(move |l| l.tag == tag)
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

/// Strip comments and blank lines, join `\` continuations, split into tokens.
fn split_records(text: &str) -> Vec<SourceLine> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, raw) in text.lines().enumerate() {
        let content = raw.find('#').map_or(raw, |at| &raw[..at]).trim_end();
        let (start, mut buf) = pending.take().unwrap_or((i + 1, String::new()));
        match content.strip_suffix('\\') {
            Some(head) => {
                buf.push_str(head);
                buf.push(' ');
                pending = Some((start, buf));
            }
            None => {
                buf.push_str(content);
                push_record(&mut out, start, &buf);
            }
        }
    }
    if let Some((start, buf)) = pending {
        push_record(&mut out, start, &buf);
    }
    out
}

fn push_record(out: &mut Vec<SourceLine>, number: usize, text: &str) {
    let mut tokens = text.split_whitespace();
    if let Some(tag) = tokens.next() {
        out.push(SourceLine {
            number,
            tag: tag.to_string(),
            fields: tokens.map(str::to_string).collect(),
        });
    }
}
