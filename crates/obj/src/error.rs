use objkit_mesh::MeshError;
use std::path::PathBuf;

/// Coarse classification of an [`ObjError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileNotFound,
    Io,
    MalformedLine,
    InvalidFaceArity,
    DanglingIndex,
}

/// Errors from the OBJ pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{stage} stage: malformed line {line}: {reason}")]
    MalformedLine {
        stage: &'static str,
        line: usize,
        reason: String,
    },
    #[error("face on line {line} has {arity} vertices, expected 3 or 4")]
    InvalidFaceArity { line: usize, arity: usize },
    #[error(transparent)]
    DanglingIndex(#[from] MeshError),
}

impl ObjError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ObjError::FileNotFound { .. } => ErrorKind::FileNotFound,
            ObjError::Io { .. } => ErrorKind::Io,
            ObjError::MalformedLine { .. } => ErrorKind::MalformedLine,
            ObjError::InvalidFaceArity { .. } => ErrorKind::InvalidFaceArity,
            ObjError::DanglingIndex(_) => ErrorKind::DanglingIndex,
        }
    }

    /// Source line the error points at, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ObjError::MalformedLine { line, .. } | ObjError::InvalidFaceArity { line, .. } => {
                Some(*line)
            }
            ObjError::DanglingIndex(MeshError::DanglingIndex { line, .. }) => Some(*line),
            ObjError::FileNotFound { .. } | ObjError::Io { .. } => None,
        }
    }
}
