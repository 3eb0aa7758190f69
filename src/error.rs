use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the hollow text pipeline.
#[derive(Debug, Error)]
pub enum HollowTextError {
    #[error(transparent)]
    Font(#[from] FontError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Errors raised while loading a font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("cannot read font file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font data is not a valid TrueType/OpenType font")]
    Parse,
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("ring needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}

/// Errors related to pipeline operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Errors raised while writing or reading STL data.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write STL to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read STL: {0}")]
    Read(#[source] std::io::Error),

    #[error("STL I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the external generator launcher.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed {
        program: String,
        status: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// Convenience type alias for results using [`HollowTextError`].
pub type Result<T> = std::result::Result<T, HollowTextError>;
