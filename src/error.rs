use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    // Input
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    // Traversal
    #[error("symlink loop: {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("depth limit {limit} exceeded at {}", .path.display())]
    DepthExceeded { path: PathBuf, limit: usize },

    #[error("walk error: {0}")]
    Walk(String),

    // Config
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Output
    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::SymlinkLoop(p)
            | Self::DepthExceeded { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the run can continue after this error.
    ///
    /// Only symlink loops are recoverable: the looping link is left out of the
    /// inventory and reported in [`Report::skipped`](crate::Report::skipped).
    /// Everything else aborts the run, since a partial file list would silently
    /// drop items from the generated project.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SymlinkLoop(_))
    }

    /// Wrap an IO error, promoting the kinds callers care about to their own variants.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}
