use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The root to organize does not exist. Fatal for the whole run.
    #[error("source path '{}' does not exist", .0.display())]
    RootNotFound(PathBuf),

    #[error("source path '{}' is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    /// The file's timestamp could not be read; the file is left out of grouping.
    #[error("cannot read date for {}: {}", .path.display(), .source)]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory or entry the walk could not read; its contents are skipped.
    #[error("cannot read {}: {}", .path.display(), .source)]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot move {} -> {}: {}", .from.display(), .to.display(), .source)]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OrganizeError {
    pub fn metadata(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Metadata {
            path: path.into(),
            source,
        }
    }

    /// Convert a walk error, keeping the offending path when there is one.
    pub fn unreadable(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let source = match err.into_io_error() {
            Some(source) => source,
            None => io::Error::other("filesystem loop"),
        };
        Self::Unreadable { path, source }
    }
}
