use core::result::Result as CoreResult;
use std::io::Error as IoError;
use std::path::PathBuf;

use glob::PatternError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors raised while reading manifests or resolving workspaces.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a manifest from disk failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Manifest that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: IoError,
    },

    /// A manifest was not valid JSON or had an unexpected shape.
    #[error("failed to parse {path}: {source}")]
    Json {
        /// Manifest that could not be parsed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: SerdeJsonError,
    },

    /// A workspace declaration was not a valid glob pattern.
    #[error("invalid workspace pattern '{pattern}': {source}")]
    Glob {
        /// Declaration as written in the manifest
        pattern: String,
        /// Underlying pattern error
        #[source]
        source: PatternError,
    },

    /// No `package.json` exists in the start directory or any ancestor.
    #[error("no package.json found in {0} or any of its parents!")]
    ProjectRootNotFound(PathBuf),
}

impl Error {
    /// Whether this error is a configuration problem the user can fix by
    /// pointing the tool somewhere else, rather than an I/O failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ProjectRootNotFound(_) | Self::Glob { .. })
    }
}
