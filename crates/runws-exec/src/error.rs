use core::result::Result as CoreResult;
use std::io::Error as IoError;

use thiserror::Error;

/// Errors that can occur while launching or probing processes.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: IoError,
    },

    /// An I/O operation on a running child failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// A piped stream was not available on the spawned child.
    #[error("child process has no {0} pipe")]
    MissingPipe(&'static str),

    /// The version probe exited unsuccessfully.
    #[error("'{program} --version' exited with code {code}")]
    VersionProbe {
        /// Probed program
        program: String,
        /// Exit code reported
        code: i32,
    },

    /// The version string did not start with a numeric major version.
    #[error("could not parse version '{0}'")]
    VersionParse(String),
}

/// Result type for execution operations.
pub type ExecResult<T> = CoreResult<T, ExecError>;
