use core::result::Result as CoreResult;

use thiserror::Error;
use tokio::task::JoinError;

/// Result type for a run.
pub type RunResult<T> = CoreResult<T, RunError>;

/// Failures that abort a whole run.
///
/// Unit failures are not errors; they are reported through
/// [`Summary`](crate::Summary) and the exit code.
#[derive(Debug, Error)]
pub enum RunError {
    /// Reading a manifest or resolving workspaces failed.
    #[error(transparent)]
    Core(#[from] runws_core::Error),

    /// A unit task panicked or was cancelled.
    #[error("task join failed: {0}")]
    Join(#[from] JoinError),

    /// The run was interrupted and in-flight units were terminated.
    #[error("interrupted, in-flight commands were terminated")]
    Interrupted,

    /// Scheduling failed for another reason.
    #[error("{0}")]
    Other(String),
}
