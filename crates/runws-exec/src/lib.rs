//! Process execution for runws.
//!
//! This crate provides the collaborators that touch the host environment:
//! - [`Exec`] and its tokio-backed implementation [`ProcessExec`]
//! - [`CiProbe`] for detecting continuous-integration environments
//! - [`VersionProbe`] for checking the package manager version
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::print_stdout,
        clippy::print_stderr,
        reason = "Allow for tests"
    )
)]

/// Error types for execution.
mod error;
/// Subprocess execution.
mod process;
/// CI and version probes.
mod probe;

pub use error::{ExecError, ExecResult};
pub use process::{COLOR_ENV, Exec, ExecOutput, ExecRequest, ProcessExec};
pub use probe::{
    CI_VARIABLES, CiProbe, EnvCiProbe, MIN_NPM_MAJOR, NpmVersionProbe, VersionProbe, parse_major,
};
