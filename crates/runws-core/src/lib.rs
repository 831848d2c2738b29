//! Core types for running package scripts across workspaces.
//!
//! This crate holds everything that does not need a process or a terminal:
//! - the immutable [`RunOptions`] snapshot and the [`RenderMode`] tag
//! - the `package.json` [`Manifest`] model and a swappable [`ManifestReader`]
//! - the workspace resolver that expands manifest glob patterns
//! - the include/exclude [`FilterRules`]
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

/// Error types and result alias.
pub mod error;
/// Include/exclude filtering of workspace lists.
pub mod filter;
/// Manifest model, reader and project-root discovery.
pub mod manifest;
/// Run configuration snapshot.
pub mod options;
/// Workspace resolution from manifest glob patterns.
pub mod workspace;

pub use error::{Error, Result};
pub use filter::FilterRules;
pub use manifest::{
    FsManifestReader, MANIFEST_FILE, Manifest, ManifestReader, WorkspaceDeclarations,
    find_project_root,
};
pub use options::{RenderMode, RunOptions};
pub use workspace::resolve_workspaces;
