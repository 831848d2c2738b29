//! Construction of task units.
//!
//! One [`TaskUnit`] is built per selected workspace, plus at most one for the
//! project root. The argument vector has a fixed shape so the wrapped
//! package manager sees exactly what a user would have typed:
//!
//! ```text
//! run <script> [--ignore-scripts] [--if-present] [--workspace <path>]
//! ```

use std::path::{Path, PathBuf};

use runws_core::{ManifestReader, Result as CoreResult, RunOptions};
use runws_exec::ExecRequest;

/// What a unit runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskTarget {
    /// The project root, labelled by its package name
    Root {
        /// Root package name
        name: String,
    },
    /// A workspace directory relative to the project root
    Workspace {
        /// Relative path
        path: String,
    },
}

impl TaskTarget {
    /// Workspace target.
    #[must_use]
    pub fn workspace(path: impl Into<String>) -> Self {
        Self::Workspace { path: path.into() }
    }

    /// Root target.
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self::Root { name: name.into() }
    }

    /// Name used for filtering and listing.
    pub fn label(&self) -> &str {
        match self {
            Self::Root { name } => name,
            Self::Workspace { path } => path,
        }
    }
}

impl AsRef<str> for TaskTarget {
    fn as_ref(&self) -> &str {
        self.label()
    }
}

/// Decides, before scheduling, whether a unit is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipCheck {
    /// Always run
    Never,
    /// Skip when the manifest in `manifest_dir` does not declare `script`
    ScriptMissing {
        /// Directory holding the manifest to inspect
        manifest_dir: PathBuf,
        /// Script that must be declared
        script: String,
    },
}

impl SkipCheck {
    /// Evaluate against the manifests visible through `reader`.
    ///
    /// # Errors
    /// Propagates manifest read and parse errors.
    pub fn evaluate(&self, reader: &dyn ManifestReader) -> CoreResult<bool> {
        match self {
            Self::Never => Ok(false),
            Self::ScriptMissing {
                manifest_dir,
                script,
            } => Ok(!reader.read(manifest_dir)?.has_script(script)),
        }
    }
}

/// What happens when a unit runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitAction {
    /// Resolve immediately without executing anything
    DryRun,
    /// Hand the request to the execution collaborator
    Exec(ExecRequest),
}

/// One schedulable script invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUnit {
    /// Rendered command line, e.g. `npm run test --workspace ws/a`
    pub title: String,
    /// Arguments passed to the package manager
    pub args: Vec<String>,
    /// Workspace or root this unit belongs to
    pub target: TaskTarget,
    /// Skip predicate
    pub skip: SkipCheck,
    /// Action run when not skipped
    pub action: UnitAction,
}

/// Builds [`TaskUnit`]s from targets and run options.
#[derive(Debug, Clone, Copy)]
pub struct TaskBuilder<'opts> {
    options: &'opts RunOptions,
    script: &'opts str,
    project_root: &'opts Path,
}

impl<'opts> TaskBuilder<'opts> {
    /// Builder for `script` in the project at `project_root`.
    #[must_use]
    pub fn new(options: &'opts RunOptions, script: &'opts str, project_root: &'opts Path) -> Self {
        Self {
            options,
            script,
            project_root,
        }
    }

    /// One unit per target, in target order.
    pub fn build(&self, targets: &[TaskTarget]) -> Vec<TaskUnit> {
        targets.iter().map(|target| self.build_unit(target)).collect()
    }

    /// Argument vector for `target`.
    pub fn args_for(&self, target: &TaskTarget) -> Vec<String> {
        let mut args = vec!["run".to_owned(), self.script.to_owned()];

        if self.options.ignore_scripts {
            args.push("--ignore-scripts".to_owned());
        }

        if self.options.if_present {
            args.push("--if-present".to_owned());
        }

        if let TaskTarget::Workspace { path } = target {
            args.push("--workspace".to_owned());
            args.push(path.clone());
        }

        args
    }

    fn build_unit(&self, target: &TaskTarget) -> TaskUnit {
        let args = self.args_for(target);
        let title = format!("{} {}", self.options.npm_path, args.join(" "));

        let skip = if self.options.if_present {
            let manifest_dir = match target {
                TaskTarget::Root { .. } => self.project_root.to_path_buf(),
                TaskTarget::Workspace { path } => self.project_root.join(path),
            };
            SkipCheck::ScriptMissing {
                manifest_dir,
                script: self.script.to_owned(),
            }
        } else {
            SkipCheck::Never
        };

        let action = if self.options.dry_run {
            UnitAction::DryRun
        } else {
            UnitAction::Exec(
                ExecRequest::new(&self.options.npm_path, args.clone(), self.project_root)
                    .with_stream(self.options.stream),
            )
        };

        TaskUnit {
            title,
            args,
            target: target.clone(),
            skip,
            action,
        }
    }
}
