//! Entry point wiring the pipeline together.
//!
//! [`Runner::run`] validates the invocation, discovers and filters the
//! workspaces, builds one unit per target and hands them to the
//! [`Orchestrator`]. Every recoverable condition becomes an exit code; only
//! I/O-class failures surface as `Err`.

use std::path::PathBuf;
use std::sync::Arc;

use runws_core::{
    FsManifestReader, ManifestReader, RunOptions, find_project_root, resolve_workspaces,
};
use runws_exec::{
    CiProbe, EnvCiProbe, Exec, MIN_NPM_MAJOR, NpmVersionProbe, ProcessExec, VersionProbe,
    parse_major,
};

use crate::error::{RunError, RunResult};
use crate::orchestrator::{Orchestrator, SchedulePolicy};
use crate::output::{Console, TermConsole};
use crate::render::renderer_for;
use crate::report::Summary;
use crate::task::{TaskBuilder, TaskTarget};

/// Printed when no script name was given outside list mode.
pub const MISSING_SCRIPT_MESSAGE: &str = "An npm script name to run is required!";
/// Printed when discovery and filtering leave nothing to run.
pub const NO_WORKSPACES_MESSAGE: &str = "no workspaces found to run on with given arguments!";
/// Printed once before a dry run is scheduled.
pub const DRY_RUN_NOTICE: &str = "NOTE: this is a dry run, commands are not actually being run!";

/// Runs one script across a project's workspaces.
pub struct Runner {
    exec: Arc<dyn Exec>,
    ci: Arc<dyn CiProbe>,
    version: Option<Arc<dyn VersionProbe>>,
    manifests: Arc<dyn ManifestReader>,
    console: Arc<dyn Console>,
    cpu_count: usize,
}

impl Runner {
    /// Builder with every collaborator at its production default.
    #[must_use]
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::new()
    }

    /// Run `options` to completion and return the process exit code.
    ///
    /// # Errors
    /// Returns an error when a manifest cannot be read or parsed, when a unit
    /// task panics, or when the run is interrupted.
    pub async fn run(&self, options: &RunOptions) -> RunResult<i32> {
        let is_ci = self.ci.is_ci();
        let mode = options.effective_render_mode(is_ci);
        tracing::debug!("Render mode {mode} (ci: {is_ci})");

        let script = if options.list_workspaces {
            None
        } else if let Some(script) = options.script_name() {
            if let Some(code) = self.check_npm_version(options).await {
                return Ok(code);
            }
            Some(script)
        } else {
            self.console.error(MISSING_SCRIPT_MESSAGE);
            return Ok(1);
        };

        let (project_root, targets) = match self.select_targets(options) {
            Ok(selected) => selected,
            Err(RunError::Core(err)) if err.is_configuration() => {
                self.console.error(&err.to_string());
                return Ok(1);
            }
            Err(err) => return Err(err),
        };

        let Some(script) = script else {
            for target in &targets {
                self.console.log(target.label());
            }
            return Ok(0);
        };

        if targets.is_empty() {
            self.console.error(NO_WORKSPACES_MESSAGE);
            return Ok(1);
        }

        let units = TaskBuilder::new(options, script, &project_root).build(&targets);
        if options.dry_run {
            self.console.log(DRY_RUN_NOTICE);
        }

        let policy = SchedulePolicy::from_options(options, self.cpu_count);
        tracing::info!(
            "Running '{script}' on {} targets in {}",
            units.len(),
            project_root.display()
        );

        let orchestrator = Orchestrator::new(
            Arc::clone(&self.exec),
            Arc::clone(&self.manifests),
            renderer_for(mode, Arc::clone(&self.console)),
            policy,
            mode,
        );
        let reports = orchestrator.run(units).await?;

        let summary = Summary::from_reports(&reports);
        tracing::info!(
            "{} succeeded, {} skipped, {} failed",
            summary.succeeded(),
            summary.skipped(),
            summary.failures().len()
        );
        if let Some(message) = summary.failure_message() {
            self.console.error(&message);
        }
        Ok(summary.exit_code())
    }

    /// Exit code to stop with when the package manager is unusable.
    async fn check_npm_version(&self, options: &RunOptions) -> Option<i32> {
        let default_probe = NpmVersionProbe::new(options.npm_path.as_str());
        let probe: &dyn VersionProbe = self.version.as_deref().unwrap_or(&default_probe);

        let version = match probe.version().await {
            Ok(version) => version,
            Err(err) => {
                self.console
                    .error(&format!("unable to determine npm version: {err}"));
                return Some(1);
            }
        };

        match parse_major(&version) {
            Ok(major) if major >= MIN_NPM_MAJOR => None,
            Ok(_) => {
                self.console.error(&format!(
                    "npm workspaces is unsupported on npm@{version} please upgrade to npm@>={MIN_NPM_MAJOR}"
                ));
                Some(1)
            }
            Err(err) => {
                self.console
                    .error(&format!("unable to determine npm version: {err}"));
                Some(1)
            }
        }
    }

    /// Project root plus the filtered targets, root unit last.
    fn select_targets(&self, options: &RunOptions) -> RunResult<(PathBuf, Vec<TaskTarget>)> {
        let project_root = find_project_root(&options.directory)?;
        let manifest = self.manifests.read(&project_root)?;

        let mut candidates: Vec<TaskTarget> = resolve_workspaces(Some(&manifest), &project_root)?
            .into_iter()
            .map(TaskTarget::workspace)
            .collect();
        if options.include_root {
            candidates.push(TaskTarget::root(manifest.root_label()));
        }

        let targets = options.filter_rules().apply(candidates);
        tracing::debug!(
            "Selected {} targets under {}",
            targets.len(),
            project_root.display()
        );
        Ok((project_root, targets))
    }
}

/// Builds a [`Runner`], defaulting every collaborator to the real one.
#[derive(Default)]
pub struct RunnerBuilder {
    exec: Option<Arc<dyn Exec>>,
    ci: Option<Arc<dyn CiProbe>>,
    version: Option<Arc<dyn VersionProbe>>,
    manifests: Option<Arc<dyn ManifestReader>>,
    console: Option<Arc<dyn Console>>,
    cpu_count: Option<usize>,
}

impl RunnerBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Execution collaborator, [`ProcessExec`] by default.
    #[must_use]
    pub fn with_exec(mut self, exec: Arc<dyn Exec>) -> Self {
        self.exec = Some(exec);
        self
    }

    /// CI detection, [`EnvCiProbe::from_env`] by default.
    #[must_use]
    pub fn with_ci_probe(mut self, ci: Arc<dyn CiProbe>) -> Self {
        self.ci = Some(ci);
        self
    }

    /// Version probe, `<npm_path> --version` by default.
    #[must_use]
    pub fn with_version_probe(mut self, version: Arc<dyn VersionProbe>) -> Self {
        self.version = Some(version);
        self
    }

    /// Manifest reader, [`FsManifestReader`] by default.
    #[must_use]
    pub fn with_manifest_reader(mut self, manifests: Arc<dyn ManifestReader>) -> Self {
        self.manifests = Some(manifests);
        self
    }

    /// User output, [`TermConsole`] by default.
    #[must_use]
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    /// Throttle cap, the number of logical CPUs by default.
    #[must_use]
    pub fn with_cpu_count(mut self, cpu_count: usize) -> Self {
        self.cpu_count = Some(cpu_count);
        self
    }

    /// Finish the builder.
    #[must_use]
    pub fn build(self) -> Runner {
        Runner {
            exec: self.exec.unwrap_or_else(|| Arc::new(ProcessExec)),
            ci: self
                .ci
                .unwrap_or_else(|| Arc::new(EnvCiProbe::from_env())),
            version: self.version,
            manifests: self
                .manifests
                .unwrap_or_else(|| Arc::new(FsManifestReader)),
            console: self.console.unwrap_or_else(|| Arc::new(TermConsole::new())),
            cpu_count: self.cpu_count.unwrap_or_else(num_cpus::get),
        }
    }
}
