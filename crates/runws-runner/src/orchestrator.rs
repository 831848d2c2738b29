//! Scheduling of task units.
//!
//! A run goes through two phases:
//! 1. every unit's [`SkipCheck`](crate::SkipCheck) is evaluated, in list
//!    order, before anything starts;
//! 2. the remaining units are started under a [`SchedulePolicy`] and the
//!    orchestrator waits for all of them to settle.
//!
//! Per unit the state machine is
//! `Pending → {Skipped | Running → {Succeeded | Failed}}`.
//! A failed unit never cancels its siblings.

use core::future::{Future, pending};
use core::num::NonZeroUsize;
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use runws_core::{ManifestReader, RenderMode, RunOptions};
use runws_exec::Exec;
use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal as unix_signal};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

use crate::error::{RunError, RunResult};
use crate::render::Renderer;
use crate::task::{SkipCheck, TaskTarget, TaskUnit, UnitAction};

/// How many units may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePolicy {
    /// One at a time, in list order
    Serial,
    /// Everything at once
    Parallel,
    /// At most the given number at once, started in list order
    Throttled(NonZeroUsize),
}

impl SchedulePolicy {
    /// Policy selected by `options`. `serial` takes precedence over `throttle`.
    pub fn from_options(options: &RunOptions, cpu_count: usize) -> Self {
        if options.serial {
            Self::Serial
        } else if options.throttle {
            Self::Throttled(NonZeroUsize::new(cpu_count).unwrap_or(NonZeroUsize::MIN))
        } else {
            Self::Parallel
        }
    }

    /// Concurrency limit for `units` schedulable units, never below one.
    pub fn limit(self, units: usize) -> usize {
        let units = units.max(1);
        match self {
            Self::Serial => 1,
            Self::Parallel => units,
            Self::Throttled(cap) => cap.get().min(units),
        }
    }
}

/// Lifecycle state of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Built, not yet scheduled
    Pending,
    /// Skip predicate held; never executed
    Skipped,
    /// Action in flight
    Running,
    /// Action resolved successfully
    Succeeded,
    /// Action exited nonzero or could not be run
    Failed,
}

/// Outcome of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// Unit title
    pub title: String,
    /// Workspace or root the unit ran against
    pub target: TaskTarget,
    /// Final state
    pub state: UnitState,
    /// Captured combined output, `None` when skipped, dry or streamed
    pub output: Option<String>,
    /// Time between start and settle
    pub elapsed: Duration,
}

/// Runs task units to completion under a [`SchedulePolicy`].
pub struct Orchestrator {
    exec: Arc<dyn Exec>,
    manifests: Arc<dyn ManifestReader>,
    renderer: Arc<dyn Renderer>,
    policy: SchedulePolicy,
    mode: RenderMode,
}

impl Orchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        exec: Arc<dyn Exec>,
        manifests: Arc<dyn ManifestReader>,
        renderer: Arc<dyn Renderer>,
        policy: SchedulePolicy,
        mode: RenderMode,
    ) -> Self {
        Self {
            exec,
            manifests,
            renderer,
            policy,
            mode,
        }
    }

    /// Run `units`, stopping early when the host is asked to terminate.
    ///
    /// # Errors
    /// See [`Orchestrator::run_until`].
    pub async fn run(&self, units: Vec<TaskUnit>) -> RunResult<Vec<UnitReport>> {
        self.run_until(units, interrupt_signal()).await
    }

    /// Run `units` until all settle or `shutdown` resolves.
    ///
    /// Reports come back in list order.
    ///
    /// # Errors
    /// Returns an error when a skip check cannot read its manifest (nothing
    /// has started at that point), when a unit task panics, or with
    /// [`RunError::Interrupted`] when `shutdown` resolves first. In-flight
    /// children are terminated in the last case.
    pub async fn run_until<Shutdown>(
        &self,
        units: Vec<TaskUnit>,
        shutdown: Shutdown,
    ) -> RunResult<Vec<UnitReport>>
    where
        Shutdown: Future<Output = ()> + Send,
    {
        let mut reports = self.evaluate_skips(&units).await?;

        let schedulable: Vec<(usize, TaskUnit)> = units
            .into_iter()
            .enumerate()
            .filter(|(index, _)| reports[*index].state == UnitState::Pending)
            .collect();

        self.renderer.run_started(schedulable.len());
        if schedulable.is_empty() {
            return Ok(reports);
        }

        // Dropping the schedule future drops its JoinSet, which aborts every
        // unit task; kill_on_drop then terminates their children.
        let settled = tokio::select! {
            settled = self.schedule(schedulable) => settled?,
            () = shutdown => return Err(RunError::Interrupted),
        };

        for (index, report) in settled {
            reports[index] = report;
        }
        Ok(reports)
    }

    /// Phase one: skip predicates for all units, before any unit starts.
    ///
    /// Manifest reads are blocking, so they run on the blocking pool.
    async fn evaluate_skips(&self, units: &[TaskUnit]) -> RunResult<Vec<UnitReport>> {
        let checks: Vec<SkipCheck> = units.iter().map(|unit| unit.skip.clone()).collect();
        let manifests = Arc::clone(&self.manifests);
        let skipped = task::spawn_blocking(move || {
            checks
                .iter()
                .map(|check| check.evaluate(manifests.as_ref()))
                .collect::<Result<Vec<bool>, _>>()
        })
        .await??;

        Ok(units
            .iter()
            .zip(skipped)
            .map(|(unit, is_skipped)| {
                let state = if is_skipped {
                    tracing::debug!("Skipping {}", unit.title);
                    self.renderer.unit_skipped(&unit.title);
                    UnitState::Skipped
                } else {
                    UnitState::Pending
                };
                UnitReport {
                    title: unit.title.clone(),
                    target: unit.target.clone(),
                    state,
                    output: None,
                    elapsed: Duration::ZERO,
                }
            })
            .collect())
    }

    /// Phase two: start units in list order, bounded by the policy limit.
    async fn schedule(
        &self,
        schedulable: Vec<(usize, TaskUnit)>,
    ) -> RunResult<Vec<(usize, UnitReport)>> {
        let limit = self.policy.limit(schedulable.len());
        tracing::debug!(
            "Scheduling {} units with {:?} (limit {limit})",
            schedulable.len(),
            self.policy
        );

        let semaphore = Arc::new(Semaphore::new(limit));
        let flush_success = self.mode.shows_success_output();
        let mut join_set = JoinSet::new();
        let mut settled = Vec::with_capacity(schedulable.len());

        for (index, unit) in schedulable {
            // The permit is taken here rather than inside the task so start
            // order follows list order.
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|err| RunError::Other(err.to_string()))?;

            let exec = Arc::clone(&self.exec);
            let renderer = Arc::clone(&self.renderer);
            join_set.spawn(async move {
                let report = run_unit(unit, exec.as_ref(), renderer.as_ref(), flush_success).await;
                drop(permit);
                (index, report)
            });
        }

        while let Some(result) = join_set.join_next().await {
            settled.push(result?);
        }
        Ok(settled)
    }
}

/// Run a single unit through `Running` to a terminal state.
async fn run_unit(
    unit: TaskUnit,
    exec: &dyn Exec,
    renderer: &dyn Renderer,
    flush_success: bool,
) -> UnitReport {
    tracing::debug!("Running {}", unit.title);
    renderer.unit_started(&unit.title);
    let started = Instant::now();
    let mut report = UnitReport {
        title: unit.title,
        target: unit.target,
        state: UnitState::Running,
        output: None,
        elapsed: Duration::ZERO,
    };

    let (state, output) = match &unit.action {
        UnitAction::DryRun => (UnitState::Succeeded, None),
        UnitAction::Exec(request) => match exec.exec(request).await {
            Ok(result) => {
                let state = if result.success() {
                    UnitState::Succeeded
                } else {
                    UnitState::Failed
                };
                (state, (!request.stream).then_some(result.all))
            }
            Err(err) => {
                tracing::warn!("{} could not be run: {err}", report.title);
                (UnitState::Failed, Some(err.to_string()))
            }
        },
    };

    report.state = state;
    report.output = output;
    report.elapsed = started.elapsed();
    tracing::debug!(
        "{} settled as {state:?} after {:?}",
        report.title,
        report.elapsed
    );
    renderer.unit_settled(&report.title, state, report.elapsed);

    let flush = state == UnitState::Failed || flush_success;
    if let Some(text) = report.output.as_deref().filter(|_| flush) {
        renderer.output_block(&report.title, text);
    }

    report
}

/// Resolves on Ctrl-C, and on SIGTERM or SIGHUP on unix.
///
/// A listener that cannot be installed never resolves.
async fn interrupt_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!("Unable to listen for interrupts: {err}");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::select! {
            () = termination(SignalKind::terminate()) => {},
            () = termination(SignalKind::hangup()) => {},
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(unix)]
async fn termination(kind: SignalKind) {
    match unix_signal(kind) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::warn!("Unable to listen for {kind:?}: {err}");
            pending::<()>().await;
        }
    }
}
