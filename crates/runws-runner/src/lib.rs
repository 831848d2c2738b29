//! Runs one package script across every workspace of a project.
//!
//! The pipeline flows strictly downward:
//! resolver → filter → [`TaskBuilder`] → [`Orchestrator`] → [`Summary`].
//! [`Runner`] wires the stages together behind a single entry point that
//! turns a [`RunOptions`](runws_core::RunOptions) into a process exit code.
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

/// Error types for a run.
pub mod error;
/// Scheduling of task units.
pub mod orchestrator;
/// Line-oriented user output.
pub mod output;
/// Display-mode renderers.
pub mod render;
/// Aggregation of unit outcomes.
pub mod report;
/// Entry point wiring the pipeline together.
pub mod run;
/// Construction of task units.
pub mod task;
#[cfg(test)]
mod test_support;

pub use error::{RunError, RunResult};
pub use orchestrator::{Orchestrator, SchedulePolicy, UnitReport, UnitState};
pub use output::{Console, MemoryConsole, TermConsole};
pub use render::{Renderer, renderer_for};
pub use report::Summary;
pub use run::{Runner, RunnerBuilder};
pub use task::{SkipCheck, TaskBuilder, TaskTarget, TaskUnit, UnitAction};
