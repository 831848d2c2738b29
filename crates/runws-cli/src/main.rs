//! `runws` - run an npm script across every workspace of a project.
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

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use runws_core::RunOptions;
use runws_runner::{Console, Runner, TermConsole};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

mod cli;

use cli::Cli;

/// Environment variable holding the diagnostics filter.
const LOG_ENV: &str = "RUNWS_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let options = Cli::parse().into_options();
    tracing::debug!("Options: {options:?}");

    let console = Arc::new(TermConsole::new());
    match run(&options, Arc::clone(&console) as Arc<dyn Console>).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            console.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(options: &RunOptions, console: Arc<dyn Console>) -> Result<i32> {
    let runner = Runner::builder().with_console(console).build();
    runner
        .run(options)
        .await
        .with_context(|| format!("runws failed in {}", options.directory.display()))
}
