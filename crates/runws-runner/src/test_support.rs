//! Collaborator fakes shared by the unit tests of this crate.

use core::time::Duration;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use runws_core::MANIFEST_FILE;
use runws_exec::{Exec, ExecError, ExecOutput, ExecRequest, ExecResult};
use tokio::time::sleep;

use crate::orchestrator::UnitState;
use crate::render::Renderer;

/// Label used by [`FakeExec`] for requests without a workspace selector.
pub const ROOT_LABEL: &str = "<root>";

/// Workspace a request targets, or [`ROOT_LABEL`].
pub fn request_label(request: &ExecRequest) -> String {
    request
        .args
        .iter()
        .position(|arg| arg == "--workspace")
        .and_then(|pos| request.args.get(pos + 1))
        .cloned()
        .unwrap_or_else(|| ROOT_LABEL.to_owned())
}

/// Scriptable [`Exec`] that records every call.
#[derive(Default)]
pub struct FakeExec {
    failing: HashSet<String>,
    erroring: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<ExecRequest>>,
    events: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeExec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(mut self, label: &str) -> Self {
        self.failing.insert(label.to_owned());
        self
    }

    #[must_use]
    pub fn erroring(mut self, label: &str) -> Self {
        self.erroring.insert(label.to_owned());
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ExecRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_labels(&self) -> Vec<String> {
        self.calls().iter().map(request_label).collect()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Exec for FakeExec {
    async fn exec(&self, request: &ExecRequest) -> ExecResult<ExecOutput> {
        let label = request_label(request);
        self.calls.lock().unwrap().push(request.clone());
        self.events.lock().unwrap().push(format!("start {label}"));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("end {label}"));

        if self.erroring.contains(&label) {
            return Err(ExecError::Spawn {
                program: request.program.clone(),
                source: io::Error::other("no such program"),
            });
        }

        Ok(ExecOutput {
            exit_code: i32::from(self.failing.contains(&label)),
            all: format!("output of {label}"),
        })
    }
}

/// [`Renderer`] that records events as strings.
#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Renderer for RecordingRenderer {
    fn run_started(&self, total: usize) {
        self.push(format!("run {total}"));
    }

    fn unit_skipped(&self, title: &str) {
        self.push(format!("skipped {title}"));
    }

    fn unit_started(&self, title: &str) {
        self.push(format!("started {title}"));
    }

    fn unit_settled(&self, title: &str, state: UnitState, _elapsed: Duration) {
        self.push(format!("settled {title} {state:?}"));
    }

    fn output_block(&self, title: &str, output: &str) {
        self.push(format!("block {title}: {output}"));
    }
}

/// Write a manifest into `dir`, creating it.
pub fn write_manifest(dir: &Path, json: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(MANIFEST_FILE), json).unwrap();
}

/// Standard fixture: root `root-pkg` over `workspaces/{a,b,c}`,
/// `workspaces2/d` and `workspaces3/e`, every package declaring `test`.
pub fn create_project(root: &Path) {
    write_manifest(
        root,
        r#"{
  "name": "root-pkg",
  "version": "1.0.0",
  "workspaces": ["workspaces/*", "workspaces2/*", "workspaces3/*"]
}"#,
    );
    for dir in ["workspaces/a", "workspaces/b", "workspaces/c", "workspaces2/d", "workspaces3/e"] {
        let name = Path::new(dir).file_name().unwrap().to_string_lossy().into_owned();
        write_manifest(
            &root.join(dir),
            &format!(r#"{{"name":"{name}","scripts":{{"test":"echo {name}"}}}}"#),
        );
    }
}
