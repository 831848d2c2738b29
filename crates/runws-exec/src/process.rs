//! Subprocess execution with combined output capture.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{self, AsyncRead, AsyncReadExt as _, AsyncWriteExt as _};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::error::{ExecError, ExecResult};

/// Variable set on every child so tools keep their colors without a terminal.
pub const COLOR_ENV: (&str, &str) = ("FORCE_COLOR", "1");

const READ_CHUNK: usize = 8 * 1024;

/// One program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    /// Program to run, looked up on `PATH`
    pub program: String,
    /// Arguments, passed verbatim
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Variables layered over the inherited environment
    pub env: Vec<(String, String)>,
    /// Forward output to stdout as it arrives
    pub stream: bool,
}

impl ExecRequest {
    /// Create a request that inherits the environment plus [`COLOR_ENV`].
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
            env: vec![(COLOR_ENV.0.to_owned(), COLOR_ENV.1.to_owned())],
            stream: false,
        }
    }

    /// Forward output live.
    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Outcome of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, `-1` when the child was terminated by a signal
    pub exit_code: i32,
    /// Interleaved stdout and stderr, trimmed
    pub all: String,
}

impl ExecOutput {
    /// Whether the child exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a program described by an [`ExecRequest`].
///
/// A nonzero exit is reported through [`ExecOutput::exit_code`], never as an
/// error. Errors are reserved for failures to start or talk to the child.
#[async_trait]
pub trait Exec: Send + Sync {
    /// Run `request` to completion.
    ///
    /// # Errors
    /// Returns an [`ExecError`] if the process cannot be spawned or its
    /// output cannot be read.
    async fn exec(&self, request: &ExecRequest) -> ExecResult<ExecOutput>;
}

/// [`Exec`] backed by `tokio::process`.
///
/// Children are spawned with `kill_on_drop`, so dropping the future of an
/// in-flight [`Exec::exec`] call terminates the child.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExec;

#[async_trait]
impl Exec for ProcessExec {
    async fn exec(&self, request: &ExecRequest) -> ExecResult<ExecOutput> {
        tracing::debug!(
            "Executing {} {:?} in {:?}",
            request.program,
            request.args,
            request.cwd
        );

        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .current_dir(&request.cwd)
            .envs(request.env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: request.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or(ExecError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(ExecError::MissingPipe("stderr"))?;

        let (sender, mut receiver) = mpsc::unbounded_channel();
        tokio::spawn(forward_chunks(stdout, sender.clone()));
        tokio::spawn(forward_chunks(stderr, sender));

        let mut combined = Vec::new();
        let mut live = request.stream.then(io::stdout);
        while let Some(chunk) = receiver.recv().await {
            if let Some(out) = live.as_mut() {
                out.write_all(&chunk).await?;
                out.flush().await?;
            }
            combined.extend_from_slice(&chunk);
        }

        let status = child.wait().await?;
        let exit_code = status.code().unwrap_or(-1);
        tracing::debug!("{} exited with code {exit_code}", request.program);

        Ok(ExecOutput {
            exit_code,
            all: String::from_utf8_lossy(&combined).trim().to_owned(),
        })
    }
}

/// Read `reader` to EOF, sending each chunk in arrival order.
async fn forward_chunks<Reader>(mut reader: Reader, sender: UnboundedSender<Vec<u8>>)
where
    Reader: AsyncRead + Unpin + Send + 'static,
{
    let mut buffer = vec![0_u8; READ_CHUNK];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(read) => {
                if sender.send(buffer[..read].to_vec()).is_err() {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!("Error reading child output: {err}");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sh(script: &str, cwd: &TempDir) -> ExecRequest {
        ExecRequest::new("sh", vec!["-c".to_owned(), script.to_owned()], cwd.path())
    }

    #[tokio::test]
    async fn test_captures_combined_output() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let output = ProcessExec
            .exec(&sh("echo out; echo err 1>&2", &temp))
            .await
            .unwrap();

        assert!(output.success());
        assert!(output.all.contains("out"));
        assert!(output.all.contains("err"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_raised() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let output = ProcessExec.exec(&sh("echo broken; exit 3", &temp)).await.unwrap();

        assert!(!output.success());
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.all, "broken");
    }

    #[tokio::test]
    async fn test_runs_in_working_directory_with_color_env() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp.path().join("marker.txt"), "here").unwrap();

        let output = ProcessExec
            .exec(&sh("cat marker.txt; echo \" $FORCE_COLOR\"", &temp))
            .await
            .unwrap();
        assert_eq!(output.all, "here 1");
    }

    #[tokio::test]
    async fn test_streaming_still_captures() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let output = ProcessExec
            .exec(&sh("echo streamed", &temp).with_stream(true))
            .await
            .unwrap();
        assert_eq!(output.all, "streamed");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let request = ExecRequest::new("runws-definitely-not-a-program", Vec::new(), temp.path());
        let err = ProcessExec.exec(&request).await.unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
