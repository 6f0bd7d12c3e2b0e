//! Subprocess boundary for the version-control executable
//!
//! Every invocation carries an explicit timeout and a per-stream output
//! cap. On timeout or cancellation the child is killed before returning.

use crate::cancel::CancelToken;
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::debug;

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Timeout and output cap for a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecLimits {
    pub timeout: Duration,
    /// Bytes kept per stream; the rest is drained and discarded
    pub max_output_bytes: usize,
}

/// A single version-control invocation
#[derive(Debug, Clone)]
pub struct GitCommand {
    pub args: Vec<OsString>,
    pub limits: ExecLimits,
}

impl GitCommand {
    pub fn new<I, S>(args: I, limits: ExecLimits) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            limits,
        }
    }

    /// Human-readable rendering for logs and error messages
    pub fn display(&self) -> String {
        let args: Vec<_> = self.args.iter().map(|a| a.to_string_lossy()).collect();
        format!("git {}", args.join(" "))
    }
}

/// Captured result of a finished invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Either stream exceeded the output cap
    pub truncated: bool,
}

impl GitOutput {
    /// Most useful text to surface when the invocation failed
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Failures that prevent an invocation from producing a [`GitOutput`]
#[derive(Error, Debug)]
pub enum RunError {
    #[error("executable not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("I/O error while running git: {0}")]
    Io(#[from] io::Error),
}

/// Runs version-control commands
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, command: &GitCommand, cancel: &CancelToken) -> Result<GitOutput, RunError>;
}

/// Runs the real executable through `tokio::process`
#[derive(Debug, Clone)]
pub struct ProcessGitRunner {
    binary: PathBuf,
}

impl ProcessGitRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for ProcessGitRunner {
    fn default() -> Self {
        Self::new("git")
    }
}

enum Finished {
    Exited(io::Result<(ExitStatus, Captured, Captured)>),
    TimedOut,
    Cancelled,
}

#[async_trait]
impl GitRunner for ProcessGitRunner {
    async fn run(&self, command: &GitCommand, cancel: &CancelToken) -> Result<GitOutput, RunError> {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        debug!("Executing: {}", command.display());

        let mut child = Command::new(&self.binary)
            .args(&command.args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RunError::NotFound(self.binary.clone()),
                _ => RunError::Spawn {
                    binary: self.binary.clone(),
                    source: e,
                },
            })?;

        let limits = command.limits;
        let finished = {
            let collect = collect_output(&mut child, limits.max_output_bytes);
            tokio::select! {
                result = collect => Finished::Exited(result),
                _ = tokio::time::sleep(limits.timeout) => Finished::TimedOut,
                _ = cancel.cancelled() => Finished::Cancelled,
            }
        };

        match finished {
            Finished::Exited(result) => {
                let (status, stdout, stderr) = result?;
                Ok(GitOutput {
                    success: status.success(),
                    code: status.code(),
                    truncated: stdout.truncated || stderr.truncated,
                    stdout: stdout.into_string(),
                    stderr: stderr.into_string(),
                })
            }
            Finished::TimedOut => {
                debug!("Killing `{}` after {:?}", command.display(), limits.timeout);
                let _ = child.kill().await;
                Err(RunError::TimedOut(limits.timeout))
            }
            Finished::Cancelled => {
                debug!("Killing `{}` on cancellation", command.display());
                let _ = child.kill().await;
                Err(RunError::Cancelled)
            }
        }
    }
}

/// Bytes kept from one output stream
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

impl Captured {
    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

async fn collect_output(
    child: &mut Child,
    limit: usize,
) -> io::Result<(ExitStatus, Captured, Captured)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr) = tokio::join!(read_bounded(stdout, limit), read_bounded(stderr, limit));
    let status = child.wait().await?;

    Ok((status, stdout?, stderr?))
}

/// Read a stream to EOF, keeping at most `limit` bytes
async fn read_bounded<R: AsyncRead + Unpin>(reader: Option<R>, limit: usize) -> io::Result<Captured> {
    let mut captured = Captured::default();
    let Some(mut reader) = reader else {
        return Ok(captured);
    };

    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(captured.bytes.len());
        if n > room {
            captured.truncated = true;
        }
        captured.bytes.extend_from_slice(&chunk[..n.min(room)]);
    }

    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;

    fn limits(timeout_ms: u64, max_output_bytes: usize) -> ExecLimits {
        ExecLimits {
            timeout: Duration::from_millis(timeout_ms),
            max_output_bytes,
        }
    }

    #[test]
    fn command_display() {
        let cmd = GitCommand::new(["clone", "https://github.com/a/b.git", "/tmp/x"], limits(10, 10));
        assert_eq!(cmd.display(), "git clone https://github.com/a/b.git /tmp/x");
    }

    #[test]
    fn failure_text_prefers_stderr() {
        let output = GitOutput {
            success: false,
            code: Some(128),
            stdout: "ignored".to_string(),
            stderr: "fatal: not a git repository\n".to_string(),
            truncated: false,
        };
        assert_eq!(output.failure_text(), "fatal: not a git repository");

        let silent = GitOutput {
            code: Some(1),
            ..GitOutput::default()
        };
        assert_eq!(silent.failure_text(), "exited with status 1");
    }

    #[tokio::test]
    async fn read_bounded_truncates() {
        let data = vec![b'x'; 20_000];
        let captured = read_bounded(Some(&data[..]), 1024).await.unwrap();
        assert_eq!(captured.bytes.len(), 1024);
        assert!(captured.truncated);

        let captured = read_bounded(Some(&b"short"[..]), 1024).await.unwrap();
        assert_eq!(captured.into_string(), "short");
    }

    #[tokio::test]
    async fn missing_binary_is_not_found() {
        let runner = ProcessGitRunner::new("bugsmith-definitely-missing-binary");
        let cmd = GitCommand::new(["--version"], limits(2_000, 1024));

        let err = runner.run(&cmd, &CancelToken::never()).await.unwrap_err();
        assert!(matches!(err, RunError::NotFound(_)));
    }

    #[tokio::test]
    async fn already_cancelled_does_not_spawn() {
        let (handle, token) = cancel_pair();
        handle.cancel();
        let runner = ProcessGitRunner::new("bugsmith-definitely-missing-binary");
        let cmd = GitCommand::new(["--version"], limits(2_000, 1024));

        let err = runner.run(&cmd, &token).await.unwrap_err();
        assert!(matches!(err, RunError::Cancelled));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_exit_status_and_streams() {
        let runner = ProcessGitRunner::new("sh");
        let cmd = GitCommand::new(["-c", "echo out; echo err >&2; exit 3"], limits(5_000, 1024));

        let output = runner.run(&cmd, &CancelToken::never()).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.truncated);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn caps_verbose_output() {
        let runner = ProcessGitRunner::new("sh");
        let cmd = GitCommand::new(
            ["-c", "i=0; while [ $i -lt 2000 ]; do echo 0123456789; i=$((i+1)); done"],
            limits(10_000, 100),
        );

        let output = runner.run(&cmd, &CancelToken::never()).await.unwrap();
        assert!(output.success);
        assert!(output.truncated);
        assert_eq!(output.stdout.len(), 100);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn times_out_slow_commands() {
        let runner = ProcessGitRunner::new("sh");
        let cmd = GitCommand::new(["-c", "sleep 10"], limits(100, 1024));

        let started = std::time::Instant::now();
        let err = runner.run(&cmd, &CancelToken::never()).await.unwrap_err();
        assert!(matches!(err, RunError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_kills_child() {
        let runner = ProcessGitRunner::new("sh");
        let cmd = GitCommand::new(["-c", "sleep 10"], limits(20_000, 1024));
        let (handle, token) = cancel_pair();

        let cancel_later = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.cancel();
        };
        let (result, ()) = tokio::join!(runner.run(&cmd, &token), cancel_later);

        assert!(matches!(result.unwrap_err(), RunError::Cancelled));
    }
}
