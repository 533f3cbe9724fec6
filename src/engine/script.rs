//! External script execution for script checks
//!
//! A script is invoked as `<runtime> <script> <document text>` and must
//! print a JSON array of alert records on success. Execution goes through
//! the [`ScriptRunner`] trait so tests can substitute the process layer.

use crate::config::DEFAULT_SCRIPT_TIMEOUT_MS;
use crate::error::ScriptError;
use crate::rules::Check;
use crate::types::{Alert, Severity, Span};
use serde::Deserialize;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs an external program and returns its standard output
pub trait ScriptRunner: Send + Sync {
    /// Runs `runtime script text`, failing if it does not exit successfully
    /// within `timeout`
    fn run(
        &self,
        runtime: &str,
        script: &Path,
        text: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, ScriptError>;
}

/// [`ScriptRunner`] backed by `std::process`
///
/// The child is polled until it exits or the timeout elapses; on timeout
/// it is killed. Its output pipes must also close before the deadline, so
/// a background process holding them open counts as a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ScriptRunner for ProcessRunner {
    fn run(
        &self,
        runtime: &str,
        script: &Path,
        text: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, ScriptError> {
        let mut child = Command::new(runtime)
            .arg(script)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ScriptError::Spawn {
                command: format!("{} {}", runtime, script.display()),
                source,
            })?;

        // Drain both pipes concurrently so a chatty child cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill() {
                    tracing::warn!(script = %script.display(), error = %e, "failed to kill timed out script");
                }
                let _ = child.wait();
                return Err(ScriptError::Timeout(timeout.as_millis()));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = collect(&stdout, deadline, timeout)?;
        let stderr = collect(&stderr, deadline, timeout)?;

        if !status.success() {
            return Err(ScriptError::Failed {
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

type Drain = Receiver<io::Result<Vec<u8>>>;

/// Reads a pipe to its end on a detached thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match pipe {
            Some(mut pipe) => pipe.read_to_end(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        // The receiver is gone once the run timed out.
        let _ = tx.send(result);
    });
    rx
}

/// Waits for a drained pipe until `deadline`
fn collect(rx: &Drain, deadline: Instant, timeout: Duration) -> Result<Vec<u8>, ScriptError> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(result) => Ok(result?),
        Err(RecvTimeoutError::Timeout) => Err(ScriptError::Timeout(timeout.as_millis())),
        Err(RecvTimeoutError::Disconnected) => {
            Err(io::Error::other("pipe reader stopped").into())
        }
    }
}

/// An alert-shaped record printed by a script
///
/// Missing fields fall back to the owning check's values. Capitalized
/// keys are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptAlert {
    #[serde(default, alias = "Check")]
    pub check: Option<String>,
    #[serde(default, alias = "Severity")]
    pub severity: Option<String>,
    #[serde(alias = "Span")]
    pub span: Span,
    #[serde(default, alias = "Message")]
    pub message: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(default, alias = "Link")]
    pub link: Option<String>,
}

impl ScriptAlert {
    /// Converts the record, dropping it if its span lies outside the text
    pub fn into_alert(self, check: &Check, text_len: usize) -> Option<Alert> {
        if self.span.start > self.span.end || self.span.end > text_len {
            tracing::warn!(
                check = %check.name,
                start = self.span.start,
                end = self.span.end,
                "dropping script alert with out-of-range span"
            );
            return None;
        }

        Some(Alert {
            check: self.check.unwrap_or_else(|| check.name.to_string()),
            severity: self
                .severity
                .as_deref()
                .and_then(Severity::from_level)
                .unwrap_or(check.severity),
            span: self.span,
            message: self.message,
            description: self.description,
            link: self.link.or_else(|| check.link.clone()),
        })
    }
}

/// The runner and timeout script checks execute with
#[derive(Clone)]
pub struct ScriptHost {
    runner: Arc<dyn ScriptRunner>,
    timeout: Duration,
}

impl ScriptHost {
    /// A host running real processes
    pub fn new(timeout: Duration) -> Self {
        Self::with_runner(ProcessRunner, timeout)
    }

    pub fn with_runner(runner: impl ScriptRunner + 'static, timeout: Duration) -> Self {
        Self {
            runner: Arc::new(runner),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs a script and parses its output
    ///
    /// # Errors
    ///
    /// Returns `ScriptError` if the process fails, times out, or prints
    /// something other than a JSON array of alert records.
    pub fn execute(
        &self,
        runtime: &str,
        script: &Path,
        text: &str,
    ) -> Result<Vec<ScriptAlert>, ScriptError> {
        let stdout = self.runner.run(runtime, script, text, self.timeout)?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SCRIPT_TIMEOUT_MS))
    }
}

impl std::fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptHost")
            .field("runner", &"<ScriptRunner>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
