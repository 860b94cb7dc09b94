//! Execution runner.
//!
//! One shell invocation per run: no persistent session, nothing carried
//! between runs. Runs are dispatched onto the tokio runtime and report back
//! through a channel as [`Completion`] values; they never touch notebook
//! state themselves.

use std::io;
use std::process::{Output, Stdio};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::command::{CommandId, NO_EXIT_CODE};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("process exited without a status code (killed by a signal?)")]
    Terminated,
}

/// What a single run produced.
#[derive(Debug)]
pub struct RunOutput {
    /// stdout, then stderr, trailing newlines trimmed.
    pub output: String,
    pub exit_code: i32,
    pub spawn_error: Option<RunError>,
}

impl RunOutput {
    fn failed(error: RunError) -> Self {
        Self {
            output: String::new(),
            exit_code: NO_EXIT_CODE,
            spawn_error: Some(error),
        }
    }
}

// ════════════════════════════════════════════════════════════════════
// ShellRunner
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRunner {
    program: String,
    flag: String,
    /// Tried with the same flag when `program` is not installed.
    fallback: Option<String>,
}

impl Default for ShellRunner {
    /// `bash -c` (falling back to `sh`), or `cmd /C` on Windows.
    fn default() -> Self {
        if cfg!(windows) {
            Self::new("cmd", "/C")
        } else {
            Self::new("bash", "-c").with_fallback("sh")
        }
    }
}

impl ShellRunner {
    pub fn new(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, program: impl Into<String>) -> Self {
        self.fallback = Some(program.into());
        self
    }

    /// Use `program` with the platform's usual "run this string" flag.
    pub fn with_program(program: impl Into<String>) -> Self {
        let program = program.into();
        let flag = if program.eq_ignore_ascii_case("cmd") || program.eq_ignore_ascii_case("cmd.exe") {
            "/C"
        } else {
            "-c"
        };
        Self::new(program, flag)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Run `command` to completion and capture its outcome.
    pub async fn run(&self, command: &str) -> RunOutput {
        let mut program = self.program.as_str();
        let mut result = self.spawn(program, command).await;

        if let Some(fallback) = self.fallback.as_deref() {
            if matches!(&result, Err(e) if e.kind() == io::ErrorKind::NotFound) {
                tracing::warn!(shell = program, fallback, "shell not found, using fallback");
                program = fallback;
                result = self.spawn(program, command).await;
            }
        }

        let output = match result {
            Ok(output) => output,
            Err(source) => {
                return RunOutput::failed(RunError::Spawn {
                    program: program.to_string(),
                    source,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let merged = merge_output(&stdout, &stderr);

        match output.status.code() {
            Some(code) => RunOutput {
                output: merged,
                exit_code: code,
                spawn_error: None,
            },
            None => RunOutput {
                output: merged,
                exit_code: NO_EXIT_CODE,
                spawn_error: Some(RunError::Terminated),
            },
        }
    }

    async fn spawn(&self, program: &str, command: &str) -> io::Result<Output> {
        tokio::process::Command::new(program)
            .args([self.flag.as_str(), command])
            .stdin(Stdio::null())
            .output()
            .await
    }
}

/// stdout first, a single `\n` between the streams only when both are
/// present, trailing newlines trimmed from the result.
pub fn merge_output(stdout: &str, stderr: &str) -> String {
    let mut merged = stdout.to_string();
    if !stderr.is_empty() {
        if !merged.is_empty() {
            merged.push('\n');
        }
        merged.push_str(stderr);
    }
    merged.truncate(merged.trim_end_matches('\n').len());
    merged
}

// ════════════════════════════════════════════════════════════════════
// Dispatch
// ════════════════════════════════════════════════════════════════════

/// Report of a finished run, delivered back to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: CommandId,
    pub exit_code: i32,
    pub output: String,
}

pub type CompletionReceiver = mpsc::UnboundedReceiver<Completion>;

/// Spawns runs as independent tasks. Each task owns only the command text
/// and a sender; its result comes back as a [`Completion`].
#[derive(Debug, Clone)]
pub struct RunDispatcher {
    runner: Arc<ShellRunner>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl RunDispatcher {
    pub fn new(runner: ShellRunner) -> (Self, CompletionReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            runner: Arc::new(runner),
            completions: tx,
        };
        (dispatcher, rx)
    }

    /// Must be called from inside a tokio runtime.
    pub fn dispatch(&self, id: CommandId, command: String) {
        let runner = self.runner.clone();
        let tx = self.completions.clone();

        tokio::spawn(async move {
            let result = runner.run(&command).await;
            if let Some(err) = &result.spawn_error {
                tracing::warn!(id, error = %err, "run did not produce an exit status");
            }
            tracing::info!(
                id,
                exit_code = result.exit_code,
                output_bytes = result.output.len(),
                "run finished"
            );

            let completion = Completion {
                id,
                exit_code: result.exit_code,
                output: result.output,
            };
            if tx.send(completion).is_err() {
                tracing::debug!(id, "completion dropped, event loop already gone");
            }
        });
    }
}
