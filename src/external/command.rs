//! Base command execution abstraction
//!
//! Provides the process-execution interface the versioning facade is built on.
//! Every external call is described by an [`Invocation`] and answered with a
//! [`CommandOutput`], so tests can swap in a fake executor.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// A single external process call, usually scoped to a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// `None` runs the child in the caller's current directory.
    pub working_dir: Option<PathBuf>,
    /// Text written to the child's standard input, if any.
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I, working_dir: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: Some(working_dir.to_path_buf()),
            stdin: None,
        }
    }

    /// An invocation with no working directory requirement.
    pub fn unscoped<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// The argument list as a single space separated string, for logs and errors.
    pub fn display_args(&self) -> String {
        self.args.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }

    /// Joins whichever of stdout and stderr carry text, stdout first.
    ///
    /// Empty streams are skipped rather than concatenated, so a failure that only
    /// writes to stderr still yields the stderr text.
    pub fn diagnostic(&self) -> String {
        [self.stdout.trim(), self.stderr.trim()]
            .into_iter()
            .filter(|stream| !stream.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command execution failed: {message}")]
    ExecutionFailed { message: String },
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
    #[error("Working directory not found: {path}")]
    WorkingDirectoryNotFound { path: String },
    #[error("IO error: {message}")]
    Io { message: String },
}

/// Trait for executing external commands
///
/// The facade never touches `tokio::process` directly; it hands an
/// [`Invocation`] to whichever executor it was constructed with.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;
}

/// Real implementation spawning child processes with `tokio::process::Command`.
///
/// No timeout is applied: a child that never exits keeps the caller waiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl ProcessCommandExecutor {
    // Spawning reports a missing cwd and a missing program with the same kind.
    fn map_spawn_error(invocation: &Invocation, error: std::io::Error) -> CommandError {
        if error.kind() != std::io::ErrorKind::NotFound {
            return CommandError::Io {
                message: error.to_string(),
            };
        }
        match &invocation.working_dir {
            Some(dir) if !dir.is_dir() => CommandError::WorkingDirectoryNotFound {
                path: dir.display().to_string(),
            },
            _ => CommandError::CommandNotFound {
                command: invocation.program.clone(),
            },
        }
    }
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        use tokio::process::Command;

        let started = Instant::now();
        let mut command = Command::new(&invocation.program);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }
        command
            .args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = command
            .spawn()
            .map_err(|e| Self::map_spawn_error(invocation, e))?;

        if let Some(input) = &invocation.stdin {
            let mut stdin = child.stdin.take().ok_or_else(|| CommandError::ExecutionFailed {
                message: "child process stdin was not captured".to_string(),
            })?;
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| CommandError::Io { message: e.to_string() })?;
            // Closing stdin signals end of input to the child.
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CommandError::Io { message: e.to_string() })?;

        let status_code = output.status.code().unwrap_or(-1);
        debug!(
            program = %invocation.program,
            args = %invocation.display_args(),
            working_dir = ?invocation.working_dir,
            status_code,
            duration_ms = started.elapsed().as_millis() as u64,
            "External command finished"
        );

        Ok(CommandOutput {
            status_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
