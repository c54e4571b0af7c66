//! Shell command execution.

use crate::{Error, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Executes shell command lines.
///
/// Every method takes a complete command line that is handed to the
/// platform shell, plus an optional working directory.
#[async_trait]
pub trait ProcessRunner: Send + Sync + Debug {
    /// Run the command with inherited stdio and return its exit code.
    ///
    /// A non-zero exit is not an error; a process killed by a signal
    /// reports code 1.
    async fn exec(&self, command: &str, cwd: Option<&Path>) -> Result<i32>;

    /// Run the command with captured output.
    ///
    /// Returns stdout followed by stderr. A non-zero exit fails with
    /// [`Error::NonZeroExit`] carrying the same combined output.
    async fn run(&self, command: &str, cwd: Option<&Path>) -> Result<String>;

    /// Start the command detached from devkit and return immediately.
    fn start(&self, command: &str, cwd: Option<&Path>) -> Result<()>;
}

/// [`ProcessRunner`] backed by `sh -c` (`cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a new shell runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn command(command: &str, cwd: Option<&Path>) -> Command {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        };
        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        };

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl ProcessRunner for ShellRunner {
    async fn exec(&self, command: &str, cwd: Option<&Path>) -> Result<i32> {
        tracing::info!(cwd = ?cwd, "Executing command: {}", command);

        let status = Self::command(command, cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::spawn(command, e))?;

        let code = status.code().unwrap_or(1);
        tracing::debug!(code, "Command finished: {}", command);
        Ok(code)
    }

    async fn run(&self, command: &str, cwd: Option<&Path>) -> Result<String> {
        tracing::info!(cwd = ?cwd, "Running command: {}", command);

        let output = Self::command(command, cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::spawn(command, e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(Error::NonZeroExit {
                command: command.to_string(),
                code: output.status.code().unwrap_or(1),
                output: combined,
            })
        }
    }

    fn start(&self, command: &str, cwd: Option<&Path>) -> Result<()> {
        tracing::info!(cwd = ?cwd, "Starting detached command: {}", command);

        Self::command(command, cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| Error::spawn(command, e))
    }
}
