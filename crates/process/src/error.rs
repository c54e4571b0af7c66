//! Errors raised by process runners.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for process execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while running shell commands.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The shell could not be started.
    #[error("Failed to execute command '{command}'")]
    #[diagnostic(
        code(devkit::process::spawn),
        help("Check that the shell and the program are available on PATH")
    )]
    Spawn {
        /// The command line that was attempted.
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A captured command exited unsuccessfully.
    #[error("Command '{command}' exited with code {code}")]
    #[diagnostic(code(devkit::process::non_zero_exit))]
    NonZeroExit {
        /// The command line that ran.
        command: String,
        /// Exit code, or 1 when the process was terminated by a signal.
        code: i32,
        /// Combined stdout and stderr.
        output: String,
    },
}

impl Error {
    pub(crate) fn spawn(command: &str, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.to_string(),
            source,
        }
    }
}
