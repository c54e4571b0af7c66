//! Process runner for devkit.
//!
//! Everything devkit executes goes through the [`ProcessRunner`] trait:
//! package scripts, package-manager invocations and installer commands.
//! [`ShellRunner`] is the production implementation; tests substitute their
//! own runner to record or fake command execution.

mod error;
mod runner;

pub use error::{Error, Result};
pub use runner::{ProcessRunner, ShellRunner};
