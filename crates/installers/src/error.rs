//! Error types for installer operations.

use crate::installer::InstallerAction;
use crate::platform::Platform;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for installer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or running installers.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No installer with this id supports the platform.
    #[error("Could not find installer with id '{id}' for platform {platform}")]
    #[diagnostic(
        code(devkit::installers::not_found),
        help("Run `devkit installers` to list the installers available on this platform")
    )]
    InstallerNotFound {
        /// The requested installer id.
        id: String,
        /// The platform it was requested for.
        platform: Platform,
    },

    /// The host platform is not one devkit can install on.
    #[error("Could not detect platform")]
    #[diagnostic(
        code(devkit::installers::platform_detection),
        help("Installers support linux, wsl and windows; pass --platform to override detection")
    )]
    PlatformDetection,

    /// An installer definition failed validation.
    #[error("Invalid installer '{id}': {reason}")]
    #[diagnostic(code(devkit::installers::invalid))]
    InvalidInstaller {
        /// Id of the offending installer, possibly empty.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two installers share an id.
    #[error("Installer '{id}' is already registered")]
    #[diagnostic(
        code(devkit::installers::duplicate),
        help("Installer ids must be unique across all manifests")
    )]
    DuplicateInstaller {
        /// The repeated id.
        id: String,
    },

    /// An installer command exited unsuccessfully.
    #[error("Installer '{installer}' failed to {action}: `{command}` exited with code {code}")]
    #[diagnostic(code(devkit::installers::command_failed))]
    CommandFailed {
        /// Installer id.
        installer: String,
        /// The step that failed.
        action: InstallerAction,
        /// The command line.
        command: String,
        /// Its exit code.
        code: i32,
    },

    /// The installer cannot perform this action.
    #[error("Installer '{installer}' does not support {action}")]
    #[diagnostic(code(devkit::installers::unsupported))]
    Unsupported {
        /// Installer id.
        installer: String,
        /// The requested step.
        action: InstallerAction,
    },

    /// A command could not be run.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Process(#[from] devkit_process::Error),

    /// The installer dependency graph is invalid.
    #[error("Installer dependency graph error: {0}")]
    #[diagnostic(
        code(devkit::installers::graph),
        help("Check the `dependencies` of the requested installers for cycles")
    )]
    Graph(#[from] devkit_task_graph::Error),

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(code(devkit::installers::io_error))]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// TOML parsing error.
    #[error("TOML parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(devkit::installers::toml_error),
        help("Ensure the installer manifest has valid syntax and uses `[[installer]]` tables")
    )]
    Toml {
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },
}

impl Error {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInstaller {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(source: std::io::Error, path: Option<PathBuf>, operation: &str) -> Self {
        Self::Io {
            source,
            path,
            operation: operation.to_string(),
        }
    }
}
