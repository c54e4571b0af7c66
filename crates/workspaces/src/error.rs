//! Error types for workspace operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during workspace operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No manifest at the given location.
    #[error("Manifest file not found at path: {path}")]
    #[diagnostic(
        code(devkit::workspaces::manifest_not_found),
        help("Pass either a package.json file or a directory that contains one")
    )]
    ManifestNotFound {
        /// The path that was searched.
        path: PathBuf,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(devkit::workspaces::io_error),
        help("Check that the referenced paths exist and that you have permission to read them")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// JSON parsing error.
    #[error("JSON parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(devkit::workspaces::json_error),
        help("Ensure the manifest has valid syntax and matches the package.json schema")
    )]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },

    /// A workspace member glob could not be compiled.
    #[error("Invalid workspace pattern '{pattern}': {source}")]
    #[diagnostic(
        code(devkit::workspaces::invalid_glob),
        help("Check the `workspaces` field of the root manifest")
    )]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A workspace member has no `name`, so it cannot take part in ordering.
    #[error("Workspace package at {path} has no name")]
    #[diagnostic(
        code(devkit::workspaces::unnamed_package),
        help("Add a `name` field to the member's package.json")
    )]
    UnnamedPackage {
        /// Directory of the unnamed package.
        path: PathBuf,
    },

    /// Two workspace members share a name.
    #[error("Workspace package name '{name}' is used by both {first} and {second}")]
    #[diagnostic(
        code(devkit::workspaces::duplicate_package_name),
        help("Package names must be unique within a workspace")
    )]
    DuplicatePackageName {
        /// The shared name.
        name: String,
        /// Directory of the first package with this name.
        first: PathBuf,
        /// Directory of the second package with this name.
        second: PathBuf,
    },

    /// The requested script is not defined by the package.
    #[error("Script '{script}' is not defined in package '{package}'")]
    #[diagnostic(
        code(devkit::workspaces::script_missing),
        help("Define the script in package.json or run with --skip-missing")
    )]
    ScriptMissing {
        /// Package name, or its directory when unnamed.
        package: String,
        /// The script name.
        script: String,
    },

    /// The script ran and exited unsuccessfully.
    #[error("Script '{script}' in package '{package}' failed with exit code {code}")]
    #[diagnostic(code(devkit::workspaces::script_failed))]
    ScriptFailed {
        /// Package name, or its directory when unnamed.
        package: String,
        /// The script name.
        script: String,
        /// Exit code of the script.
        code: i32,
    },

    /// A command line ran in a package and exited unsuccessfully.
    #[error("Command '{command}' in package '{package}' failed with exit code {code}")]
    #[diagnostic(code(devkit::workspaces::command_failed))]
    CommandFailed {
        /// Package name, or its directory when unnamed.
        package: String,
        /// The command line.
        command: String,
        /// Exit code of the command.
        code: i32,
    },

    /// A command could not be run.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Process(#[from] devkit_process::Error),

    /// The workspace dependency graph is invalid.
    #[error("Workspace dependency graph error: {0}")]
    #[diagnostic(
        code(devkit::workspaces::graph),
        help("Check the dependencies between workspace packages for cycles")
    )]
    Graph(#[from] devkit_task_graph::Error),
}

impl Error {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>, operation: &str) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
            operation: operation.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_duplicate_package_name_message() {
        let error = Error::DuplicatePackageName {
            name: "shared".to_string(),
            first: PathBuf::from("/repo/pkgs/a"),
            second: PathBuf::from("/repo/pkgs/b"),
        };

        let message = error.to_string();
        assert!(message.contains("'shared'"));
        assert!(message.contains("/repo/pkgs/a"));
        assert!(message.contains("/repo/pkgs/b"));
    }

    #[test]
    fn test_io_error_no_path() {
        let error = Error::Io {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            path: None,
            operation: "reading directory".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("I/O error during reading directory"));
        assert!(!message.contains(" at "));
    }

    #[test]
    fn test_json_error_with_path() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let error = Error::Json {
            source,
            path: Some(PathBuf::from("/repo/package.json")),
        };
        assert!(error.to_string().contains("in /repo/package.json"));
    }

    #[test]
    fn test_graph_error_conversion() {
        let error: Error = devkit_task_graph::Error::CycleDetected {
            nodes: vec!["a".into(), "b".into()],
        }
        .into();
        assert!(error.to_string().contains("a, b"));
        assert_eq!(
            error.code().map(|c| c.to_string()),
            Some("devkit::workspaces::graph".to_string())
        );
    }

    #[test]
    fn test_diagnostic_codes_and_help() {
        let errors = [
            Error::ManifestNotFound {
                path: PathBuf::from("/x"),
            },
            Error::UnnamedPackage {
                path: PathBuf::from("/x"),
            },
            Error::ScriptMissing {
                package: "a".into(),
                script: "build".into(),
            },
        ];
        for error in &errors {
            assert!(error.code().is_some());
            assert!(error.help().is_some());
        }
    }
}
