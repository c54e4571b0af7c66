//! CLI error types rendered through miette.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the devkit command line.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Could not read configuration file {}", path.display())]
    #[diagnostic(
        code(devkit::cli::config_read),
        help("Check the --config path; without the flag ./devkit.toml is optional")
    )]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parsing failed: {message}")]
    #[diagnostic(code(devkit::cli::config_parse))]
    ConfigParse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("error occurred here")]
        span: Option<SourceSpan>,
    },

    #[error("No installers requested")]
    #[diagnostic(
        code(devkit::cli::nothing_to_install),
        help("Pass installer ids or set `default` in the [install] section of devkit.toml")
    )]
    NothingToInstall,

    #[error("{failed} of {total} workspace packages failed")]
    #[diagnostic(code(devkit::cli::workspace_failures))]
    WorkspaceFailures { failed: usize, total: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Workspace(#[from] devkit_workspaces::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Installers(#[from] devkit_installers::Error),

    #[error("Failed to serialize output")]
    #[diagnostic(code(devkit::cli::output))]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Wrap a TOML error with the offending source so miette can point at it.
    pub fn config_parse(path: &std::path::Path, source: String, error: &toml::de::Error) -> Self {
        Self::ConfigParse {
            message: error.message().to_string(),
            span: error.span().map(SourceSpan::from),
            src: NamedSource::new(path.display().to_string(), source),
        }
    }
}
