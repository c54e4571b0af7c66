//! Command output on stdout.

use crate::errors::CliError;
use serde::Serialize;

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// A command result printable as text or JSON.
pub trait Render: Serialize {
    /// Text rendering; empty prints nothing.
    fn text(&self) -> String;
}

/// Print `output` to stdout in `format`.
#[allow(clippy::print_stdout)]
pub fn emit<R: Render>(output: &R, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            let text = output.text();
            if !text.is_empty() {
                println!("{text}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(output)?),
    }
    Ok(())
}
