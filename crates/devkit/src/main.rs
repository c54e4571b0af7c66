//! devkit command line.

mod cli;
mod commands;
mod config;
mod errors;
mod render;
mod tracing;

use crate::cli::parse;
use crate::commands::{Command, CommandExecutor};
use crate::config::DevkitConfig;
use crate::tracing::{TracingConfig, TracingFormat};

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    if let Err(error) = run_main().await {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> miette::Result<()> {
    let cli = parse();

    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            cli.log_format
        },
        level: cli.level.into(),
        ..Default::default()
    };
    crate::tracing::init_tracing(tracing_config)?;

    let config = DevkitConfig::load(cli.config.as_deref())?;
    let command: Command = cli.command.into();
    CommandExecutor::new(config, cli.format)
        .execute(command)
        .await?;

    Ok(())
}
