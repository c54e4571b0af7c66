pub mod install;
pub mod workspace;

use crate::config::DevkitConfig;
use crate::errors::CliError;
use crate::render::{OutputFormat, emit};
use devkit_installers::{InstallerAction, InstallerService, Platform};
use devkit_process::{ProcessRunner, ShellRunner};
use devkit_workspaces::{WorkspaceCallConfig, WorkspacePackage, WorkspaceRunScriptConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

/// A parsed command with CLI flags resolved to partial configs.
#[derive(Debug, Clone)]
pub enum Command {
    WorkspaceList {
        path: PathBuf,
        flags: WorkspaceCallConfig,
        tiers: bool,
    },
    WorkspaceRun {
        path: PathBuf,
        flags: WorkspaceCallConfig,
        script: String,
        throw_on_missing: Option<bool>,
    },
    WorkspaceExec {
        path: PathBuf,
        flags: WorkspaceCallConfig,
        command: String,
    },
    WorkspaceInstall {
        path: PathBuf,
        flags: WorkspaceCallConfig,
    },
    Install {
        action: InstallerAction,
        ids: Vec<String>,
        platform: Option<Platform>,
    },
    Installed {
        id: String,
        platform: Option<Platform>,
    },
    Installers {
        platform: Option<Platform>,
        all: bool,
    },
}

impl Command {
    /// Name used in the command span.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WorkspaceList { .. } => "workspace list",
            Self::WorkspaceRun { .. } => "workspace run",
            Self::WorkspaceExec { .. } => "workspace exec",
            Self::WorkspaceInstall { .. } => "workspace install",
            Self::Install {
                action: InstallerAction::InstallOrUpdate,
                ..
            } => "install",
            Self::Install {
                action: InstallerAction::Update,
                ..
            } => "update",
            Self::Install {
                action: InstallerAction::Uninstall,
                ..
            } => "uninstall",
            Self::Installed { .. } => "installed",
            Self::Installers { .. } => "installers",
        }
    }
}

/// Executes commands against one loaded configuration.
pub struct CommandExecutor {
    config: DevkitConfig,
    format: OutputFormat,
    runner: Arc<dyn ProcessRunner>,
}

impl CommandExecutor {
    pub fn new(config: DevkitConfig, format: OutputFormat) -> Self {
        Self {
            config,
            format,
            runner: Arc::new(ShellRunner::new()),
        }
    }

    pub async fn execute(&self, command: Command) -> Result<(), CliError> {
        let span = crate::command_span!(command.name());
        self.dispatch(command).instrument(span).await
    }

    async fn dispatch(&self, command: Command) -> Result<(), CliError> {
        match command {
            Command::WorkspaceList { path, flags, tiers } => {
                let root = self.workspace(&path)?;
                let list = workspace::list(&root, &self.call_config(flags), tiers).await?;
                emit(&list, self.format)
            }
            Command::WorkspaceRun {
                path,
                flags,
                script,
                throw_on_missing,
            } => {
                let root = self.workspace(&path)?;
                let config = WorkspaceRunScriptConfig {
                    call: self.call_config(flags),
                    throw_on_missing,
                };
                let summary = workspace::run(&root, &script, &config).await?;
                emit(&summary, self.format)?;
                summary.into_result().map(drop)
            }
            Command::WorkspaceExec {
                path,
                flags,
                command,
            } => {
                let root = self.workspace(&path)?;
                let summary = workspace::exec(&root, &command, &self.call_config(flags)).await?;
                emit(&summary, self.format)?;
                summary.into_result().map(drop)
            }
            Command::WorkspaceInstall { path, flags } => {
                let root = self.workspace(&path)?;
                let summary = workspace::install(&root, &self.call_config(flags)).await?;
                emit(&summary, self.format)?;
                summary.into_result().map(drop)
            }
            Command::Install {
                action,
                ids,
                platform,
            } => {
                let service = self.installers(platform)?;
                let summary =
                    install::run(&service, action, ids, &self.config.install.default).await?;
                emit(&summary, self.format)
            }
            Command::Installed { id, platform } => {
                let service = self.installers(platform)?;
                let status = install::installed(&service, &id).await?;
                emit(&status, self.format)
            }
            Command::Installers { platform, all } => {
                let service = self.installers(platform)?;
                emit(&install::list(&service, all)?, self.format)
            }
        }
    }

    /// Flags win over `[workspace]` in devkit.toml.
    fn call_config(&self, flags: WorkspaceCallConfig) -> WorkspaceCallConfig {
        flags.merge(self.config.workspace)
    }

    fn workspace(&self, path: &Path) -> Result<WorkspacePackage, CliError> {
        Ok(WorkspacePackage::load(path, Arc::clone(&self.runner))?)
    }

    fn installers(&self, platform: Option<Platform>) -> Result<InstallerService, CliError> {
        let registry = self.config.installer_registry(&self.runner)?;
        let service = InstallerService::new(registry);
        Ok(match platform {
            Some(platform) => service.with_platform(platform),
            None => service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let config = DevkitConfig {
            workspace: WorkspaceCallConfig {
                parallel: Some(true),
                dependencies: Some(true),
                ..WorkspaceCallConfig::default()
            },
            ..DevkitConfig::default()
        };
        let executor = CommandExecutor::new(config, OutputFormat::Text);
        let flags = WorkspaceCallConfig {
            dev_dependencies: Some(true),
            ..WorkspaceCallConfig::default()
        };

        let options = executor.call_config(flags).resolve();
        assert!(options.sorting.parallel);
        assert!(options.sorting.dependencies);
        assert!(options.sorting.dev_dependencies);
        assert!(!options.throw_on_error);
    }

    #[test]
    fn test_command_names() {
        let command = Command::Install {
            action: InstallerAction::Update,
            ids: Vec::new(),
            platform: None,
        };
        assert_eq!(command.name(), "update");
    }
}
