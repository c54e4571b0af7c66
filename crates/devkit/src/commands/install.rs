//! Installer subcommands.

use crate::errors::CliError;
use crate::render::Render;
use devkit_installers::{InstallerAction, InstallerDescriptor, InstallerService, Platform};
use serde::Serialize;
use std::fmt::Write;

/// Installers that ran for an install, update or uninstall request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub action: String,
    pub platform: Platform,
    pub requested: Vec<String>,
    pub ran: Vec<String>,
}

impl Render for RunSummary {
    fn text(&self) -> String {
        if self.ran.is_empty() {
            return format!("Nothing to {}", self.action);
        }
        let mut out = String::new();
        for id in &self.ran {
            let _ = writeln!(out, "{}: {id}", self.action);
        }
        out.trim_end().to_string()
    }
}

/// Run `action` for `ids`, falling back to `defaults` when none are given.
pub async fn run(
    service: &InstallerService,
    action: InstallerAction,
    ids: Vec<String>,
    defaults: &[String],
) -> Result<RunSummary, CliError> {
    let requested = if ids.is_empty() { defaults.to_vec() } else { ids };
    if requested.is_empty() {
        return Err(CliError::NothingToInstall);
    }

    let ran = match action {
        InstallerAction::InstallOrUpdate => service.install_or_update(&requested).await?,
        InstallerAction::Update => service.update(&requested).await?,
        InstallerAction::Uninstall => service.uninstall(&requested).await?,
    };

    Ok(RunSummary {
        action: action.to_string(),
        platform: service.platform()?,
        requested,
        ran,
    })
}

/// Installation state of one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledStatus {
    pub id: String,
    pub installed: bool,
}

impl Render for InstalledStatus {
    fn text(&self) -> String {
        if self.installed {
            format!("{} is installed", self.id)
        } else {
            format!("{} is not installed", self.id)
        }
    }
}

pub async fn installed(service: &InstallerService, id: &str) -> Result<InstalledStatus, CliError> {
    Ok(InstalledStatus {
        id: id.to_string(),
        installed: service.is_installed(id).await?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallerSummary {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    pub platforms: Vec<Platform>,
    pub available: bool,
}

impl InstallerSummary {
    fn new(descriptor: &InstallerDescriptor, platform: Platform) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            categories: descriptor.categories.clone(),
            platforms: descriptor.platforms.supported(),
            available: descriptor.supports(platform),
        }
    }
}

/// Registered installers for the target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallerList {
    pub platform: Platform,
    pub installers: Vec<InstallerSummary>,
}

impl Render for InstallerList {
    fn text(&self) -> String {
        let mut out = String::new();
        for installer in &self.installers {
            let _ = write!(out, "{:<12} {}", installer.id, installer.name);
            if !installer.available {
                let platforms: Vec<&str> = installer.platforms.iter().map(|p| p.as_str()).collect();
                let _ = write!(out, " [{} only]", platforms.join(", "));
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

pub fn list(service: &InstallerService, all: bool) -> Result<InstallerList, CliError> {
    let platform = service.platform()?;
    let installers = service
        .registry()
        .iter()
        .filter(|descriptor| all || descriptor.supports(platform))
        .map(|descriptor| InstallerSummary::new(descriptor, platform))
        .collect();
    Ok(InstallerList {
        platform,
        installers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DevkitConfig;
    use devkit_process::{ProcessRunner, ShellRunner};
    use std::sync::Arc;

    fn service(platform: Platform) -> InstallerService {
        let runner: Arc<dyn ProcessRunner> = Arc::new(ShellRunner::new());
        let registry = DevkitConfig::default().installer_registry(&runner).unwrap();
        InstallerService::new(registry).with_platform(platform)
    }

    #[test]
    fn test_list_filters_by_platform() {
        let linux = list(&service(Platform::Linux), false).unwrap();
        let ids: Vec<&str> = linux.installers.iter().map(|i| i.id.as_str()).collect();
        assert!(ids.contains(&"git"));
        assert!(!ids.contains(&"vscode"));

        let all = list(&service(Platform::Linux), true).unwrap();
        let vscode = all.installers.iter().find(|i| i.id == "vscode").unwrap();
        assert!(!vscode.available);
        assert!(all.text().contains("[wsl, windows only]"));
    }

    #[tokio::test]
    async fn test_nothing_requested() {
        let err = run(&service(Platform::Linux), InstallerAction::InstallOrUpdate, vec![], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::NothingToInstall));
    }

    #[tokio::test]
    async fn test_unknown_installer_fails_before_running() {
        let err = run(
            &service(Platform::Linux),
            InstallerAction::InstallOrUpdate,
            vec!["vscode".to_string()],
            &[],
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Installers(devkit_installers::Error::InstallerNotFound { .. })
        ));
    }

    #[test]
    fn test_run_summary_text() {
        let summary = RunSummary {
            action: InstallerAction::Uninstall.to_string(),
            platform: Platform::Linux,
            requested: vec!["pnpm".to_string()],
            ran: vec!["pnpm".to_string(), "node".to_string()],
        };
        assert_eq!(summary.text(), "uninstall: pnpm\nuninstall: node");
    }
}
