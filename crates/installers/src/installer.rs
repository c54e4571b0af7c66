//! The installer trait implemented per platform.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Steps an installer can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallerAction {
    /// Install, or update when already installed.
    InstallOrUpdate,
    /// Update an existing installation.
    Update,
    /// Remove the tool.
    Uninstall,
}

impl fmt::Display for InstallerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InstallOrUpdate => "install or update",
            Self::Update => "update",
            Self::Uninstall => "uninstall",
        })
    }
}

/// A tool installer for one platform.
///
/// Instances are produced by an
/// [`InstallerFactory`](crate::InstallerFactory) for every resolution pass.
#[async_trait]
pub trait PlatformInstaller: Send + Sync + fmt::Debug {
    /// Installer id, unique within a registry.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Ids of the installers that must run before this one.
    fn dependencies(&self) -> &[String] {
        &[]
    }

    /// Whether the tool is present.
    async fn is_installed(&self) -> Result<bool>;

    /// Install the tool, or update it when it is already present.
    async fn install_or_update(&self) -> Result<()>;

    /// Update the tool.
    async fn update(&self) -> Result<()>;

    /// Remove the tool.
    async fn uninstall(&self) -> Result<()>;

    /// Hook run before `action`. Returning `false` skips the step.
    async fn before(&self, _action: InstallerAction) -> Result<bool> {
        Ok(true)
    }

    /// Hook run after `action` completed.
    async fn after(&self, _action: InstallerAction) -> Result<()> {
        Ok(())
    }
}

/// Run one step of `installer` surrounded by its hooks.
///
/// Returns whether the step ran.
pub async fn run_action(installer: &dyn PlatformInstaller, action: InstallerAction) -> Result<bool> {
    if !installer.before(action).await? {
        tracing::warn!(installer = installer.id(), %action, "Skipped by before hook");
        return Ok(false);
    }

    tracing::info!(installer = installer.id(), %action, "Running installer");
    match action {
        InstallerAction::InstallOrUpdate => installer.install_or_update().await?,
        InstallerAction::Update => installer.update().await?,
        InstallerAction::Uninstall => installer.uninstall().await?,
    }

    installer.after(action).await?;
    Ok(true)
}
