//! `devkit.toml` loading.
//!
//! ```toml
//! [workspace]
//! parallel = true
//! dependencies = true
//!
//! [install]
//! default = ["node", "pnpm"]
//!
//! [[installer]]
//! id = "rustup"
//! name = "rustup"
//! platforms.linux = { kind = "script", install = "curl https://sh.rustup.rs -sSf | sh -s -- -y" }
//! ```

use crate::errors::CliError;
use devkit_installers::{InstallerEntry, InstallerManifest, InstallerRegistry};
use devkit_process::ProcessRunner;
use devkit_workspaces::WorkspaceCallConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "devkit.toml";

const BUILTIN_INSTALLERS: &str = include_str!("installers.toml");

/// Contents of `devkit.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevkitConfig {
    /// Defaults for workspace commands; flags override them.
    pub workspace: WorkspaceCallConfig,
    pub install: InstallConfig,
    /// Additional installers, replacing built-ins with the same id.
    #[serde(rename = "installer")]
    pub installers: Vec<InstallerEntry>,
}

/// The `[install]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
    /// Installed when `devkit install` gets no ids.
    pub default: Vec<String>,
}

impl DevkitConfig {
    /// Load `explicit`, or `./devkit.toml` if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!(path = %path.display(), "Loading configuration");
                Self::parse(&path, source)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(CliError::ConfigRead { path, source }),
        }
    }

    /// Parse configuration text read from `path`.
    pub fn parse(path: &Path, source: String) -> Result<Self, CliError> {
        match toml::from_str(&source) {
            Ok(config) => Ok(config),
            Err(error) => Err(CliError::config_parse(path, source, &error)),
        }
    }

    /// Built-in installer entries overlaid with the configured ones.
    pub fn installer_entries(&self) -> Result<Vec<InstallerEntry>, CliError> {
        let mut entries = InstallerManifest::parse(BUILTIN_INSTALLERS)?.installers;
        for entry in &self.installers {
            match entries.iter_mut().find(|existing| existing.id == entry.id) {
                Some(existing) => *existing = entry.clone(),
                None => entries.push(entry.clone()),
            }
        }
        Ok(entries)
    }

    /// Registry of every known installer, running commands with `runner`.
    pub fn installer_registry(
        &self,
        runner: &Arc<dyn ProcessRunner>,
    ) -> Result<InstallerRegistry, CliError> {
        let manifest = InstallerManifest {
            installers: self.installer_entries()?,
        };
        let descriptors = manifest.into_descriptors(runner)?;
        Ok(InstallerRegistry::builder().register_all(descriptors)?.build())
    }
}
