//! Installer definitions loaded from TOML.
//!
//! ```toml
//! [[installer]]
//! id = "git"
//! name = "Git"
//! categories = ["vcs"]
//!
//! [installer.platforms.linux]
//! kind = "apt"
//! package = "git"
//!
//! [installer.platforms.windows]
//! kind = "winget"
//! package = "Git.Git"
//! ```
//!
//! A platform key is one of `linux`, `wsl`, `windows`, or `any` on its own.

use crate::commands::{CommandInstaller, InstallerCommands, InstallerScripts, ScriptInstaller};
use crate::descriptor::{InstallerDescriptor, InstallerFactory, InstallerPlatforms};
use crate::error::{Error, Result};
use crate::installer::PlatformInstaller;
use crate::platform::Platform;
use devkit_process::ProcessRunner;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Key that makes one entry apply to every platform.
pub const ANY_PLATFORM: &str = "any";

/// A parsed installer manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerManifest {
    /// `[[installer]]` tables.
    #[serde(default, rename = "installer")]
    pub installers: Vec<InstallerEntry>,
}

/// One `[[installer]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerEntry {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form categories.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Installer ids that must be installed first.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Entries keyed by platform name or `any`.
    pub platforms: BTreeMap<String, PlatformEntry>,
}

/// How an installer works on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum PlatformEntry {
    /// Arbitrary shell commands.
    #[allow(missing_docs)]
    Command {
        #[serde(default)]
        check: Option<String>,
        install: String,
        #[serde(default)]
        update: Option<String>,
        #[serde(default)]
        uninstall: Option<String>,
        #[serde(default)]
        launch: Option<String>,
    },
    /// A Debian package.
    #[allow(missing_docs)]
    Apt { package: String },
    /// A winget package id.
    #[allow(missing_docs)]
    Winget { package: String },
    /// A globally installed npm package.
    #[allow(missing_docs)]
    NpmGlobal { package: String },
    /// Inline bash scripts.
    #[allow(missing_docs)]
    Script {
        #[serde(default)]
        check: Option<String>,
        install: String,
        #[serde(default)]
        update: Option<String>,
        #[serde(default)]
        uninstall: Option<String>,
    },
}

/// Identity shared by every platform instance of one entry.
#[derive(Debug)]
struct InstallerIdentity {
    id: String,
    name: String,
    dependencies: Vec<String>,
    runner: Arc<dyn ProcessRunner>,
}

impl PlatformEntry {
    fn validate(&self, id: &str) -> Result<()> {
        let (field, value) = match self {
            Self::Command { install, .. } | Self::Script { install, .. } => ("install", install),
            Self::Apt { package } | Self::Winget { package } | Self::NpmGlobal { package } => {
                ("package", package)
            }
        };
        if value.trim().is_empty() {
            return Err(Error::invalid(id, format!("`{field}` must not be empty")));
        }
        Ok(())
    }

    /// Scripts run through `sh`, which native Windows does not have.
    /// `None` stands for every platform.
    fn check_platform(&self, id: &str, platform: Option<Platform>) -> Result<()> {
        if matches!(self, Self::Script { .. }) && platform.is_none_or(|p| p == Platform::Windows) {
            let key = platform.map_or_else(|| ANY_PLATFORM.to_string(), |p| p.to_string());
            return Err(Error::invalid(
                id,
                format!("`script` entries need a POSIX shell and cannot be used for `{key}`"),
            ));
        }
        Ok(())
    }

    fn instantiate(&self, identity: &InstallerIdentity, platform: Platform) -> Box<dyn PlatformInstaller> {
        let runner = Arc::clone(&identity.runner);
        let (id, name) = (identity.id.clone(), identity.name.clone());
        let dependencies = identity.dependencies.clone();
        match self {
            Self::Command {
                check,
                install,
                update,
                uninstall,
                launch,
            } => {
                let commands = InstallerCommands {
                    check: check.clone(),
                    install: install.clone(),
                    update: update.clone(),
                    uninstall: uninstall.clone(),
                    launch: launch.clone(),
                };
                Box::new(CommandInstaller::new(id, name, commands, runner).with_dependencies(dependencies))
            }
            Self::Apt { package } => {
                Box::new(CommandInstaller::apt(id, name, package, runner).with_dependencies(dependencies))
            }
            Self::Winget { package } => Box::new(
                CommandInstaller::winget(id, name, package, platform, runner)
                    .with_dependencies(dependencies),
            ),
            Self::NpmGlobal { package } => Box::new(
                CommandInstaller::npm_global(id, name, package, runner).with_dependencies(dependencies),
            ),
            Self::Script {
                check,
                install,
                update,
                uninstall,
            } => {
                let scripts = InstallerScripts {
                    check: check.clone(),
                    install_or_update: install.clone(),
                    update: update.clone(),
                    uninstall: uninstall.clone(),
                };
                Box::new(ScriptInstaller::new(id, name, scripts, runner).with_dependencies(dependencies))
            }
        }
    }
}

fn factory(identity: &Arc<InstallerIdentity>, entry: PlatformEntry) -> InstallerFactory {
    let identity = Arc::clone(identity);
    Arc::new(move |platform: Platform| -> Box<dyn PlatformInstaller> {
        entry.instantiate(&identity, platform)
    })
}

impl InstallerEntry {
    /// Validate the entry and turn it into a descriptor whose installers
    /// run their commands through `runner`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInstaller`] for empty fields, unknown platform keys,
    /// `any` mixed with named platforms, or self dependencies.
    pub fn into_descriptor(self, runner: Arc<dyn ProcessRunner>) -> Result<InstallerDescriptor> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(Error::invalid(&id, "id must not be empty"));
        }
        if self.platforms.is_empty() {
            return Err(Error::invalid(&id, "no platforms are defined"));
        }
        for dependency in &self.dependencies {
            if dependency.trim().is_empty() {
                return Err(Error::invalid(&id, "dependency ids must not be empty"));
            }
            if dependency.trim() == id {
                return Err(Error::invalid(&id, "an installer cannot depend on itself"));
            }
        }
        for entry in self.platforms.values() {
            entry.validate(&id)?;
        }

        let identity = Arc::new(InstallerIdentity {
            id: id.clone(),
            name: self.name.clone(),
            dependencies: self.dependencies.iter().map(|d| d.trim().to_string()).collect(),
            runner,
        });

        let mut platforms = self.platforms;
        let platforms = if let Some(entry) = platforms.remove(ANY_PLATFORM) {
            if !platforms.is_empty() {
                return Err(Error::invalid(
                    &id,
                    format!("`{ANY_PLATFORM}` cannot be combined with named platforms"),
                ));
            }
            entry.check_platform(&id, None)?;
            InstallerPlatforms::Any(factory(&identity, entry))
        } else {
            let mut factories = BTreeMap::new();
            for (key, entry) in platforms {
                let platform: Platform = key
                    .parse()
                    .map_err(|reason: String| Error::invalid(&id, reason))?;
                entry.check_platform(&id, Some(platform))?;
                factories.insert(platform, factory(&identity, entry));
            }
            InstallerPlatforms::PerPlatform(factories)
        };

        let descriptor = InstallerDescriptor::new(id, self.name, platforms).with_categories(self.categories);
        descriptor.validate()?;
        Ok(descriptor)
    }
}

impl InstallerManifest {
    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// [`Error::Toml`] for malformed input.
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|source| Error::Toml { source, path: None })
    }

    /// Validate every entry into descriptors, in file order.
    ///
    /// # Errors
    ///
    /// The first entry rejected by [`InstallerEntry::into_descriptor`].
    pub fn into_descriptors(self, runner: &Arc<dyn ProcessRunner>) -> Result<Vec<InstallerDescriptor>> {
        self.installers
            .into_iter()
            .map(|entry| entry.into_descriptor(Arc::clone(runner)))
            .collect()
    }
}

/// Parse and validate manifest text.
///
/// # Errors
///
/// [`Error::Toml`] for malformed input, [`Error::InvalidInstaller`] for
/// entries that fail validation.
pub fn parse_manifest(source: &str, runner: &Arc<dyn ProcessRunner>) -> Result<Vec<InstallerDescriptor>> {
    InstallerManifest::parse(source)?.into_descriptors(runner)
}

/// Read, parse and validate a manifest file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, otherwise as [`parse_manifest`].
pub fn load_manifest_file(
    path: impl AsRef<Path>,
    runner: &Arc<dyn ProcessRunner>,
) -> Result<Vec<InstallerDescriptor>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(e, Some(path.to_path_buf()), "reading installer manifest"))?;
    let manifest: InstallerManifest = toml::from_str(&content).map_err(|source| Error::Toml {
        source,
        path: Some(path.to_path_buf()),
    })?;
    tracing::debug!(path = %path.display(), installers = manifest.installers.len(), "Loaded installer manifest");
    manifest.into_descriptors(runner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devkit_process::ShellRunner;

    fn runner() -> Arc<dyn ProcessRunner> {
        Arc::new(ShellRunner::new())
    }

    const GIT: &str = r#"
[[installer]]
id = "git"
name = "Git"
categories = ["vcs"]

[installer.platforms.linux]
kind = "apt"
package = "git"

[installer.platforms.wsl]
kind = "apt"
package = "git"

[installer.platforms.windows]
kind = "winget"
package = "Git.Git"

[[installer]]
id = "pnpm"
name = "pnpm"
dependencies = ["node"]
platforms.any = { kind = "npm-global", package = "pnpm" }
"#;

    #[test]
    fn test_parse_manifest() {
        let descriptors = parse_manifest(GIT, &runner()).unwrap();
        assert_eq!(descriptors.len(), 2);

        let git = &descriptors[0];
        assert_eq!(git.categories, vec!["vcs"]);
        assert_eq!(
            git.platforms.supported(),
            vec![Platform::Linux, Platform::Wsl, Platform::Windows]
        );

        let pnpm = &descriptors[1];
        assert!(matches!(pnpm.platforms, InstallerPlatforms::Any(_)));
        let factory = pnpm.platforms.factory_for(Platform::Linux).unwrap();
        let installer = (factory.as_ref())(Platform::Linux);
        assert_eq!(installer.id(), "pnpm");
        assert_eq!(installer.dependencies(), ["node".to_string()]);
    }

    #[test]
    fn test_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installers.toml");
        std::fs::write(&path, GIT).unwrap();
        assert_eq!(load_manifest_file(&path, &runner()).unwrap().len(), 2);

        let missing = load_manifest_file(dir.path().join("nope.toml"), &runner()).unwrap_err();
        assert!(matches!(missing, Error::Io { path: Some(_), .. }));
    }

    fn invalid(source: &str) -> String {
        match parse_manifest(source, &runner()) {
            Err(Error::InvalidInstaller { reason, .. }) => reason,
            other => panic!("expected InvalidInstaller, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_errors() {
        let mixed = r#"
[[installer]]
id = "x"
name = "X"
platforms.any = { kind = "apt", package = "x" }
platforms.linux = { kind = "apt", package = "x" }
"#;
        assert!(invalid(mixed).contains("cannot be combined"));

        let unknown = r#"
[[installer]]
id = "x"
name = "X"
platforms.macos = { kind = "apt", package = "x" }
"#;
        assert!(invalid(unknown).contains("unknown platform"));

        let empty_package = r#"
[[installer]]
id = "x"
name = "X"
platforms.any = { kind = "winget", package = " " }
"#;
        assert!(invalid(empty_package).contains("package"));

        let self_dependency = r#"
[[installer]]
id = "x"
name = "X"
dependencies = ["x"]
platforms.any = { kind = "command", install = "true" }
"#;
        assert!(invalid(self_dependency).contains("itself"));

        let windows_script = r#"
[[installer]]
id = "x"
name = "X"
platforms.windows = { kind = "script", install = "echo hi" }
"#;
        assert!(invalid(windows_script).contains("`windows`"));

        let any_script = r#"
[[installer]]
id = "x"
name = "X"
platforms.any = { kind = "script", install = "echo hi" }
"#;
        assert!(invalid(any_script).contains("`any`"));

        let no_platforms = r#"
[[installer]]
id = "x"
name = "X"
platforms = {}
"#;
        assert!(invalid(no_platforms).contains("no platforms"));
    }

    #[test]
    fn test_script_and_launch_entries() {
        let source = r#"
[[installer]]
id = "docker"
name = "Docker"
platforms.wsl = { kind = "script", install = "curl -fsSL https://get.docker.com | sh" }
platforms.windows = { kind = "command", install = "winget install -e --id Docker.DockerDesktop", launch = "start docker-desktop" }
"#;
        let descriptors = parse_manifest(source, &runner()).unwrap();
        assert_eq!(
            descriptors[0].platforms.supported(),
            vec![Platform::Wsl, Platform::Windows]
        );

        let manifest = InstallerManifest::parse(source).unwrap();
        let windows = &manifest.installers[0].platforms["windows"];
        assert!(matches!(
            windows,
            PlatformEntry::Command { launch: Some(launch), .. } if launch == "start docker-desktop"
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let unknown_kind = r#"
[[installer]]
id = "x"
name = "X"
platforms.any = { kind = "brew", package = "x" }
"#;
        assert!(matches!(parse_manifest(unknown_kind, &runner()), Err(Error::Toml { .. })));
        assert!(matches!(parse_manifest("installer = 3", &runner()), Err(Error::Toml { .. })));
    }
}
