//! Handle to a package on disk.

use crate::discovery::discover_member_dirs;
use crate::error::{Error, Result};
use crate::flavor::PackageFlavor;
use crate::manifest::{MANIFEST_FILE, PackageManifest};
use crate::options::RunScriptOptions;
use devkit_process::ProcessRunner;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// One `package.json` and the directory it lives in.
///
/// A root handle discovers its workspace members on first use and keeps
/// them for its lifetime. Load a new handle to pick up changes on disk.
#[derive(Debug)]
pub struct WorkspacePackage {
    manifest: PackageManifest,
    manifest_path: PathBuf,
    dir: PathBuf,
    flavor: PackageFlavor,
    runner: Arc<dyn ProcessRunner>,
    members: OnceCell<Vec<Arc<WorkspacePackage>>>,
}

impl WorkspacePackage {
    /// Load a package from a manifest file or a directory containing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] if `path` is neither, and a JSON
    /// or I/O error if the manifest cannot be read.
    pub fn load(path: impl AsRef<Path>, runner: Arc<dyn ProcessRunner>) -> Result<Self> {
        Self::load_with_fallback(path.as_ref(), runner, PackageFlavor::default())
    }

    /// `fallback` is the flavor used when the package carries no marker of
    /// its own; members get the root's.
    fn load_with_fallback(
        path: &Path,
        runner: Arc<dyn ProcessRunner>,
        fallback: PackageFlavor,
    ) -> Result<Self> {
        let manifest_path = if path.is_dir() {
            path.join(MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };
        if !manifest_path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        let dir = manifest_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let manifest = PackageManifest::from_file(&manifest_path)?;
        let flavor = PackageFlavor::detect_marked(&manifest, &dir).unwrap_or(fallback);
        tracing::debug!(
            manifest = %manifest_path.display(),
            name = ?manifest.name,
            %flavor,
            "Loaded package"
        );

        Ok(Self {
            manifest,
            manifest_path,
            dir,
            flavor,
            runner,
            members: OnceCell::new(),
        })
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.manifest.name.as_deref()
    }

    /// Package version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.manifest.version.as_deref()
    }

    /// Directory containing the manifest.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// File name of the manifest.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.manifest_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(MANIFEST_FILE)
    }

    /// The parsed manifest.
    #[must_use]
    pub const fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// The package manager driving this package.
    #[must_use]
    pub const fn flavor(&self) -> PackageFlavor {
        self.flavor
    }

    /// Name for messages: the package name, or its directory when unnamed.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name()
            .map_or_else(|| self.dir.display().to_string(), str::to_string)
    }

    /// Whether the manifest declares a `workspaces` field.
    #[must_use]
    pub fn is_workspace(&self) -> bool {
        self.manifest.workspaces.is_some()
    }

    /// Whether the script named by the first word of `script` is defined
    /// and non-blank.
    #[must_use]
    pub fn has_script(&self, script: &str) -> bool {
        script_name(script)
            .and_then(|name| self.manifest.scripts.get(name))
            .is_some_and(|body| !body.trim().is_empty())
    }

    /// Run a command line in the package directory with inherited stdio.
    pub async fn exec_cmd(&self, cmd: &str) -> Result<i32> {
        info!(package = %self.display_name(), "Executing: {}", cmd);
        Ok(self.runner.exec(cmd, Some(&self.dir)).await?)
    }

    /// Run a package-manager subcommand in the package directory.
    pub async fn exec_package_manager(&self, subcommand: &str) -> Result<i32> {
        self.exec_cmd(&self.flavor.command(subcommand)).await
    }

    /// Install the package's dependencies.
    pub async fn install(&self) -> Result<i32> {
        self.exec_package_manager("install").await
    }

    /// Run a package script.
    ///
    /// `script` may carry arguments; its first word names the script.
    /// Returns `Ok(None)` when the script is missing and
    /// `throw_on_missing` is off, otherwise the exit code.
    ///
    /// # Errors
    ///
    /// [`Error::ScriptMissing`] and [`Error::ScriptFailed`] according to
    /// `options`, or a process error if the command could not be started.
    pub async fn run_script(&self, script: &str, options: &RunScriptOptions) -> Result<Option<i32>> {
        let name = script_name(script).unwrap_or_default();
        if !self.has_script(script) {
            if options.throw_on_missing {
                return Err(Error::ScriptMissing {
                    package: self.display_name(),
                    script: name.to_string(),
                });
            }
            warn!(package = %self.display_name(), script = name, "Script not defined, skipping");
            return Ok(None);
        }

        let code = self
            .exec_package_manager(&format!("run {}", script.trim()))
            .await?;
        if code != 0 && options.throw_on_error {
            return Err(Error::ScriptFailed {
                package: self.display_name(),
                script: name.to_string(),
                code,
            });
        }
        Ok(Some(code))
    }

    /// Workspace members, sorted by name with unnamed packages first.
    ///
    /// Discovered on first call and cached for the lifetime of the handle.
    ///
    /// # Errors
    ///
    /// Fails if a member pattern is invalid or a member manifest cannot be
    /// loaded.
    pub async fn list_workspace_packages(&self) -> Result<&[Arc<Self>]> {
        let members = self
            .members
            .get_or_try_init(|| async { self.discover_members() })
            .await?;
        Ok(members.as_slice())
    }

    /// Names of the named workspace members, in member order.
    pub async fn list_workspace_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_workspace_packages()
            .await?
            .iter()
            .filter_map(|pkg| pkg.name().map(str::to_string))
            .collect())
    }

    /// Directories of the workspace members, in member order.
    pub async fn list_workspace_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .list_workspace_packages()
            .await?
            .iter()
            .map(|pkg| pkg.path().to_path_buf())
            .collect())
    }

    fn discover_members(&self) -> Result<Vec<Arc<Self>>> {
        let patterns = self.manifest.workspace_patterns();
        let mut members = discover_member_dirs(&self.dir, patterns)?
            .into_iter()
            .map(|dir| Self::load_with_fallback(&dir, Arc::clone(&self.runner), self.flavor).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        members.sort_by(|a, b| {
            a.name()
                .cmp(&b.name())
                .then_with(|| a.path().cmp(b.path()))
        });
        info!(
            root = %self.dir.display(),
            count = members.len(),
            "Discovered workspace packages"
        );
        Ok(members)
    }

    /// Map from member name to member, rejecting unnamed and duplicate names.
    pub(crate) fn index_by_name(packages: &[Arc<Self>]) -> Result<HashMap<&str, &Arc<Self>>> {
        let mut by_name: HashMap<&str, &Arc<Self>> = HashMap::with_capacity(packages.len());
        for pkg in packages {
            let Some(name) = pkg.name() else {
                return Err(Error::UnnamedPackage {
                    path: pkg.path().to_path_buf(),
                });
            };
            if let Some(first) = by_name.insert(name, pkg) {
                return Err(Error::DuplicatePackageName {
                    name: name.to_string(),
                    first: first.path().to_path_buf(),
                    second: pkg.path().to_path_buf(),
                });
            }
        }
        Ok(by_name)
    }
}

fn script_name(script: &str) -> Option<&str> {
    script.split_whitespace().next()
}
