//! Resolution and execution of installers against a registry.

use crate::descriptor::InstallerDescriptor;
use crate::error::{Error, Result};
use crate::installer::{InstallerAction, PlatformInstaller, run_action};
use crate::platform::Platform;
use crate::registry::InstallerRegistry;
use devkit_task_graph::DependencyGraph;
use tracing::{debug, info};

/// Installers resolved for one request, dependencies first.
pub type RunList = Vec<Box<dyn PlatformInstaller>>;

/// Looks up installers for a platform and runs them in dependency order.
#[derive(Debug, Clone)]
pub struct InstallerService {
    registry: InstallerRegistry,
    platform: Option<Platform>,
}

impl InstallerService {
    /// Service for the detected host platform.
    #[must_use]
    pub const fn new(registry: InstallerRegistry) -> Self {
        Self {
            registry,
            platform: None,
        }
    }

    /// Pin the service to `platform` instead of detecting it.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// The registry being served.
    #[must_use]
    pub const fn registry(&self) -> &InstallerRegistry {
        &self.registry
    }

    /// The target platform.
    ///
    /// # Errors
    ///
    /// [`Error::PlatformDetection`] when the service is not pinned and the
    /// host is not a supported platform.
    pub fn platform(&self) -> Result<Platform> {
        self.platform.or_else(Platform::detect).ok_or(Error::PlatformDetection)
    }

    /// Descriptors available on the target platform.
    pub fn available(&self) -> Result<Vec<&InstallerDescriptor>> {
        let platform = self.platform()?;
        Ok(self.registry.for_platform(platform).collect())
    }

    /// Instantiate `id` for `platform`, or the target platform when `None`.
    pub fn get_installer_by_id(
        &self,
        id: &str,
        platform: Option<Platform>,
    ) -> Result<Option<Box<dyn PlatformInstaller>>> {
        let platform = match platform {
            Some(platform) => platform,
            None => self.platform()?,
        };
        Ok(self
            .registry
            .get(id)
            .and_then(|descriptor| descriptor.platforms.factory_for(platform))
            .map(|factory| factory.as_ref()(platform)))
    }

    /// Whether `id` is available on `platform`, or the target platform when `None`.
    pub fn has_installer(&self, id: &str, platform: Option<Platform>) -> Result<bool> {
        let platform = match platform {
            Some(platform) => platform,
            None => self.platform()?,
        };
        Ok(self.registry.get(id).is_some_and(|d| d.supports(platform)))
    }

    /// Instantiate `id` for `platform`.
    ///
    /// # Errors
    ///
    /// [`Error::InstallerNotFound`] if `id` is unknown or does not support
    /// `platform`.
    pub fn get_platform_installer(
        &self,
        id: &str,
        platform: Platform,
    ) -> Result<Box<dyn PlatformInstaller>> {
        self.get_installer_by_id(id, Some(platform))?
            .ok_or_else(|| Error::InstallerNotFound {
                id: id.to_string(),
                platform,
            })
    }

    fn target(&self, id: &str) -> Result<Box<dyn PlatformInstaller>> {
        self.get_platform_installer(id, self.platform()?)
    }

    /// Whether the tool behind `id` is installed.
    pub async fn is_installed(&self, id: &str) -> Result<bool> {
        self.target(id)?.is_installed().await
    }

    /// Install or update `id` alone, without its dependencies.
    ///
    /// Returns `false` when a hook skipped the step.
    pub async fn install_or_update_by_id(&self, id: &str) -> Result<bool> {
        run_action(self.target(id)?.as_ref(), InstallerAction::InstallOrUpdate).await
    }

    /// Update `id` alone.
    pub async fn update_by_id(&self, id: &str) -> Result<bool> {
        run_action(self.target(id)?.as_ref(), InstallerAction::Update).await
    }

    /// Uninstall `id` alone.
    pub async fn uninstall_by_id(&self, id: &str) -> Result<bool> {
        run_action(self.target(id)?.as_ref(), InstallerAction::Uninstall).await
    }

    /// Resolve `ids` and all their dependencies into a dependency-first list.
    ///
    /// # Errors
    ///
    /// [`Error::InstallerNotFound`] for any id, requested or transitive,
    /// that is unavailable on the target platform, and [`Error::Graph`] for
    /// dependency cycles. Nothing is executed.
    pub fn build_run_list<S: AsRef<str>>(&self, ids: &[S]) -> Result<RunList> {
        let platform = self.platform()?;
        let mut graph = DependencyGraph::new();
        for id in ids {
            self.add_with_dependencies(&mut graph, id.as_ref(), platform)?;
        }

        let order = graph.overall_order(false)?;
        debug!(%platform, order = ?order, "Resolved installer run list");
        order
            .iter()
            .map(|id| graph.remove_node(id).map_err(Error::from))
            .collect()
    }

    fn add_with_dependencies(
        &self,
        graph: &mut DependencyGraph<Box<dyn PlatformInstaller>>,
        id: &str,
        platform: Platform,
    ) -> Result<()> {
        if graph.contains_node(id) {
            return Ok(());
        }

        let installer = self.get_platform_installer(id, platform)?;
        let dependencies = installer.dependencies().to_vec();
        graph.add_node(id, installer)?;

        for dependency in &dependencies {
            self.add_with_dependencies(graph, dependency, platform)?;
            graph.add_dependency(id, dependency)?;
        }
        Ok(())
    }

    async fn run(&self, ids: &[String], action: InstallerAction) -> Result<Vec<String>> {
        let mut run_list = self.build_run_list(ids)?;
        if action == InstallerAction::Uninstall {
            run_list.reverse();
        }

        let ids: Vec<&str> = run_list.iter().map(|installer| installer.id()).collect();
        info!(%action, installers = ?ids, "Running installers");

        let mut ran = Vec::with_capacity(run_list.len());
        for installer in &run_list {
            if run_action(installer.as_ref(), action).await? {
                ran.push(installer.id().to_string());
            }
        }
        Ok(ran)
    }

    /// Install or update `ids` after their dependencies.
    ///
    /// Returns the ids of the installers that ran, in order. The first
    /// failure aborts the run.
    pub async fn install_or_update(&self, ids: &[String]) -> Result<Vec<String>> {
        self.run(ids, InstallerAction::InstallOrUpdate).await
    }

    /// Update `ids` after their dependencies.
    pub async fn update(&self, ids: &[String]) -> Result<Vec<String>> {
        self.run(ids, InstallerAction::Update).await
    }

    /// Uninstall `ids` and their dependencies, dependents first.
    pub async fn uninstall(&self, ids: &[String]) -> Result<Vec<String>> {
        self.run(ids, InstallerAction::Uninstall).await
    }
}
