//! Installer descriptors.

use crate::error::{Error, Result};
use crate::installer::PlatformInstaller;
use crate::platform::Platform;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Produces a fresh installer instance for the given target platform.
pub type InstallerFactory = Arc<dyn Fn(Platform) -> Box<dyn PlatformInstaller> + Send + Sync>;

/// Where an installer is available.
#[derive(Clone)]
pub enum InstallerPlatforms {
    /// One factory for every platform.
    Any(InstallerFactory),
    /// A factory per supported platform.
    PerPlatform(BTreeMap<Platform, InstallerFactory>),
}

impl InstallerPlatforms {
    /// Factory for `platform`, if supported.
    #[must_use]
    pub fn factory_for(&self, platform: Platform) -> Option<&InstallerFactory> {
        match self {
            Self::Any(factory) => Some(factory),
            Self::PerPlatform(map) => map.get(&platform),
        }
    }

    /// Platforms with a factory.
    #[must_use]
    pub fn supported(&self) -> Vec<Platform> {
        match self {
            Self::Any(_) => Platform::ALL.to_vec(),
            Self::PerPlatform(map) => map.keys().copied().collect(),
        }
    }
}

impl fmt::Debug for InstallerPlatforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any(_) => f.write_str("Any"),
            Self::PerPlatform(map) => f
                .debug_tuple("PerPlatform")
                .field(&map.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// A registered installer: identity plus per-platform factories.
#[derive(Debug, Clone)]
pub struct InstallerDescriptor {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form categories such as `runtime` or `editor`.
    pub categories: Vec<String>,
    /// Platform factories.
    pub platforms: InstallerPlatforms,
}

impl InstallerDescriptor {
    /// Create a descriptor without categories.
    pub fn new(id: impl Into<String>, name: impl Into<String>, platforms: InstallerPlatforms) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            categories: Vec::new(),
            platforms,
        }
    }

    /// Replace the categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the installer has a factory for `platform`.
    #[must_use]
    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms.factory_for(platform).is_some()
    }

    /// Check the descriptor is usable.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInstaller`] for an empty id or name, or an empty
    /// platform map.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid(&self.id, "id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::invalid(&self.id, "name must not be empty"));
        }
        if let InstallerPlatforms::PerPlatform(map) = &self.platforms
            && map.is_empty()
        {
            return Err(Error::invalid(&self.id, "no platforms are defined"));
        }
        Ok(())
    }
}
