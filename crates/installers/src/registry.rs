//! Explicit registry of installer descriptors.

use crate::descriptor::InstallerDescriptor;
use crate::error::{Error, Result};
use crate::platform::Platform;
use std::collections::HashMap;

/// Immutable set of installers, in registration order.
#[derive(Debug, Clone, Default)]
pub struct InstallerRegistry {
    descriptors: Vec<InstallerDescriptor>,
    by_id: HashMap<String, usize>,
}

impl InstallerRegistry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> InstallerRegistryBuilder {
        InstallerRegistryBuilder::default()
    }

    /// Descriptor registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&InstallerDescriptor> {
        self.by_id.get(id).map(|&index| &self.descriptors[index])
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &InstallerDescriptor> {
        self.descriptors.iter()
    }

    /// Descriptors usable on `platform`.
    pub fn for_platform(&self, platform: Platform) -> impl Iterator<Item = &InstallerDescriptor> {
        self.descriptors.iter().filter(move |d| d.supports(platform))
    }

    /// Number of registered installers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Builder for [`InstallerRegistry`].
#[derive(Debug, Default)]
pub struct InstallerRegistryBuilder {
    registry: InstallerRegistry,
}

impl InstallerRegistryBuilder {
    /// Validate and add a descriptor.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInstaller`] if validation fails,
    /// [`Error::DuplicateInstaller`] if the id is taken.
    pub fn register(mut self, descriptor: InstallerDescriptor) -> Result<Self> {
        descriptor.validate()?;
        if self.registry.contains(&descriptor.id) {
            return Err(Error::DuplicateInstaller { id: descriptor.id });
        }

        tracing::debug!(installer = %descriptor.id, platforms = ?descriptor.platforms, "Registered installer");
        self.registry
            .by_id
            .insert(descriptor.id.clone(), self.registry.descriptors.len());
        self.registry.descriptors.push(descriptor);
        Ok(self)
    }

    /// Add several descriptors.
    ///
    /// # Errors
    ///
    /// Stops at the first descriptor [`register`](Self::register) rejects.
    pub fn register_all(
        self,
        descriptors: impl IntoIterator<Item = InstallerDescriptor>,
    ) -> Result<Self> {
        descriptors
            .into_iter()
            .try_fold(self, Self::register)
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> InstallerRegistry {
        self.registry
    }
}
