//! Platform-aware tool installers for devkit.
//!
//! Installers are registered explicitly as [`InstallerDescriptor`]s, either
//! in code or from a TOML manifest, and queried through an
//! [`InstallerService`] bound to a [`Platform`]. Requests for several ids
//! are resolved into a dependency graph first, so every missing installer
//! and every cycle is reported before a single command runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use devkit_installers::{InstallerRegistry, InstallerService, Platform, parse_manifest};
//! use devkit_process::{ProcessRunner, ShellRunner};
//! use std::sync::Arc;
//!
//! # async fn demo() -> devkit_installers::Result<()> {
//! let runner: Arc<dyn ProcessRunner> = Arc::new(ShellRunner::new());
//! let descriptors = parse_manifest(
//!     r#"
//!     [[installer]]
//!     id = "git"
//!     name = "Git"
//!     platforms.linux = { kind = "apt", package = "git" }
//!     "#,
//!     &runner,
//! )?;
//! let registry = InstallerRegistry::builder().register_all(descriptors)?.build();
//! let service = InstallerService::new(registry).with_platform(Platform::Linux);
//! service.install_or_update(&["git".to_string()]).await?;
//! # Ok(())
//! # }
//! ```

mod commands;
mod descriptor;
mod error;
mod installer;
pub mod manifest;
mod platform;
mod registry;
mod service;

pub use commands::{CommandInstaller, InstallerCommands, InstallerScripts, ScriptInstaller};
pub use descriptor::{InstallerDescriptor, InstallerFactory, InstallerPlatforms};
pub use error::{Error, Result};
pub use installer::{InstallerAction, PlatformInstaller, run_action};
pub use manifest::{InstallerEntry, InstallerManifest, PlatformEntry, load_manifest_file, parse_manifest};
pub use platform::Platform;
pub use registry::{InstallerRegistry, InstallerRegistryBuilder};
pub use service::{InstallerService, RunList};
