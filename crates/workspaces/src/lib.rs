//! Workspace discovery, dependency ordering and execution for `package.json`
//! monorepos.
//!
//! A [`WorkspacePackage`] is a handle to one manifest. When the manifest
//! declares `workspaces`, the handle discovers its members, orders them by
//! the dependency relations you choose and runs operations across them:
//!
//! - [`WorkspacePackage::list_workspace_packages_in_task_order`] computes
//!   the plan: tiers of packages whose dependencies live in earlier tiers.
//! - [`WorkspacePackage::workspace_call`] runs an arbitrary async operation
//!   per package and aggregates the outcomes in a [`WorkspaceCallReport`].
//! - [`WorkspacePackage::workspace_run_script`],
//!   [`WorkspacePackage::workspace_execute`] and
//!   [`WorkspacePackage::workspace_install`] are the common operations.
//!
//! # Package managers
//!
//! Each package is driven by a [`PackageFlavor`]. pnpm is picked when the
//! `packageManager` field names it or a pnpm lockfile or workspace file sits
//! beside the manifest, then Yarn (hint or `yarn.lock`), then npm (hint or
//! `package-lock.json`). A workspace member without any of these takes the
//! root's flavor; a standalone package falls back to npm.
//!
//! # Discovery behavior
//!
//! Member patterns are globs relative to the root; `!pattern` excludes.
//! `node_modules`, `.git`, `target` and `dist` are never searched. A member
//! whose manifest is malformed fails discovery instead of being skipped.
//!
//! # Example
//!
//! ```rust,no_run
//! use devkit_process::ShellRunner;
//! use devkit_workspaces::{WorkspacePackage, WorkspaceRunScriptConfig, WorkspaceCallConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> devkit_workspaces::Result<()> {
//! let root = WorkspacePackage::load(".", Arc::new(ShellRunner::new()))?;
//! let config = WorkspaceRunScriptConfig {
//!     call: WorkspaceCallConfig {
//!         dependencies: Some(true),
//!         ..WorkspaceCallConfig::default()
//!     },
//!     throw_on_missing: Some(false),
//! };
//! let report = root.workspace_run_script("build", &config).await?;
//! assert!(!report.has_errors);
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod error;
mod executor;
mod flavor;
pub mod manifest;
mod options;
mod package;
mod resolver;

pub use error::{Error, Result};
pub use executor::{
    WorkspaceCallFailure, WorkspaceCallOutcome, WorkspaceCallReport, WorkspaceCallSuccess,
};
pub use flavor::PackageFlavor;
pub use manifest::{DependencyKind, PackageManifest, WorkspacesField};
pub use options::{
    RunScriptConfig, RunScriptOptions, WorkspaceCallConfig, WorkspaceCallOptions,
    WorkspaceRunScriptConfig, WorkspaceSortingOptions,
};
pub use package::WorkspacePackage;
pub use resolver::{build_dependency_graph, plan_task_order};
