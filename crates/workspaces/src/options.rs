//! Options for workspace calls and script runs.
//!
//! Callers pass partial `*Config` records; each has a single `resolve`
//! function that fills in the defaults.

use crate::manifest::DependencyKind;
use serde::{Deserialize, Serialize};

/// Which relations order the workspace, and whether tiers run concurrently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct WorkspaceSortingOptions {
    /// Run the packages of a tier concurrently.
    pub parallel: bool,
    /// Order by `dependencies`.
    pub dependencies: bool,
    /// Order by `devDependencies`.
    pub dev_dependencies: bool,
    /// Order by `peerDependencies`.
    pub peer_dependencies: bool,
    /// Order by `optionalDependencies`.
    pub optional_dependencies: bool,
}

impl WorkspaceSortingOptions {
    /// The relations that are switched on.
    #[must_use]
    pub fn enabled_relations(&self) -> Vec<DependencyKind> {
        [
            (self.dependencies, DependencyKind::Production),
            (self.dev_dependencies, DependencyKind::Development),
            (self.peer_dependencies, DependencyKind::Peer),
            (self.optional_dependencies, DependencyKind::Optional),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }

    /// Whether any relation drives the order.
    #[must_use]
    pub fn uses_relations(&self) -> bool {
        self.dependencies || self.dev_dependencies || self.peer_dependencies || self.optional_dependencies
    }
}

/// Fully resolved options for [`workspace_call`](crate::WorkspacePackage::workspace_call).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkspaceCallOptions {
    /// Ordering and concurrency.
    pub sorting: WorkspaceSortingOptions,
    /// Stop scheduling tiers after the first failure and return it.
    pub throw_on_error: bool,
}

/// Partial options for a workspace call; every field defaults to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceCallConfig {
    /// See [`WorkspaceSortingOptions::parallel`].
    pub parallel: Option<bool>,
    /// See [`WorkspaceSortingOptions::dependencies`].
    pub dependencies: Option<bool>,
    /// See [`WorkspaceSortingOptions::dev_dependencies`].
    pub dev_dependencies: Option<bool>,
    /// See [`WorkspaceSortingOptions::peer_dependencies`].
    pub peer_dependencies: Option<bool>,
    /// See [`WorkspaceSortingOptions::optional_dependencies`].
    pub optional_dependencies: Option<bool>,
    /// See [`WorkspaceCallOptions::throw_on_error`].
    pub throw_on_error: Option<bool>,
}

impl WorkspaceCallConfig {
    /// Fill every unset field with its default.
    #[must_use]
    pub fn resolve(&self) -> WorkspaceCallOptions {
        WorkspaceCallOptions {
            sorting: WorkspaceSortingOptions {
                parallel: self.parallel.unwrap_or(false),
                dependencies: self.dependencies.unwrap_or(false),
                dev_dependencies: self.dev_dependencies.unwrap_or(false),
                peer_dependencies: self.peer_dependencies.unwrap_or(false),
                optional_dependencies: self.optional_dependencies.unwrap_or(false),
            },
            throw_on_error: self.throw_on_error.unwrap_or(false),
        }
    }

    /// Layer `self` over `base`: fields set here win.
    #[must_use]
    pub fn merge(self, base: Self) -> Self {
        Self {
            parallel: self.parallel.or(base.parallel),
            dependencies: self.dependencies.or(base.dependencies),
            dev_dependencies: self.dev_dependencies.or(base.dev_dependencies),
            peer_dependencies: self.peer_dependencies.or(base.peer_dependencies),
            optional_dependencies: self.optional_dependencies.or(base.optional_dependencies),
            throw_on_error: self.throw_on_error.or(base.throw_on_error),
        }
    }
}

/// Fully resolved options for a single script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunScriptOptions {
    /// Fail with `ScriptFailed` on a non-zero exit.
    pub throw_on_error: bool,
    /// Fail with `ScriptMissing` when the script is not defined.
    pub throw_on_missing: bool,
}

impl Default for RunScriptOptions {
    fn default() -> Self {
        RunScriptConfig::default().resolve()
    }
}

/// Partial options for a script run; both fields default to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunScriptConfig {
    /// See [`RunScriptOptions::throw_on_error`].
    pub throw_on_error: Option<bool>,
    /// See [`RunScriptOptions::throw_on_missing`].
    pub throw_on_missing: Option<bool>,
}

impl RunScriptConfig {
    /// Fill every unset field with its default.
    #[must_use]
    pub fn resolve(&self) -> RunScriptOptions {
        RunScriptOptions {
            throw_on_error: self.throw_on_error.unwrap_or(true),
            throw_on_missing: self.throw_on_missing.unwrap_or(true),
        }
    }
}

/// Partial options for [`workspace_run_script`](crate::WorkspacePackage::workspace_run_script).
///
/// `call.throw_on_error` feeds both layers: when unset, each script throws
/// on failure while the batch collects the failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkspaceRunScriptConfig {
    /// Batch options.
    pub call: WorkspaceCallConfig,
    /// See [`RunScriptOptions::throw_on_missing`].
    pub throw_on_missing: Option<bool>,
}

impl WorkspaceRunScriptConfig {
    /// Resolve into batch options and per-script options.
    #[must_use]
    pub fn resolve(&self) -> (WorkspaceCallOptions, RunScriptOptions) {
        let script = RunScriptConfig {
            throw_on_error: self.call.throw_on_error,
            throw_on_missing: self.throw_on_missing,
        };
        (self.call.resolve(), script.resolve())
    }
}
