//! Dependency ordering of workspace members.

use crate::error::Result;
use crate::options::WorkspaceSortingOptions;
use crate::package::WorkspacePackage;
use devkit_task_graph::{DependencyGraph, TaskOrder, task_order};
use std::sync::Arc;
use tracing::debug;

/// Build the dependency graph of `packages`.
///
/// Each package becomes a node keyed by its name. For every relation enabled
/// in `sorting`, a dependency on another member adds an edge; dependencies
/// outside the workspace are ignored.
///
/// # Errors
///
/// [`Error::UnnamedPackage`](crate::Error::UnnamedPackage) or
/// [`Error::DuplicatePackageName`](crate::Error::DuplicatePackageName) when
/// packages cannot be keyed by name.
pub fn build_dependency_graph(
    packages: &[Arc<WorkspacePackage>],
    sorting: &WorkspaceSortingOptions,
) -> Result<DependencyGraph<Arc<WorkspacePackage>>> {
    let by_name = WorkspacePackage::index_by_name(packages)?;
    let relations = sorting.enabled_relations();

    let mut graph = DependencyGraph::new();
    for pkg in packages {
        if let Some(name) = pkg.name() {
            graph.add_node(name, Arc::clone(pkg))?;
        }
    }

    for pkg in packages {
        let Some(name) = pkg.name() else { continue };
        for kind in &relations {
            for dep in pkg.manifest().dependency_names(*kind) {
                if by_name.contains_key(dep) && dep != name {
                    debug!(package = name, dependency = dep, relation = ?kind, "Workspace dependency");
                    graph.add_dependency(name, dep)?;
                }
            }
        }
    }

    Ok(graph)
}

/// Execution plan for `packages`.
///
/// Without any relation enabled, all packages form a single tier when
/// `parallel` is set and one tier each otherwise, in name order. With
/// relations, tiers come from the dependency graph and are flattened to one
/// package per tier when not parallel.
///
/// # Errors
///
/// Graph construction errors, including dependency cycles.
pub fn plan_task_order(
    packages: &[Arc<WorkspacePackage>],
    sorting: &WorkspaceSortingOptions,
) -> Result<TaskOrder<Arc<WorkspacePackage>>> {
    if !sorting.uses_relations() {
        let ordered = packages.to_vec();
        return Ok(if sorting.parallel {
            if ordered.is_empty() {
                Vec::new()
            } else {
                vec![ordered]
            }
        } else {
            ordered.into_iter().map(|pkg| vec![pkg]).collect()
        });
    }

    let graph = build_dependency_graph(packages, sorting)?;
    let tiers = task_order(&graph)?;
    Ok(if sorting.parallel {
        tiers
    } else {
        tiers.into_iter().flatten().map(|pkg| vec![pkg]).collect()
    })
}

impl WorkspacePackage {
    /// Execution plan over this package's workspace members.
    ///
    /// See [`plan_task_order`].
    pub async fn list_workspace_packages_in_task_order(
        &self,
        sorting: &WorkspaceSortingOptions,
    ) -> Result<TaskOrder<Arc<Self>>> {
        let packages = self.list_workspace_packages().await?;
        plan_task_order(packages, sorting)
    }
}
