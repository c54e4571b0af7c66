//! Tiered traversal of dependency graphs.
//!
//! A tier is a batch of payloads whose dependencies all live in earlier
//! tiers, so the nodes inside one tier may be processed concurrently.

use crate::{DependencyGraph, Error, Result};
use tracing::debug;

/// Payloads that can be processed concurrently.
pub type Tier<T> = Vec<T>;

/// Tiers ordered by dependency level.
///
/// Every node in tier N has all of its dependencies in tiers `0..N`, and the
/// union of all tiers contains every node of the graph exactly once.
pub type TaskOrder<T> = Vec<Tier<T>>;

/// Batch the nodes of `graph` into tiers.
///
/// The graph is cloned and repeatedly stripped of its current leaves; each
/// stripped batch becomes the next tier. The caller's graph is untouched.
/// Order inside a tier follows node insertion order but is not part of the
/// contract.
///
/// # Errors
///
/// Returns [`Error::CycleDetected`] if the graph contains a cycle.
pub fn task_order<T: Clone>(graph: &DependencyGraph<T>) -> Result<TaskOrder<T>> {
    graph.ensure_acyclic()?;

    let mut remaining = graph.clone();
    let mut tiers = Vec::new();

    // Each pass removes at least one node, so the loop is bounded by N.
    while !remaining.is_empty() {
        let leaves: Vec<String> = remaining
            .leaves()
            .into_iter()
            .filter_map(|index| remaining.node_at(index).map(|node| node.id.clone()))
            .collect();

        if leaves.is_empty() {
            let mut nodes: Vec<String> = remaining.node_ids().map(str::to_string).collect();
            nodes.sort();
            return Err(Error::CycleDetected { nodes });
        }

        let tier = leaves
            .iter()
            .map(|id| remaining.remove_node(id))
            .collect::<Result<Tier<T>>>()?;
        debug!(tier = tiers.len(), size = tier.len(), "Computed tier");
        tiers.push(tier);
    }

    Ok(tiers)
}

/// Sequential order derived from [`task_order`] by concatenating its tiers.
///
/// # Errors
///
/// Returns [`Error::CycleDetected`] if the graph contains a cycle.
pub fn task_order_flat<T: Clone>(graph: &DependencyGraph<T>) -> Result<Vec<T>> {
    Ok(task_order(graph)?.into_iter().flatten().collect())
}
