//! Dependency graph built on petgraph.
//!
//! Nodes are keyed by string ids and carry an arbitrary payload. An edge
//! `A depends-on B` is stored as the petgraph edge `B -> A`, so the
//! dependencies of a node are its incoming neighbours and its dependents are
//! the outgoing ones.

use crate::{Error, Result};
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;
use tracing::debug;

/// A node in the dependency graph.
#[derive(Debug, Clone)]
pub struct GraphNode<T> {
    /// Id of the node, unique within the graph.
    pub id: String,
    /// The node payload.
    pub data: T,
    /// Position in insertion order. Never reused after a removal.
    sequence: u64,
}

/// Directed acyclic graph of `depends-on` relations between nodes.
///
/// Acyclicity is not enforced when edges are added; it is checked whenever
/// an order is computed. Cloning copies the topology, so an algorithm can
/// remove nodes from a clone without touching the caller's graph. Payloads
/// are cloned along with it, which is why callers usually store `Arc`s.
#[derive(Debug, Clone)]
pub struct DependencyGraph<T> {
    /// The directed graph. Indices stay valid across removals.
    graph: StableDiGraph<GraphNode<T>, ()>,
    /// Map from node ids to node indices.
    id_to_node: HashMap<String, NodeIndex>,
    /// Sequence number for the next added node.
    next_sequence: u64,
}

impl<T> DependencyGraph<T> {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            id_to_node: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Add a node to the graph.
    ///
    /// The node's dependencies do not need to exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateNode`] if a node with the same id exists.
    pub fn add_node(&mut self, id: impl Into<String>, data: T) -> Result<()> {
        let id = id.into();
        if self.id_to_node.contains_key(&id) {
            return Err(Error::DuplicateNode { id });
        }

        let index = self.graph.add_node(GraphNode {
            id: id.clone(),
            data,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        debug!("Added graph node '{}'", id);
        self.id_to_node.insert(id, index);
        Ok(())
    }

    /// Record that `from` depends on `to`.
    ///
    /// Adding the same dependency twice keeps a single edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] naming whichever id is not in the graph.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<()> {
        let dependent = self.index_of(from)?;
        let dependency = self.index_of(to)?;
        self.graph.update_edge(dependency, dependent, ());
        debug!("Added dependency '{}' -> '{}'", from, to);
        Ok(())
    }

    /// Remove a node and every edge touching it, returning its payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the id is not in the graph.
    pub fn remove_node(&mut self, id: &str) -> Result<T> {
        let index = self.id_to_node.remove(id).ok_or_else(|| Error::unknown(id))?;
        self.graph
            .remove_node(index)
            .map(|node| node.data)
            .ok_or_else(|| Error::unknown(id))
    }

    /// Check if a node exists in the graph.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.id_to_node.contains_key(id)
    }

    /// Get the payload of a node.
    #[must_use]
    pub fn node_data(&self, id: &str) -> Option<&T> {
        self.id_to_node
            .get(id)
            .and_then(|&index| self.graph.node_weight(index))
            .map(|node| &node.data)
    }

    /// Get the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Check if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterate over node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.indices_in_insertion_order()
            .into_iter()
            .map(|index| self.graph[index].id.as_str())
    }

    /// Ids of the nodes `id` directly depends on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the id is not in the graph.
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<&str>> {
        self.neighbours(id, Direction::Incoming)
    }

    /// Ids of the nodes that directly depend on `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if the id is not in the graph.
    pub fn dependents_of(&self, id: &str) -> Result<Vec<&str>> {
        self.neighbours(id, Direction::Outgoing)
    }

    /// Check if the graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Compute the order in which nodes can be processed.
    ///
    /// With `leaves_only = false` every node is returned and each dependency
    /// precedes its dependents. With `leaves_only = true` only the nodes with
    /// no remaining dependencies are returned: the tier that is ready now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if the graph contains a cycle, in
    /// either mode.
    pub fn overall_order(&self, leaves_only: bool) -> Result<Vec<String>> {
        self.ensure_acyclic()?;

        if leaves_only {
            return Ok(self
                .leaves()
                .into_iter()
                .map(|index| self.graph[index].id.clone())
                .collect());
        }

        let sorted = toposort(&self.graph, None).map_err(|_| self.cycle_error())?;
        Ok(sorted
            .into_iter()
            .map(|index| self.graph[index].id.clone())
            .collect())
    }

    /// Like [`overall_order`](Self::overall_order) with `leaves_only = false`,
    /// but returning the payloads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if the graph contains a cycle.
    pub fn overall_order_data(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let sorted = toposort(&self.graph, None).map_err(|_| self.cycle_error())?;
        Ok(sorted
            .into_iter()
            .map(|index| self.graph[index].data.clone())
            .collect())
    }

    /// Fail with [`Error::CycleDetected`] if the graph is not acyclic.
    pub(crate) fn ensure_acyclic(&self) -> Result<()> {
        if self.has_cycles() {
            return Err(self.cycle_error());
        }
        Ok(())
    }

    /// Nodes without incoming edges, in insertion order.
    pub(crate) fn leaves(&self) -> Vec<NodeIndex> {
        self.indices_in_insertion_order()
            .into_iter()
            .filter(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    pub(crate) fn node_at(&self, index: NodeIndex) -> Option<&GraphNode<T>> {
        self.graph.node_weight(index)
    }

    /// Build a cycle error listing every node that sits on a cycle.
    pub(crate) fn cycle_error(&self) -> Error {
        let mut nodes: Vec<String> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .flatten()
            .map(|index| self.graph[index].id.clone())
            .collect();
        nodes.sort();
        Error::CycleDetected { nodes }
    }

    // StableDiGraph hands vacated indices to new nodes, so index order
    // drifts from insertion order once anything has been removed.
    fn indices_in_insertion_order(&self) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by_key(|&index| self.graph[index].sequence);
        indices
    }

    fn index_of(&self, id: &str) -> Result<NodeIndex> {
        self.id_to_node
            .get(id)
            .copied()
            .ok_or_else(|| Error::unknown(id))
    }

    fn neighbours(&self, id: &str, direction: Direction) -> Result<Vec<&str>> {
        let index = self.index_of(id)?;
        let mut ids: Vec<&str> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|neighbour| self.graph[neighbour].id.as_str())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

impl<T> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(edges: &[(&str, &[&str])]) -> DependencyGraph<String> {
        let mut graph = DependencyGraph::new();
        for (id, _) in edges {
            graph.add_node(*id, (*id).to_string()).unwrap();
        }
        for (id, deps) in edges {
            for dep in *deps {
                graph.add_dependency(id, dep).unwrap();
            }
        }
        graph
    }

    fn positions(order: &[String]) -> HashMap<&str, usize> {
        order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect()
    }

    #[test]
    fn test_new_graph_is_empty() {
        let graph: DependencyGraph<()> = DependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.node_count(), 0);
        assert!(graph.overall_order(false).unwrap().is_empty());
        assert!(graph.overall_order(true).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let mut graph = DependencyGraph::new();
        graph.add_node("a", 1).unwrap();

        let err = graph.add_node("a", 2).unwrap_err();
        assert_eq!(err, Error::DuplicateNode { id: "a".into() });
        assert_eq!(graph.node_data("a"), Some(&1));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_dependency_on_unknown_node() {
        let mut graph = DependencyGraph::new();
        graph.add_node("a", ()).unwrap();

        assert_eq!(
            graph.add_dependency("a", "missing").unwrap_err(),
            Error::UnknownNode {
                id: "missing".into()
            }
        );
        assert_eq!(
            graph.add_dependency("missing", "a").unwrap_err(),
            Error::UnknownNode {
                id: "missing".into()
            }
        );
    }

    #[test]
    fn test_dependencies_come_first() {
        let graph = graph_from(&[
            ("app", &["lib", "utils"]),
            ("lib", &["utils"]),
            ("utils", &[]),
        ]);

        let order = graph.overall_order(false).unwrap();
        let pos = positions(&order);
        assert_eq!(order.len(), 3);
        assert!(pos["utils"] < pos["lib"]);
        assert!(pos["lib"] < pos["app"]);
    }

    #[test]
    fn test_leaves_only_returns_ready_nodes() {
        let graph = graph_from(&[("a", &[]), ("b", &["a"]), ("c", &[])]);
        assert_eq!(graph.overall_order(true).unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = graph_from(&[("a", &[]), ("b", &["a"])]);
        graph.add_dependency("b", "a").unwrap();
        assert_eq!(graph.dependencies_of("b").unwrap(), vec!["a"]);
        assert_eq!(graph.dependents_of("a").unwrap(), vec!["b"]);
    }

    #[test]
    fn test_remove_node_drops_edges() {
        let mut graph = graph_from(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);

        assert_eq!(graph.remove_node("a").unwrap(), "a");
        assert!(!graph.contains_node("a"));
        assert!(graph.dependencies_of("b").unwrap().is_empty());
        assert_eq!(graph.overall_order(true).unwrap(), vec!["b"]);
    }

    #[test]
    fn test_remove_unknown_node() {
        let mut graph: DependencyGraph<()> = DependencyGraph::new();
        assert_eq!(
            graph.remove_node("ghost").unwrap_err(),
            Error::UnknownNode { id: "ghost".into() }
        );
    }

    #[test]
    fn test_clone_does_not_share_topology() {
        let original = graph_from(&[("a", &[]), ("b", &["a"])]);
        let mut copy = original.clone();
        copy.remove_node("a").unwrap();

        assert_eq!(original.node_count(), 2);
        assert_eq!(original.dependencies_of("b").unwrap(), vec!["a"]);
        assert_eq!(copy.node_count(), 1);
    }

    #[test]
    fn test_cycle_names_participants() {
        let graph = graph_from(&[
            ("a", &["c"]),
            ("b", &["a"]),
            ("c", &["b"]),
            ("standalone", &[]),
            ("d", &["a"]),
        ]);

        assert!(graph.has_cycles());
        let expected = Error::CycleDetected {
            nodes: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(graph.overall_order(false).unwrap_err(), expected);
        assert_eq!(graph.overall_order(true).unwrap_err(), expected);
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let graph = graph_from(&[("self_ref", &["self_ref"]), ("other", &[])]);
        assert_eq!(
            graph.overall_order(false).unwrap_err(),
            Error::CycleDetected {
                nodes: vec!["self_ref".into()]
            }
        );
    }

    #[test]
    fn test_overall_order_data() {
        let graph = graph_from(&[("b", &["a"]), ("a", &[])]);
        assert_eq!(graph.overall_order_data().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_node_ids_in_insertion_order() {
        let graph = graph_from(&[("z", &[]), ("a", &[]), ("m", &[])]);
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut graph = graph_from(&[("z", &[]), ("a", &[]), ("m", &[])]);
        graph.remove_node("z").unwrap();
        // Takes over the index vacated by "z".
        graph.add_node("late", "late".to_string()).unwrap();

        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec!["a", "m", "late"]);
        assert_eq!(graph.overall_order(true).unwrap(), vec!["a", "m", "late"]);
    }
}
