//! Error types for dependency graph operations.

use thiserror::Error;

/// Result type for dependency graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or ordering a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A node with the same id is already part of the graph.
    #[error("Node '{id}' already exists in the dependency graph")]
    DuplicateNode {
        /// The id that was added twice.
        id: String,
    },

    /// An operation referenced a node that is not part of the graph.
    #[error("Node '{id}' does not exist in the dependency graph")]
    UnknownNode {
        /// The id that could not be found.
        id: String,
    },

    /// The graph is not acyclic.
    #[error("Dependency cycle detected between: {}", nodes.join(", "))]
    CycleDetected {
        /// Every node that participates in a cycle, sorted by id.
        nodes: Vec<String>,
    },
}

impl Error {
    pub(crate) fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }
}
