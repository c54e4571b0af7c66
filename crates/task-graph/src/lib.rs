//! Dependency graph algorithms for devkit.
//!
//! This crate provides a generic directed acyclic graph keyed by string
//! identifiers, backed by petgraph, together with the ordering algorithms
//! the rest of devkit builds on:
//!
//! - [`DependencyGraph::overall_order`] for a full dependency-first order
//! - [`task_order`] for batching nodes into tiers that may run concurrently
//! - [`task_order_flat`] for a fully sequential order derived from the tiers
//!
//! # Key Types
//!
//! - [`DependencyGraph`]: The graph of nodes and `depends-on` edges
//! - [`GraphNode`]: A node in the graph containing its id and payload
//! - [`TaskOrder`]: Tiers of payloads, outer order across time
//!
//! # Example
//!
//! ```
//! use devkit_task_graph::{DependencyGraph, task_order};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node("a", "package a")?;
//! graph.add_node("b", "package b")?;
//! graph.add_node("c", "package c")?;
//! graph.add_dependency("b", "a")?;
//! graph.add_dependency("c", "a")?;
//!
//! assert_eq!(graph.overall_order(false)?.first().map(String::as_str), Some("a"));
//!
//! let tiers = task_order(&graph)?;
//! assert_eq!(tiers.len(), 2);
//! assert_eq!(tiers[0], vec!["package a"]);
//! # Ok::<(), devkit_task_graph::Error>(())
//! ```

mod error;
mod graph;
mod traversal;

pub use error::{Error, Result};
pub use graph::{DependencyGraph, GraphNode};
pub use traversal::{TaskOrder, Tier, task_order, task_order_flat};
