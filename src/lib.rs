//! An in-memory forest that indexes payloads by caller-chosen integer ids.
//!
//! Nodes are attached either as additional roots or as children of nodes
//! that already exist. The forest keeps constant-time lookup by id together
//! with derived bookkeeping: sibling chains, depths, the root list and the
//! leaf set.
//!
//! ```
//! use idforest::Forest;
//!
//! let mut forest = Forest::new();
//! forest.add_root(1, "root").unwrap();
//! forest.add_child(1, 2, "first").unwrap();
//! forest.add_child(1, 3, "second").unwrap();
//!
//! let root = forest.lookup(1).unwrap();
//! assert_eq!(root.link.child(), Some(3));
//! assert_eq!(forest.leaves(), &[2, 3]);
//! ```
pub mod forest;
mod memory;

pub use forest::{Forest, ForestError, Links, Node, NodeLink, Nodes};

/// Identifier of a node, chosen by the caller.
pub type NodeId = i64;
