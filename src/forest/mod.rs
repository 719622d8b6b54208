//! A forest of id-addressed nodes.
//!
//! Every node is attached when it is inserted, either as a new root or as
//! a child of a node that already exists, and stays where it was put. The
//! roots form a chain in insertion order while the children of a node form
//! a chain starting at the most recently attached child.
mod linked;

pub use linked::{Forest, ForestError, Links, Node, NodeLink, Nodes};
