use std::collections::HashMap;
use std::iter::FusedIterator;
use std::mem::replace;

use thiserror::Error;
use tracing::{debug, trace};

use crate::memory::{entity_impl, map, DenseMap};
use crate::NodeId;

/// Position of a node in the forest's dense columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Slot(u32);
entity_impl!(Slot, u32);

/// Structural metadata of a node.
///
/// Links refer to other nodes by id only; resolve them through the
/// [`Forest`] that produced the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeLink {
    id: NodeId,
    parent: Option<NodeId>,
    /// Head of the child chain: the most recently attached child.
    child: Option<NodeId>,
    /// The next root for roots, the previously attached sibling for children.
    next: Option<NodeId>,
    depth: usize,
}

impl NodeLink {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's parent or `None` if it is a root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the child that was attached last, if any.
    ///
    /// Following [`NodeLink::next`] from there visits the remaining children
    /// from the most to the least recently attached.
    #[inline]
    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    /// Returns the next node in the node's sibling chain, if any.
    ///
    /// For roots this is the root inserted directly after this one. For
    /// children it is the sibling attached directly before this one.
    #[inline]
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Distance to the root of the node's tree.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.child.is_none()
    }
}

/// A node's link together with its payload.
#[derive(Debug)]
pub struct Node<'a, T> {
    pub link: &'a NodeLink,
    pub payload: &'a T,
}

impl<'a, T> Node<'a, T> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.link.id
    }
}

impl<'a, T> Clone for Node<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Node<'a, T> {}

/// A forest of payloads indexed by caller-chosen ids.
///
/// Nodes are stored in an arena: an id index resolves to a dense slot and
/// the links and payloads live in two columns sharing that slot space. The
/// forest only grows; nodes are never moved or removed.
#[derive(Debug, Clone)]
pub struct Forest<T> {
    slots: HashMap<NodeId, Slot>,
    links: DenseMap<Slot, NodeLink>,
    payloads: DenseMap<Slot, T>,
    roots: Vec<NodeId>,
    leaves: Vec<NodeId>,
}

impl<T> Forest<T> {
    /// Creates a new empty forest.
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            links: DenseMap::new(),
            payloads: DenseMap::new(),
            roots: Vec::new(),
            leaves: Vec::new(),
        }
    }

    /// Creates a new empty forest with room for `capacity` nodes.
    ///
    /// # Errors
    ///
    ///  - When `capacity` is negative, does not fit into `usize`, or is too
    ///    large to allocate.
    pub fn with_capacity(capacity: i64) -> Result<Self, ForestError> {
        let Ok(size) = usize::try_from(capacity) else {
            return Err(ForestError::InvalidCapacity(capacity));
        };

        let mut forest = Self::new();
        let reserved = forest
            .slots
            .try_reserve(size)
            .and_then(|()| forest.links.try_reserve(size))
            .and_then(|()| forest.payloads.try_reserve(size))
            .and_then(|()| forest.leaves.try_reserve(size));

        if reserved.is_err() {
            debug!(capacity, "rejected capacity hint");
            return Err(ForestError::InvalidCapacity(capacity));
        }

        Ok(forest)
    }

    /// Reserves room for at least `additional` more nodes.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
        self.links.reserve(additional);
        self.payloads.reserve(additional);
        self.leaves.reserve(additional);
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Returns the node with the given id, if any.
    pub fn get(&self, id: NodeId) -> Option<Node<'_, T>> {
        let slot = *self.slots.get(&id)?;
        Some(Node {
            link: &self.links[slot],
            payload: &self.payloads[slot],
        })
    }

    /// Returns the node with the given id.
    ///
    /// # Errors
    ///
    ///  - When no node with that id exists.
    pub fn lookup(&self, id: NodeId) -> Result<Node<'_, T>, ForestError> {
        self.get(id).ok_or_else(|| {
            debug!(id, "lookup of unknown node");
            ForestError::NotFound(id)
        })
    }

    #[inline]
    pub fn link(&self, id: NodeId) -> Option<&NodeLink> {
        let slot = *self.slots.get(&id)?;
        self.links.get(slot)
    }

    #[inline]
    pub fn payload(&self, id: NodeId) -> Option<&T> {
        let slot = *self.slots.get(&id)?;
        self.payloads.get(slot)
    }

    /// Returns the roots in insertion order.
    #[inline]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns the nodes without children, in the order they were inserted.
    #[inline]
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Iterates over the links of all nodes.
    ///
    /// Nodes are currently visited in insertion order, but callers should
    /// not rely on any particular order.
    pub fn links(&self) -> Links<'_> {
        Links {
            inner: self.links.iter(),
        }
    }

    /// Iterates over all nodes, in the same order as [`Forest::links`].
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes {
            links: self.links.iter(),
            payloads: &self.payloads,
        }
    }

    /// Inserts a node as the last root.
    ///
    /// # Errors
    ///
    ///  - When a node with the same id already exists.
    ///
    /// # Panics
    ///
    /// Panics when the forest would hold more than `u32::MAX + 1` nodes.
    pub fn add_root(&mut self, id: NodeId, payload: T) -> Result<(), ForestError> {
        self.insert(None, id, payload)
    }

    /// Inserts a node as the first child of an existing node.
    ///
    /// # Errors
    ///
    ///  - When a node with the same id already exists.
    ///  - When the parent does not exist.
    ///
    /// # Panics
    ///
    /// Panics when the forest would hold more than `u32::MAX + 1` nodes.
    pub fn add_child(&mut self, parent: NodeId, id: NodeId, payload: T) -> Result<(), ForestError> {
        self.insert(Some(parent), id, payload)
    }

    /// Inserts a node under `parent`, or as a new root when `parent` is `None`.
    ///
    /// A new root becomes the successor of the previously last root. A new
    /// child becomes the head of its parent's child chain, pointing at the
    /// former head. The forest is left untouched when an error is returned.
    ///
    /// # Errors
    ///
    ///  - When a node with the same id already exists.
    ///  - When the parent does not exist.
    ///
    /// # Panics
    ///
    /// Panics when the forest would hold more than `u32::MAX + 1` nodes.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        id: NodeId,
        payload: T,
    ) -> Result<(), ForestError> {
        if self.slots.contains_key(&id) {
            debug!(id, "rejected duplicate node id");
            return Err(ForestError::DuplicateId(id));
        }

        let parent = match parent {
            Some(parent) => match self.slots.get(&parent) {
                Some(&slot) => Some((parent, slot)),
                None => {
                    debug!(id, parent, "rejected node with unknown parent");
                    return Err(ForestError::ParentNotFound(parent));
                }
            },
            None => None,
        };

        let depth = parent.map_or(0, |(_, slot)| self.links[slot].depth + 1);

        let slot = self.links.push(NodeLink {
            id,
            parent: parent.map(|(parent, _)| parent),
            child: None,
            next: None,
            depth,
        });
        self.payloads.push(payload);
        self.slots.insert(id, slot);

        match parent {
            None => {
                if let Some(last) = self.roots.last().map(|root| self.slots[root]) {
                    self.links[last].next = Some(id);
                }
                self.roots.push(id);
            }
            Some((parent, parent_slot)) => {
                match replace(&mut self.links[parent_slot].child, Some(id)) {
                    Some(sibling) => self.links[slot].next = Some(sibling),
                    None => {
                        if let Some(index) = self.leaves.iter().position(|&leaf| leaf == parent) {
                            self.leaves.remove(index);
                        }
                    }
                }
            }
        }

        self.leaves.push(id);

        trace!(id, parent = ?parent.map(|(parent, _)| parent), depth, "inserted node");
        Ok(())
    }
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a Forest<T> {
    type Item = &'a NodeLink;
    type IntoIter = Links<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.links()
    }
}

/// Iterator over the links of a forest, created by [`Forest::links`].
#[derive(Clone)]
pub struct Links<'a> {
    inner: map::Iter<'a, Slot, NodeLink>,
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a NodeLink;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, link)| link)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> ExactSizeIterator for Links<'a> {}
impl<'a> FusedIterator for Links<'a> {}

/// Iterator over the nodes of a forest, created by [`Forest::nodes`].
pub struct Nodes<'a, T> {
    links: map::Iter<'a, Slot, NodeLink>,
    payloads: &'a DenseMap<Slot, T>,
}

impl<'a, T> Clone for Nodes<'a, T> {
    fn clone(&self) -> Self {
        Self {
            links: self.links.clone(),
            payloads: self.payloads,
        }
    }
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = Node<'a, T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (slot, link) = self.links.next()?;
        Some(Node {
            link,
            payload: &self.payloads[slot],
        })
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.links.size_hint()
    }
}

impl<'a, T> ExactSizeIterator for Nodes<'a, T> {}
impl<'a, T> FusedIterator for Nodes<'a, T> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForestError {
    #[error("capacity {0} is out of range")]
    InvalidCapacity(i64),
    #[error("node {0} already exists in the forest")]
    DuplicateId(NodeId),
    #[error("parent node {0} not found in the forest")]
    ParentNotFound(NodeId),
    #[error("node {0} not found in the forest")]
    NotFound(NodeId),
}
