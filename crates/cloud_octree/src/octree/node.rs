//! OctreeNode - one cell of the built hierarchy.
//!
//! Nodes live in the owning [`Octree`](super::Octree)'s arena and refer to
//! their children by [`NodeId`]. Elements are referenced by their index in the
//! slice handed to `build`.

use super::Aabb3;
use crate::constants::OCTANT_COUNT;

/// Index of a node in its tree's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
  /// The root is always the first node allocated.
  pub const ROOT: Self = Self(0);

  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// One octree cell.
#[derive(Clone, Debug, PartialEq)]
pub struct OctreeNode {
  /// Tight fit around the derived boxes of every element under this node.
  pub bounds: Aabb3,

  /// Density summed over every element passed to this node's build step.
  ///
  /// For internal nodes that is the whole subtree, accumulated top-down.
  pub density_sum: f32,

  /// Leaf flag. Only leaves hold elements.
  pub is_leaf: bool,

  /// Set when subdivision could not separate the elements and the node was
  /// kept as an oversized leaf.
  pub forced_leaf: bool,

  /// Distance from the root (root = 0).
  pub depth: u32,

  /// Child per octant. `None` means no element fell in that octant.
  pub children: [Option<NodeId>; OCTANT_COUNT],

  /// Element indices held by a leaf.
  pub elements: Vec<u32>,
}

impl OctreeNode {
  /// Unbuilt node with an initial (to be overwritten) bound.
  pub fn new(bounds: Aabb3, depth: u32) -> Self {
    Self {
      bounds,
      density_sum: 0.0,
      is_leaf: false,
      forced_leaf: false,
      depth,
      children: [None; OCTANT_COUNT],
      elements: Vec::new(),
    }
  }

  /// Iterate `(octant, child)` over the populated child slots in octant order.
  pub fn occupied_children(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
    self
      .children
      .iter()
      .enumerate()
      .filter_map(|(octant, child)| child.map(|id| (octant, id)))
  }

  /// Number of populated child slots.
  #[inline]
  pub fn child_count(&self) -> usize {
    self.children.iter().filter(|c| c.is_some()).count()
  }

  /// Number of elements held directly (always 0 for internal nodes).
  #[inline]
  pub fn element_count(&self) -> usize {
    self.elements.len()
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
