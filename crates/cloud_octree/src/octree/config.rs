//! OctreeConfig - subdivision limits for octree construction.

use crate::constants::{ELEMENTS_PER_LEAF, MAX_OCTREE_DEPTH};

/// Subdivision limits applied by [`Octree::build`](super::Octree::build).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OctreeConfig {
  /// Nodes at this depth always become leaves (root = 0).
  pub max_depth: u32,

  /// A node holding this many elements or fewer becomes a leaf.
  pub elements_per_leaf: usize,
}

impl OctreeConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_depth(mut self, max_depth: u32) -> Self {
    self.max_depth = max_depth;
    self
  }

  pub fn with_elements_per_leaf(mut self, elements_per_leaf: usize) -> Self {
    self.elements_per_leaf = elements_per_leaf;
    self
  }

  /// Leaf criterion evaluated before any subdivision attempt.
  #[inline]
  pub fn is_leaf(&self, depth: u32, element_count: usize) -> bool {
    depth >= self.max_depth || element_count <= self.elements_per_leaf
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      max_depth: MAX_OCTREE_DEPTH,
      elements_per_leaf: ELEMENTS_PER_LEAF,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
