//! Flat, pointer-free octree records for shader-visible storage buffers.
//!
//! # Layout
//!
//! ```text
//! nodes:    [root][c0 c1 c2][g0 g1][...]
//!              │    ▲      │  ▲
//!              └────┘      └──┘   first_child_index / num_children
//!
//! elements: [e0 e1 e2 e3 e4 ...]
//!             ▲        ▲
//!  leaf ──────┘        first_element_index / num_elements
//! ```
//!
//! Every node's children occupy one contiguous run of the node array, so a
//! shader walks the tree with integer offsets and counts only.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::OctreeNode;
use crate::constants::NO_INDEX;

/// GPU-side octree node.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct OctreeNodeGpu {
  pub min_bounds: [f32; 3],
  pub max_bounds: [f32; 3],
  /// Aggregate density of the subtree.
  pub density_sum: f32,
  /// First child slot in the node array (-1 for leaves).
  pub first_child_index: i32,
  /// Number of contiguous child slots (0 for leaves).
  pub num_children: i32,
  /// First element slot in the element array (-1 if none).
  pub first_element_index: i32,
  /// Number of elements in this leaf, duplicates included. The slots from
  /// `first_element_index` are only dense when the leaf's positions are
  /// unique.
  pub num_elements: i32,
  /// Distance from the root.
  pub depth: i32,
}

static_assertions::assert_eq_size!(OctreeNodeGpu, [u8; 48]);

impl OctreeNodeGpu {
  /// Record with bounds, density and depth filled and both ranges empty.
  pub fn from_node(node: &OctreeNode) -> Self {
    Self {
      min_bounds: node.bounds.min.to_array(),
      max_bounds: node.bounds.max.to_array(),
      density_sum: node.density_sum,
      first_child_index: NO_INDEX,
      num_children: 0,
      first_element_index: NO_INDEX,
      num_elements: 0,
      depth: node.depth as i32,
    }
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.num_children == 0
  }

  /// Node array slots of this node's children.
  #[inline]
  pub fn child_range(&self) -> std::ops::Range<usize> {
    match self.first_child_index {
      NO_INDEX => 0..0,
      first => first as usize..(first + self.num_children) as usize,
    }
  }

  /// Element array slots of this leaf's elements, clamped to
  /// `element_count` (the length of the element array).
  ///
  /// De-duplicated leaves count more elements than they own slots, so the
  /// unclamped run can end past the array.
  #[inline]
  pub fn element_range(&self, element_count: usize) -> std::ops::Range<usize> {
    match self.first_element_index {
      NO_INDEX => 0..0,
      first => {
        let start = (first as usize).min(element_count);
        let end = (first as usize + self.num_elements as usize).min(element_count);
        start..end
      }
    }
  }
}

/// Hashable spatial key: the exact bit pattern of a center position.
///
/// `-0.0` is folded onto `0.0` so both spellings of the origin collide.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PositionKey([u32; 3]);

impl From<Vec3> for PositionKey {
  #[inline]
  fn from(position: Vec3) -> Self {
    let bits = |v: f32| if v == 0.0 { 0.0f32.to_bits() } else { v.to_bits() };
    Self([bits(position.x), bits(position.y), bits(position.z)])
  }
}

/// Output buffers for one or more serialized trees.
///
/// Serializing several trees into the same `GpuOctree` continues node and
/// element indices from the current lengths and shares the de-duplication
/// map, so the combined arrays upload as single buffers.
#[derive(Clone, Debug)]
pub struct GpuOctree<T> {
  /// Flattened nodes.
  pub nodes: Vec<OctreeNodeGpu>,
  /// De-duplicated element payloads.
  pub elements: Vec<T>,
  element_map: HashMap<PositionKey, u32>,
}

impl<T> GpuOctree<T> {
  pub fn new() -> Self {
    Self {
      nodes: Vec::new(),
      elements: Vec::new(),
      element_map: HashMap::new(),
    }
  }

  /// Empty all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.nodes.clear();
    self.elements.clear();
    self.element_map.clear();
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Element slot already assigned to `key`, if any.
  #[inline]
  pub fn element_index(&self, key: PositionKey) -> Option<u32> {
    self.element_map.get(&key).copied()
  }

  /// Append a zeroed run of `count` node slots, returning the first index.
  pub(crate) fn reserve_nodes(&mut self, count: usize) -> usize {
    let first = self.nodes.len();
    self.nodes.resize(first + count, OctreeNodeGpu::zeroed());
    first
  }

  /// Slot for `element` under `key`, copying it in on first sight.
  ///
  /// A later element with an equal key reuses the first one's slot and its
  /// own payload is dropped.
  pub(crate) fn intern(&mut self, key: PositionKey, element: &T) -> u32
  where
    T: Clone,
  {
    let elements = &mut self.elements;
    *self.element_map.entry(key).or_insert_with(|| {
      elements.push(element.clone());
      (elements.len() - 1) as u32
    })
  }

  /// Node and element byte views for buffer upload.
  pub fn as_bytes(&self) -> (&[u8], &[u8])
  where
    T: Pod,
  {
    (
      bytemuck::cast_slice(&self.nodes),
      bytemuck::cast_slice(&self.elements),
    )
  }
}

impl<T> Default for GpuOctree<T> {
  fn default() -> Self {
    Self::new()
  }
}
