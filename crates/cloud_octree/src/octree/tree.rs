//! Octree - arena-owned density octree over a flat element slice.

use std::marker::PhantomData;

use glam::Vec3;

use super::accessors::{
  BoundsAccessor, CenterAccessor, CenteredBounds, DensityAccessor, StoredCenter,
};
use super::{Aabb3, NodeId, OctreeConfig, OctreeNode};

/// Density octree over elements of type `T`.
///
/// The tree owns its nodes in a flat arena; the root is always
/// [`NodeId::ROOT`]. Leaves reference elements by their index in the slice
/// passed to [`Octree::build`], so the same slice (or one with identical
/// contents) must be passed to
/// [`Octree::serialize_to_gpu`](Octree::serialize_to_gpu).
///
/// Accessor strategies are type parameters:
/// - `D` derives density (the one callers usually pick),
/// - `C` derives the classification center,
/// - `B` derives an element's box from the per-element extent.
pub struct Octree<T, D, C = StoredCenter, B = CenteredBounds> {
  nodes: Vec<OctreeNode>,
  root_bounds: Aabb3,
  config: OctreeConfig,
  total_elements: usize,
  source_len: usize,
  pub(super) bounds_accessor: B,
  pub(super) center_accessor: C,
  pub(super) density_accessor: D,
  _marker: PhantomData<fn(&T)>,
}

impl<T, D> Octree<T, D, StoredCenter, CenteredBounds> {
  /// Empty tree rooted at `bounds`, reading centers and boxes from stored
  /// positions and densities through `density`.
  pub fn new(bounds: Aabb3, density: D) -> Self {
    Self::with_accessors(bounds, CenteredBounds, StoredCenter, density)
  }
}

impl<T, D, C, B> Octree<T, D, C, B> {
  /// Empty tree with every accessor supplied explicitly.
  pub fn with_accessors(bounds: Aabb3, bounds_accessor: B, center: C, density: D) -> Self {
    let mut root = OctreeNode::new(bounds, 0);
    root.is_leaf = true;
    Self {
      nodes: vec![root],
      root_bounds: bounds,
      config: OctreeConfig::default(),
      total_elements: 0,
      source_len: 0,
      bounds_accessor,
      center_accessor: center,
      density_accessor: density,
      _marker: PhantomData,
    }
  }

  pub fn with_config(mut self, config: OctreeConfig) -> Self {
    self.config = config;
    self
  }

  #[inline]
  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// Caller-supplied root volume. The built root's bounds are the tight fit
  /// and may differ; see [`Octree::bounds`].
  #[inline]
  pub fn root_bounds(&self) -> Aabb3 {
    self.root_bounds
  }

  /// Replace the root volume used by the next build.
  pub fn set_root_bounds(&mut self, bounds: Aabb3) {
    self.root_bounds = bounds;
  }

  /// Bounds of the built root.
  #[inline]
  pub fn bounds(&self) -> Aabb3 {
    self.nodes[NodeId::ROOT.index()].bounds
  }

  #[inline]
  pub fn root(&self) -> &OctreeNode {
    &self.nodes[NodeId::ROOT.index()]
  }

  #[inline]
  pub fn node(&self, id: NodeId) -> &OctreeNode {
    &self.nodes[id.index()]
  }

  /// Arena in allocation (depth-first, octant-ordered) order.
  #[inline]
  pub fn nodes(&self) -> &[OctreeNode] {
    &self.nodes
  }

  /// Number of nodes in the tree, root included.
  #[inline]
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Elements assigned to leaves by the last build.
  #[inline]
  pub fn total_elements(&self) -> usize {
    self.total_elements
  }

  /// Length of the slice the last build indexed.
  #[inline]
  pub fn source_len(&self) -> usize {
    self.source_len
  }

  pub fn leaf_count(&self) -> usize {
    self.nodes.iter().filter(|n| n.is_leaf).count()
  }

  /// Leaves kept oversized because subdivision could not separate them.
  pub fn forced_leaf_count(&self) -> usize {
    self.nodes.iter().filter(|n| n.forced_leaf).count()
  }

  pub fn max_depth_reached(&self) -> u32 {
    self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
  }

  /// Leaves in depth-first, octant order.
  pub fn leaves(&self) -> impl Iterator<Item = &OctreeNode> + '_ {
    let mut stack = vec![NodeId::ROOT];
    std::iter::from_fn(move || {
      while let Some(id) = stack.pop() {
        let node = &self.nodes[id.index()];
        if node.is_leaf {
          return Some(node);
        }
        // Reverse so octant 0 pops first.
        stack.extend(node.children.iter().rev().flatten().copied());
      }
      None
    })
  }

  fn reset(&mut self, source_len: usize) {
    self.nodes.clear();
    self.nodes.push(OctreeNode::new(self.root_bounds, 0));
    self.total_elements = 0;
    self.source_len = source_len;
  }

  fn make_leaf(&mut self, id: NodeId, elements: Vec<u32>, forced: bool) {
    self.total_elements += elements.len();
    let node = &mut self.nodes[id.index()];
    node.is_leaf = true;
    node.forced_leaf = forced;
    node.elements = elements;
  }
}

impl<T, D, C, B> Octree<T, D, C, B>
where
  B: BoundsAccessor<T>,
  C: CenterAccessor<T>,
  D: DensityAccessor<T>,
{
  /// Rebuild the whole hierarchy from `elements`.
  ///
  /// `element_size` is the extent of every element's box. The previous
  /// hierarchy is discarded. An empty slice leaves a single zero-density
  /// leaf with the caller-supplied root bounds.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "octree::build", fields(elements = elements.len()))
  )]
  pub fn build(&mut self, elements: &[T], element_size: Vec3) {
    debug_assert!(
      elements.len() <= u32::MAX as usize,
      "element indices are stored as u32"
    );
    self.reset(elements.len());
    let indices: Vec<u32> = (0..elements.len() as u32).collect();
    self.build_recursive(NodeId::ROOT, elements, indices, element_size, 0);

    #[cfg(feature = "tracing")]
    tracing::debug!(
      nodes = self.nodes.len(),
      leaves = self.leaf_count(),
      forced_leaves = self.forced_leaf_count(),
      "octree built"
    );
  }

  fn build_recursive(
    &mut self,
    id: NodeId,
    elements: &[T],
    indices: Vec<u32>,
    element_size: Vec3,
    depth: u32,
  ) {
    let mut bounds = Aabb3::EMPTY;
    let mut density_sum = 0.0;
    for &index in &indices {
      let element = &elements[index as usize];
      bounds.encapsulate(&self.bounds_accessor.bounds(element, element_size));
      density_sum += self.density_accessor.density(element);
    }

    {
      let node = &mut self.nodes[id.index()];
      node.depth = depth;
      node.density_sum = density_sum;
      if !indices.is_empty() {
        node.bounds = bounds;
      }
    }

    if self.config.is_leaf(depth, indices.len()) {
      self.make_leaf(id, indices, false);
      return;
    }

    let mut octants: [Vec<u32>; 8] = Default::default();
    for &index in &indices {
      let center = self.center_accessor.center(&elements[index as usize]);
      octants[bounds.octant_of(center)].push(index);
    }

    if octants.iter().any(|octant| octant.len() == indices.len()) {
      #[cfg(feature = "tracing")]
      tracing::debug!(
        depth,
        elements = indices.len(),
        "forced leaf: subdivision did not separate elements"
      );
      self.make_leaf(id, indices, true);
      return;
    }

    for (octant, subset) in octants.into_iter().enumerate() {
      if subset.is_empty() {
        continue;
      }
      let child = NodeId(self.nodes.len() as u32);
      self
        .nodes
        .push(OctreeNode::new(bounds.child(octant), depth + 1));
      self.nodes[id.index()].children[octant] = Some(child);
      self.build_recursive(child, elements, subset, element_size, depth + 1);
    }
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
