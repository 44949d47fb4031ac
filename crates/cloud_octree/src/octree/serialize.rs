//! Octree flattening into [`GpuOctree`] buffers.

use smallvec::SmallVec;

use super::accessors::CenterAccessor;
use super::gpu::{GpuOctree, OctreeNodeGpu, PositionKey};
use super::{NodeId, Octree};
use crate::constants::{NO_INDEX, OCTANT_COUNT};

impl<T, D, C, B> Octree<T, D, C, B>
where
  C: CenterAccessor<T>,
{
  /// Append this tree to `out` and return the root's slot.
  ///
  /// `elements` must be the slice the tree was built from. Nodes are written
  /// depth-first in octant order with each node's children in one contiguous
  /// run. Elements are de-duplicated by center position against everything
  /// already in `out`, so several trees can share one accumulator.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "octree::serialize_to_gpu", fields(nodes = self.node_count()))
  )]
  pub fn serialize_to_gpu(&self, elements: &[T], out: &mut GpuOctree<T>) -> usize
  where
    T: Clone,
  {
    debug_assert_eq!(
      elements.len(),
      self.source_len(),
      "serialize with the slice the tree was built from"
    );
    let root_slot = out.reserve_nodes(1);
    self.serialize_into(NodeId::ROOT, root_slot, elements, out);
    root_slot
  }

  fn serialize_into(&self, id: NodeId, slot: usize, elements: &[T], out: &mut GpuOctree<T>)
  where
    T: Clone,
  {
    let node = self.node(id);
    let mut record = OctreeNodeGpu::from_node(node);

    if node.is_leaf {
      let mut first = NO_INDEX;
      for &index in &node.elements {
        let element = &elements[index as usize];
        let key = PositionKey::from(self.center_accessor.center(element));
        let element_slot = out.intern(key, element) as i32;
        if first == NO_INDEX {
          first = element_slot;
        }
      }
      record.first_element_index = first;
      record.num_elements = node.elements.len() as i32;
    } else {
      let children: SmallVec<[NodeId; OCTANT_COUNT]> =
        node.occupied_children().map(|(_, child)| child).collect();
      let first_child = out.reserve_nodes(children.len());
      record.first_child_index = first_child as i32;
      record.num_children = children.len() as i32;
      for (offset, &child) in children.iter().enumerate() {
        self.serialize_into(child, first_child + offset, elements, out);
      }
    }

    out.nodes[slot] = record;
  }
}

#[cfg(test)]
#[path = "serialize_test.rs"]
mod serialize_test;
