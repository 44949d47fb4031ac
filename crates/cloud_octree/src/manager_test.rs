use glam::{UVec3, Vec3};

use super::*;
use crate::cloud::CloudDesc;
use crate::constants::NO_INDEX;
use crate::octree::PositionKey;

fn test_cloud(center: Vec3) -> Cloud {
  let desc = CloudDesc::new(center)
    .with_grid_dimensions(UVec3::splat(4))
    .with_voxel_size(Vec3::splat(2.0));
  Cloud::generate(desc, &|p: Vec3| 0.5 + 0.01 * (p.x - center.x))
}

fn manager() -> CloudManager {
  CloudManager::new(ManagerConfig::new().with_voxel_extent(Vec3::splat(2.0)))
}

// =========================================================================
// Batch 1: Lifecycle
// =========================================================================

#[test]
fn test_config_defaults() {
  let config = ManagerConfig::default();
  assert_eq!(config.max_clouds, 50);
  assert_eq!(config.voxel_extent, Vec3::splat(20.0));
  assert_eq!(config.octree, OctreeConfig::default());
}

#[test]
fn test_capacity_exceeded() {
  let mut manager = CloudManager::new(ManagerConfig::new().with_max_clouds(2));
  assert!(manager.add_cloud(test_cloud(Vec3::ZERO)).is_ok());
  assert!(manager.add_cloud(test_cloud(Vec3::X * 50.0)).is_ok());

  let err = manager.add_cloud(test_cloud(Vec3::X * 100.0));
  assert_eq!(err, Err(ManagerError::CapacityExceeded { max_clouds: 2 }));
  assert_eq!(manager.len(), 2);

  let message = ManagerError::CapacityExceeded { max_clouds: 2 }.to_string();
  assert!(message.contains('2'));
}

#[test]
fn test_ids_are_not_reused() {
  let mut manager = manager();
  let a = manager.add_cloud(test_cloud(Vec3::ZERO)).unwrap();
  manager.remove_cloud(a).unwrap();
  let b = manager.add_cloud(test_cloud(Vec3::ZERO)).unwrap();
  assert_ne!(a, b);
  assert_eq!(manager.ids().collect::<Vec<_>>(), vec![b]);
}

#[test]
fn test_unknown_cloud() {
  let mut manager = manager();
  let id = manager.add_cloud(test_cloud(Vec3::ZERO)).unwrap();
  let removed = manager.remove_cloud(id).unwrap();
  assert_eq!(removed.voxels().len(), 64);

  assert_eq!(manager.mark_dirty(id), Err(ManagerError::UnknownCloud(id)));
  assert!(manager.remove_cloud(id).is_err());
  assert!(manager.cloud(id).is_none());
  assert!(manager.is_empty());
}

// =========================================================================
// Batch 2: Rebuild
// =========================================================================

/// Only dirty trees rebuild; a clean manager reports no work.
#[test]
fn test_rebuild_clears_dirty() {
  let mut manager = manager();
  let id = manager.add_cloud(test_cloud(Vec3::ZERO)).unwrap();
  assert_eq!(manager.is_dirty(id), Ok(true));

  assert!(manager.rebuild());
  assert_eq!(manager.is_dirty(id), Ok(false));
  assert!(!manager.rebuild());

  manager.mark_dirty(id).unwrap();
  assert!(manager.rebuild());
}

/// Trees are rooted at their cloud and cover every voxel.
#[test]
fn test_rebuild_builds_trees() {
  let mut manager = manager();
  let id = manager.add_cloud(test_cloud(Vec3::new(10.0, 0.0, 0.0))).unwrap();
  manager.rebuild();

  let tree = manager.tree(id).unwrap();
  let cloud = manager.cloud(id).unwrap();
  assert_eq!(tree.total_elements(), cloud.voxels().len());
  assert_eq!(tree.root_bounds(), cloud.bounds());
  assert!(tree.node_count() > 1);
  assert!(tree.max_depth_reached() <= manager.config().octree.max_depth);
}

/// Node offsets are the running sum of node counts in insertion order.
#[test]
fn test_node_offsets_running_sum() {
  let mut manager = manager();
  let ids: Vec<CloudId> = (0..3)
    .map(|i| manager.add_cloud(test_cloud(Vec3::X * (i as f32 * 40.0))).unwrap())
    .collect();
  manager.rebuild();

  let mut expected = 0;
  for &id in &ids {
    assert_eq!(manager.node_offset(id), Some(expected));
    expected += manager.tree(id).unwrap().node_count() as u32;
  }

  // Removing the first shifts the rest down immediately.
  let first_nodes = manager.tree(ids[0]).unwrap().node_count() as u32;
  let before = manager.node_offset(ids[2]).unwrap();
  manager.remove_cloud(ids[0]).unwrap();
  assert_eq!(manager.node_offset(ids[1]), Some(0));
  assert_eq!(manager.node_offset(ids[2]), Some(before - first_nodes));
}

/// Editing through `cloud_mut` schedules a rebuild that sees the edit.
#[test]
fn test_cloud_mut_marks_dirty() {
  let mut manager = manager();
  let id = manager.add_cloud(test_cloud(Vec3::ZERO)).unwrap();
  manager.rebuild();

  if let Some(cloud) = manager.cloud_mut(id) {
    cloud.voxels_mut().truncate(3);
  }
  assert_eq!(manager.is_dirty(id), Ok(true));
  manager.rebuild();

  let tree = manager.tree(id).unwrap();
  assert_eq!(tree.total_elements(), 3);
  assert_eq!(tree.node_count(), 1);
}

// =========================================================================
// Batch 3: Merged Serialization
// =========================================================================

#[test]
fn test_serialize_merges_clouds() {
  let mut manager = manager();
  let a = manager.add_cloud(test_cloud(Vec3::ZERO)).unwrap();
  let b = manager.add_cloud(test_cloud(Vec3::new(0.0, 50.0, 0.0))).unwrap();

  // Serialize flushes the pending rebuild.
  let buffers = manager.serialize();
  assert_eq!(manager.is_dirty(a), Ok(false));

  let (tree_a, tree_b) = (manager.tree(a).unwrap(), manager.tree(b).unwrap());
  assert_eq!(
    buffers.octree.nodes.len(),
    tree_a.node_count() + tree_b.node_count()
  );
  assert_eq!(buffers.octree.elements.len(), 128);
  assert_eq!(buffers.clouds.len(), 2);

  let (gpu_a, gpu_b) = (buffers.clouds[0], buffers.clouds[1]);
  assert_eq!((gpu_a.octree_index, gpu_a.voxel_offset, gpu_a.voxel_count), (0, 0, 64));
  assert_eq!(gpu_b.octree_index, tree_a.node_count() as u32);
  assert_eq!((gpu_b.voxel_offset, gpu_b.voxel_count), (64, 64));
  assert_eq!(gpu_b.center, [0.0, 50.0, 0.0]);
  assert_eq!(Some(gpu_b.octree_index), manager.node_offset(b));

  // Densities run 0.5 .. 0.5 + 0.01 * 6 across each cloud's x axis.
  assert_eq!(buffers.density_min, 0.5);
  assert!((buffers.density_max - 0.56).abs() < 1e-6);
}

/// Each cloud's root record reaches only its own voxel slots.
#[test]
fn test_serialized_roots_are_disjoint() {
  let mut manager = manager();
  for i in 0..3 {
    manager
      .add_cloud(test_cloud(Vec3::new(0.0, 0.0, i as f32 * 30.0)))
      .unwrap();
  }
  let buffers = manager.serialize();

  for cloud in &buffers.clouds {
    let mut stack = vec![cloud.octree_index as usize];
    let mut slots = Vec::new();
    while let Some(slot) = stack.pop() {
      let node = buffers.octree.nodes[slot];
      if node.is_leaf() {
        slots.extend(node.element_range(buffers.octree.elements.len()));
      } else {
        assert_ne!(node.first_child_index, NO_INDEX);
        stack.extend(node.child_range());
      }
    }
    slots.sort_unstable();
    let start = cloud.voxel_offset as usize;
    let expected: Vec<usize> = (start..start + cloud.voxel_count as usize).collect();
    assert_eq!(slots, expected);
  }
}

/// A cloud overlapping an earlier one only appends its new positions; shared
/// positions resolve to the earlier cloud's slots and payloads.
#[test]
fn test_overlapping_clouds_share_slots() {
  let mut manager = manager();
  manager.add_cloud(test_cloud(Vec3::ZERO)).unwrap();
  // Lattice x runs 4..=10 against 0..=6: the x = 4 and x = 6 planes coincide.
  let b = manager.add_cloud(test_cloud(Vec3::X * 4.0)).unwrap();
  let buffers = manager.serialize();

  assert_eq!(buffers.octree.elements.len(), 96);
  let gpu_b = buffers.clouds[1];
  assert_eq!((gpu_b.voxel_offset, gpu_b.voxel_count), (64, 32));

  let new_slots = 64..96;
  let mut appended = Vec::new();
  for voxel in manager.cloud(b).unwrap().voxels() {
    let slot = buffers
      .octree
      .element_index(PositionKey::from(voxel.position))
      .unwrap() as usize;
    if voxel.position.x < 8.0 {
      assert!(slot < 64, "shared position {:?} got slot {}", voxel.position, slot);
      // First cloud's payload: 0.5 + 0.01 * x.
      let expected = 0.5 + 0.01 * voxel.position.x;
      assert!((buffers.octree.elements[slot].density - expected).abs() < 1e-6);
    } else {
      assert!(new_slots.contains(&slot));
      appended.push(slot);
    }
  }
  appended.sort_unstable();
  assert_eq!(appended, new_slots.collect::<Vec<_>>());
}

#[test]
fn test_serialize_empty_manager() {
  let mut manager = manager();
  let buffers = manager.serialize();
  assert!(buffers.octree.is_empty());
  assert!(buffers.clouds.is_empty());
  assert_eq!((buffers.density_min, buffers.density_max), (0.0, 0.0));
}

/// A cloud with no voxels still contributes one empty root.
#[test]
fn test_serialize_cloud_without_voxels() {
  let mut manager = manager();
  let desc = CloudDesc::new(Vec3::ZERO).with_grid_dimensions(UVec3::splat(2));
  manager
    .add_cloud(Cloud::generate(desc, &|_: Vec3| 0.0))
    .unwrap();
  let buffers = manager.serialize();

  assert_eq!(buffers.octree.nodes.len(), 1);
  assert_eq!(buffers.octree.nodes[0].first_element_index, NO_INDEX);
  assert_eq!(buffers.clouds[0].voxel_count, 0);
}
