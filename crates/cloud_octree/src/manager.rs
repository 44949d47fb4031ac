//! CloudManager - one octree per cloud, merged into shared GPU buffers.
//!
//! # Flow
//!
//! ```text
//! add_cloud / mark_dirty
//!        │
//!        ▼
//! rebuild()    refresh bounds, rebuild dirty trees (rayon), assign offsets
//!        │
//!        ▼
//! serialize()  trees appended in insertion order into one GpuOctree<Voxel>
//! ```
//!
//! Each cloud's node offset is the running sum of the node counts before it,
//! which is also where its root lands in the merged node array.

use glam::Vec3;
use rayon::prelude::*;
use thiserror::Error;

use crate::cloud::{self, Cloud, CloudGpu};
use crate::metrics::{self, OctreeMetrics};
use crate::octree::{GpuOctree, Octree, OctreeConfig, StoredDensity};
use crate::types::Voxel;

/// Default cloud capacity.
pub const DEFAULT_MAX_CLOUDS: usize = 50;

/// Per-element extent used for every cloud tree by default.
pub const DEFAULT_VOXEL_EXTENT: f32 = 20.0;

/// Tree type owned per cloud.
pub type CloudOctree = Octree<Voxel, StoredDensity>;

/// Manager-level failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
  #[error("cloud capacity exceeded: at most {max_clouds} clouds")]
  CapacityExceeded { max_clouds: usize },

  #[error("unknown cloud id {0:?}")]
  UnknownCloud(CloudId),
}

/// Handle returned by [`CloudManager::add_cloud`]. Never reused by the
/// manager that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct CloudId(u64);

impl CloudId {
  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Manager limits and tree parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManagerConfig {
  pub max_clouds: usize,

  /// Element extent handed to every tree build.
  pub voxel_extent: Vec3,

  /// Subdivision limits for every tree.
  pub octree: OctreeConfig,
}

impl ManagerConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_clouds(mut self, max_clouds: usize) -> Self {
    self.max_clouds = max_clouds;
    self
  }

  pub fn with_voxel_extent(mut self, voxel_extent: Vec3) -> Self {
    self.voxel_extent = voxel_extent;
    self
  }

  pub fn with_octree(mut self, octree: OctreeConfig) -> Self {
    self.octree = octree;
    self
  }
}

impl Default for ManagerConfig {
  fn default() -> Self {
    Self {
      max_clouds: DEFAULT_MAX_CLOUDS,
      voxel_extent: Vec3::splat(DEFAULT_VOXEL_EXTENT),
      octree: OctreeConfig::default(),
    }
  }
}

/// Merged buffers for every managed cloud.
#[derive(Clone, Debug, Default)]
pub struct CloudBuffers {
  /// Every tree's nodes and de-duplicated voxels.
  pub octree: GpuOctree<Voxel>,
  /// One record per cloud, in insertion order.
  pub clouds: Vec<CloudGpu>,
  /// Lowest voxel density in `octree.elements` (0 when empty).
  pub density_min: f32,
  /// Highest voxel density in `octree.elements` (0 when empty).
  pub density_max: f32,
}

struct CloudEntry {
  id: CloudId,
  cloud: Cloud,
  tree: CloudOctree,
  node_offset: u32,
  dirty: bool,
}

/// Owns clouds and their octrees.
pub struct CloudManager {
  config: ManagerConfig,
  entries: Vec<CloudEntry>,
  next_id: u64,
  metrics: OctreeMetrics,
}

impl CloudManager {
  pub fn new(config: ManagerConfig) -> Self {
    Self {
      config,
      entries: Vec::new(),
      next_id: 0,
      metrics: OctreeMetrics::new(),
    }
  }

  #[inline]
  pub fn config(&self) -> &ManagerConfig {
    &self.config
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[inline]
  pub fn metrics(&self) -> &OctreeMetrics {
    &self.metrics
  }

  /// Take ownership of `cloud`. Its tree is built on the next rebuild.
  pub fn add_cloud(&mut self, cloud: Cloud) -> Result<CloudId, ManagerError> {
    if self.entries.len() >= self.config.max_clouds {
      return Err(ManagerError::CapacityExceeded {
        max_clouds: self.config.max_clouds,
      });
    }

    let id = CloudId(self.next_id);
    self.next_id += 1;
    let tree = Octree::new(cloud.bounds(), StoredDensity).with_config(self.config.octree);
    self.entries.push(CloudEntry {
      id,
      cloud,
      tree,
      node_offset: 0,
      dirty: true,
    });
    Ok(id)
  }

  /// Remove a cloud, handing it back. Later clouds shift down in the merged
  /// buffers.
  pub fn remove_cloud(&mut self, id: CloudId) -> Result<Cloud, ManagerError> {
    let index = self.position(id)?;
    let entry = self.entries.remove(index);
    self.assign_offsets();
    Ok(entry.cloud)
  }

  /// Schedule `id`'s tree for rebuilding.
  pub fn mark_dirty(&mut self, id: CloudId) -> Result<(), ManagerError> {
    let index = self.position(id)?;
    self.entries[index].dirty = true;
    Ok(())
  }

  pub fn is_dirty(&self, id: CloudId) -> Result<bool, ManagerError> {
    Ok(self.entries[self.position(id)?].dirty)
  }

  pub fn cloud(&self, id: CloudId) -> Option<&Cloud> {
    self.entry(id).map(|entry| &entry.cloud)
  }

  /// Mutable access marks the cloud dirty.
  pub fn cloud_mut(&mut self, id: CloudId) -> Option<&mut Cloud> {
    let index = self.position(id).ok()?;
    let entry = &mut self.entries[index];
    entry.dirty = true;
    Some(&mut entry.cloud)
  }

  pub fn tree(&self, id: CloudId) -> Option<&CloudOctree> {
    self.entry(id).map(|entry| &entry.tree)
  }

  /// Root slot of `id`'s tree in the merged node array, as of the last
  /// rebuild.
  pub fn node_offset(&self, id: CloudId) -> Option<u32> {
    self.entry(id).map(|entry| entry.node_offset)
  }

  /// Ids in insertion order.
  pub fn ids(&self) -> impl Iterator<Item = CloudId> + '_ {
    self.entries.iter().map(|entry| entry.id)
  }

  /// Refresh every cloud's bounds, rebuild dirty trees and reassign node
  /// offsets. Returns whether any tree was rebuilt.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "cloud_manager::rebuild", fields(clouds = self.entries.len()))
  )]
  pub fn rebuild(&mut self) -> bool {
    let start = metrics::is_enabled().then(web_time::Instant::now);
    let voxel_extent = self.config.voxel_extent;

    let rebuilt = {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("build_trees").entered();

      self
        .entries
        .par_iter_mut()
        .map(|entry| {
          entry.cloud.refresh_bounds();
          if !entry.dirty {
            return false;
          }
          entry.tree.set_root_bounds(entry.cloud.bounds());
          entry.tree.build(entry.cloud.voxels(), voxel_extent);
          entry.dirty = false;
          true
        })
        .filter(|&rebuilt| rebuilt)
        .count()
    };

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    let total_nodes = self.assign_offsets();

    if let Some(start) = start {
      self
        .metrics
        .record_build_timing(start.elapsed().as_micros() as u64, rebuilt as u64);
      self.metrics.reset_shape();
      for entry in &self.entries {
        self.metrics.record_tree(&entry.tree);
      }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(rebuilt, nodes = total_nodes, "cloud trees rebuilt");

    rebuilt > 0
  }

  /// Flush pending rebuilds, then merge every tree into shared buffers.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "cloud_manager::serialize", fields(clouds = self.entries.len()))
  )]
  pub fn serialize(&mut self) -> CloudBuffers {
    if self.entries.iter().any(|entry| entry.dirty) {
      self.rebuild();
    }
    let start = metrics::is_enabled().then(web_time::Instant::now);

    let mut buffers = CloudBuffers::default();
    for entry in &self.entries {
      let voxel_offset = buffers.octree.elements.len();
      let root = entry
        .tree
        .serialize_to_gpu(entry.cloud.voxels(), &mut buffers.octree);
      debug_assert_eq!(root, entry.node_offset as usize);

      let voxel_count = buffers.octree.elements.len() - voxel_offset;
      buffers.clouds.push(entry.cloud.gpu_record(
        voxel_offset as u32,
        voxel_count as u32,
        root as u32,
      ));
    }

    if let Some((lo, hi)) = cloud::density_range(&buffers.octree.elements) {
      buffers.density_min = lo;
      buffers.density_max = hi;
    }

    if let Some(start) = start {
      self
        .metrics
        .record_serialize_timing(start.elapsed().as_micros() as u64);
    }

    buffers
  }

  /// Running sum of node counts; returns the total.
  fn assign_offsets(&mut self) -> u32 {
    let mut offset = 0u32;
    for entry in &mut self.entries {
      entry.node_offset = offset;
      offset += entry.tree.node_count() as u32;
    }
    offset
  }

  fn position(&self, id: CloudId) -> Result<usize, ManagerError> {
    self
      .entries
      .iter()
      .position(|entry| entry.id == id)
      .ok_or(ManagerError::UnknownCloud(id))
  }

  fn entry(&self, id: CloudId) -> Option<&CloudEntry> {
    self.entries.iter().find(|entry| entry.id == id)
  }
}

impl Default for CloudManager {
  fn default() -> Self {
    Self::new(ManagerConfig::default())
  }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;
