//! Cloud - one voxelized cloud volume sampled from an external density field.
//!
//! # Lattice
//!
//! ```text
//! world(coord) = center + coord * voxel_size      coord in [0, grid_dimensions)
//! ```
//!
//! The lattice starts at `center` and extends toward +X/+Y/+Z. Samples above
//! the threshold become [`Voxel`]s; every sample is kept in the cloud's
//! [`VoxelGrid`].

use bytemuck::{Pod, Zeroable};
use glam::{UVec3, Vec3};

use crate::grid::VoxelGrid;
use crate::octree::Aabb3;
use crate::types::Voxel;

/// External density field (Perlin/Worley noise, analytic shapes, ...).
pub trait DensitySampler {
  /// Density at a world-space position.
  fn sample(&self, world_pos: Vec3) -> f32;
}

impl<F> DensitySampler for F
where
  F: Fn(Vec3) -> f32,
{
  #[inline]
  fn sample(&self, world_pos: Vec3) -> f32 {
    self(world_pos)
  }
}

/// Placement and sampling parameters for [`Cloud::generate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudDesc {
  /// Lattice origin in world space.
  pub center: Vec3,

  /// Samples per axis.
  pub grid_dimensions: UVec3,

  /// World-space spacing between samples.
  pub voxel_size: Vec3,

  /// Samples strictly above this density become voxels.
  pub threshold: f32,
}

impl CloudDesc {
  pub fn new(center: Vec3) -> Self {
    Self {
      center,
      ..Default::default()
    }
  }

  pub fn with_grid_dimensions(mut self, grid_dimensions: UVec3) -> Self {
    self.grid_dimensions = grid_dimensions;
    self
  }

  pub fn with_voxel_size(mut self, voxel_size: Vec3) -> Self {
    self.voxel_size = voxel_size;
    self
  }

  pub fn with_threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }
}

impl Default for CloudDesc {
  fn default() -> Self {
    Self {
      center: Vec3::ZERO,
      grid_dimensions: UVec3::splat(64),
      voxel_size: Vec3::ONE,
      threshold: 0.0,
    }
  }
}

/// Per-cloud record for the cloud storage buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CloudGpu {
  pub center: [f32; 3],
  pub grid_dimensions: [u32; 3],
  pub min_bounds: [f32; 3],
  pub max_bounds: [f32; 3],
  /// First slot of this cloud's voxels in the merged element array.
  pub voxel_offset: u32,
  /// Element slots appended by this cloud.
  pub voxel_count: u32,
  /// Root slot of this cloud's tree in the merged node array.
  pub octree_index: u32,
}

static_assertions::assert_eq_size!(CloudGpu, [u8; 60]);

/// A sampled cloud volume.
#[derive(Clone, Debug)]
pub struct Cloud {
  desc: CloudDesc,
  grid: VoxelGrid,
  voxels: Vec<Voxel>,
  bounds: Aabb3,
}

impl Cloud {
  /// Sample `sampler` over the lattice described by `desc`.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "cloud::generate", fields(dims = ?desc.grid_dimensions))
  )]
  pub fn generate<S: DensitySampler + ?Sized>(desc: CloudDesc, sampler: &S) -> Self {
    let mut grid = VoxelGrid::new(desc.grid_dimensions, desc.center, desc.voxel_size);
    let mut voxels = Vec::new();

    let lattice: Vec<_> = grid.lattice().collect();
    for (coord, world) in lattice {
      let density = sampler.sample(world);
      grid.set_density_at(coord, density);
      if density > desc.threshold {
        voxels.push(Voxel::new(world, density));
      }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(samples = grid.len(), voxels = voxels.len(), "cloud sampled");

    Self::from_parts(desc, grid, voxels)
  }

  /// Cloud over explicit voxels, e.g. hand-placed test volumes.
  ///
  /// The grid is left zero-filled.
  pub fn from_voxels(desc: CloudDesc, voxels: Vec<Voxel>) -> Self {
    let grid = VoxelGrid::new(desc.grid_dimensions, desc.center, desc.voxel_size);
    Self::from_parts(desc, grid, voxels)
  }

  fn from_parts(desc: CloudDesc, grid: VoxelGrid, voxels: Vec<Voxel>) -> Self {
    let mut cloud = Self {
      desc,
      grid,
      voxels,
      bounds: Aabb3::EMPTY,
    };
    cloud.refresh_bounds();
    cloud
  }

  #[inline]
  pub fn desc(&self) -> &CloudDesc {
    &self.desc
  }

  #[inline]
  pub fn center(&self) -> Vec3 {
    self.desc.center
  }

  #[inline]
  pub fn grid(&self) -> &VoxelGrid {
    &self.grid
  }

  #[inline]
  pub fn voxels(&self) -> &[Voxel] {
    &self.voxels
  }

  /// Mutable voxel list. Callers owning the cloud through a manager must
  /// mark it dirty afterwards.
  #[inline]
  pub fn voxels_mut(&mut self) -> &mut Vec<Voxel> {
    &mut self.voxels
  }

  /// Bounds as of the last [`Cloud::refresh_bounds`].
  #[inline]
  pub fn bounds(&self) -> Aabb3 {
    self.bounds
  }

  /// Recompute bounds: one voxel cell around the center, grown to cover
  /// every voxel's cell.
  pub fn refresh_bounds(&mut self) {
    let half = self.desc.voxel_size * 0.5;
    let mut bounds = Aabb3::from_center_half_extents(self.desc.center, half);
    for voxel in &self.voxels {
      bounds.encapsulate(&Aabb3::from_center_half_extents(voxel.position, half));
    }
    self.bounds = bounds;
  }

  /// Lowest and highest voxel density, or None without voxels.
  pub fn density_range(&self) -> Option<(f32, f32)> {
    density_range(&self.voxels)
  }

  /// Storage-buffer record with the given merged-buffer placement.
  pub fn gpu_record(&self, voxel_offset: u32, voxel_count: u32, octree_index: u32) -> CloudGpu {
    CloudGpu {
      center: self.desc.center.to_array(),
      grid_dimensions: self.desc.grid_dimensions.to_array(),
      min_bounds: self.bounds.min.to_array(),
      max_bounds: self.bounds.max.to_array(),
      voxel_offset,
      voxel_count,
      octree_index,
    }
  }
}

/// Lowest and highest density in `voxels`, or None when empty.
pub fn density_range(voxels: &[Voxel]) -> Option<(f32, f32)> {
  voxels.iter().fold(None, |range, voxel| {
    let d = voxel.density;
    Some(match range {
      None => (d, d),
      Some((lo, hi)) => (lo.min(d), hi.max(d)),
    })
  })
}

#[cfg(test)]
#[path = "cloud_test.rs"]
mod cloud_test;
