//! VoxelGrid - dense density field over a regular lattice.
//!
//! # Indexing
//!
//! ```text
//! index = x + y * dim.x + z * dim.x * dim.y
//! world = origin + coord * voxel_size
//! ```
//!
//! X is the fastest-varying axis, matching the order clouds sample their
//! lattice in.

use glam::{IVec3, UVec3, Vec3};

/// Dense per-sample density storage for one cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid {
  densities: Vec<f32>,
  dimensions: UVec3,
  origin: Vec3,
  voxel_size: Vec3,
}

impl VoxelGrid {
  /// Zero-filled grid.
  pub fn new(dimensions: UVec3, origin: Vec3, voxel_size: Vec3) -> Self {
    Self::filled(dimensions, origin, voxel_size, 0.0)
  }

  /// Grid with every sample set to `density`.
  pub fn filled(dimensions: UVec3, origin: Vec3, voxel_size: Vec3, density: f32) -> Self {
    let len = dimensions.x as usize * dimensions.y as usize * dimensions.z as usize;
    Self {
      densities: vec![density; len],
      dimensions,
      origin,
      voxel_size,
    }
  }

  #[inline]
  pub fn dimensions(&self) -> UVec3 {
    self.dimensions
  }

  #[inline]
  pub fn origin(&self) -> Vec3 {
    self.origin
  }

  #[inline]
  pub fn voxel_size(&self) -> Vec3 {
    self.voxel_size
  }

  /// Number of samples (`dim.x * dim.y * dim.z`).
  #[inline]
  pub fn len(&self) -> usize {
    self.densities.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.densities.is_empty()
  }

  /// Raw sample storage in lattice order.
  #[inline]
  pub fn densities(&self) -> &[f32] {
    &self.densities
  }

  /// Linear index of `coord`, or None outside the lattice.
  #[inline]
  pub fn index_of(&self, coord: IVec3) -> Option<usize> {
    let dim = self.dimensions.as_ivec3();
    if coord.cmplt(IVec3::ZERO).any() || coord.cmpge(dim).any() {
      return None;
    }
    let (x, y, z) = (coord.x as usize, coord.y as usize, coord.z as usize);
    let (dx, dy) = (dim.x as usize, dim.y as usize);
    Some(x + y * dx + z * dx * dy)
  }

  /// Inverse of [`VoxelGrid::index_of`].
  #[inline]
  pub fn coord_of(&self, index: usize) -> IVec3 {
    let dx = self.dimensions.x as usize;
    let dxy = dx * self.dimensions.y as usize;
    IVec3::new(
      (index % dx) as i32,
      ((index % dxy) / dx) as i32,
      (index / dxy) as i32,
    )
  }

  /// Density at `coord`; samples outside the lattice read as clear air.
  #[inline]
  pub fn density_at(&self, coord: IVec3) -> f32 {
    self
      .index_of(coord)
      .map_or(0.0, |index| self.densities[index])
  }

  /// Store `density` at `coord`. Writes outside the lattice are ignored and
  /// reported as `false`.
  pub fn set_density_at(&mut self, coord: IVec3, density: f32) -> bool {
    match self.index_of(coord) {
      Some(index) => {
        self.densities[index] = density;
        true
      }
      None => false,
    }
  }

  /// World-space position of the sample at `coord`.
  #[inline]
  pub fn voxel_to_world(&self, coord: IVec3) -> Vec3 {
    self.origin + coord.as_vec3() * self.voxel_size
  }

  /// Nearest lattice sample to `world` (may lie outside the lattice).
  #[inline]
  pub fn world_to_voxel(&self, world: Vec3) -> IVec3 {
    ((world - self.origin) / self.voxel_size).round().as_ivec3()
  }

  /// Iterate `(coord, world_position)` in lattice order.
  pub fn lattice(&self) -> impl Iterator<Item = (IVec3, Vec3)> + '_ {
    let dim = self.dimensions.as_ivec3();
    (0..dim.z).flat_map(move |z| {
      (0..dim.y).flat_map(move |y| {
        (0..dim.x).map(move |x| {
          let coord = IVec3::new(x, y, z);
          (coord, self.voxel_to_world(coord))
        })
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grid() -> VoxelGrid {
    VoxelGrid::new(UVec3::new(4, 3, 2), Vec3::new(10.0, 0.0, -5.0), Vec3::splat(2.0))
  }

  #[test]
  fn test_len_and_fill() {
    let grid = VoxelGrid::filled(UVec3::new(4, 3, 2), Vec3::ZERO, Vec3::ONE, 0.1);
    assert_eq!(grid.len(), 24);
    assert!(grid.densities().iter().all(|&d| d == 0.1));
  }

  #[test]
  fn test_index_x_fastest() {
    let grid = grid();
    assert_eq!(grid.index_of(IVec3::new(0, 0, 0)), Some(0));
    assert_eq!(grid.index_of(IVec3::new(1, 0, 0)), Some(1));
    assert_eq!(grid.index_of(IVec3::new(0, 1, 0)), Some(4));
    assert_eq!(grid.index_of(IVec3::new(0, 0, 1)), Some(12));
    assert_eq!(grid.index_of(IVec3::new(3, 2, 1)), Some(23));
  }

  #[test]
  fn test_index_coord_roundtrip() {
    let grid = grid();
    for index in 0..grid.len() {
      let coord = grid.coord_of(index);
      assert_eq!(grid.index_of(coord), Some(index), "index {}", index);
    }
  }

  #[test]
  fn test_out_of_range_reads_zero_and_ignores_writes() {
    let mut grid = grid();
    for coord in [IVec3::new(-1, 0, 0), IVec3::new(4, 0, 0), IVec3::new(0, 0, 2)] {
      assert_eq!(grid.index_of(coord), None);
      assert_eq!(grid.density_at(coord), 0.0);
      assert!(!grid.set_density_at(coord, 1.0));
    }
  }

  #[test]
  fn test_set_then_get() {
    let mut grid = grid();
    assert!(grid.set_density_at(IVec3::new(2, 1, 1), 0.8));
    assert_eq!(grid.density_at(IVec3::new(2, 1, 1)), 0.8);
    assert_eq!(grid.density_at(IVec3::new(1, 1, 1)), 0.0);
  }

  #[test]
  fn test_world_voxel_roundtrip() {
    let grid = grid();
    let coord = IVec3::new(3, 1, 1);
    let world = grid.voxel_to_world(coord);
    assert_eq!(world, Vec3::new(16.0, 2.0, -3.0));
    assert_eq!(grid.world_to_voxel(world), coord);
    // Small drift still snaps to the same sample.
    assert_eq!(grid.world_to_voxel(world + Vec3::splat(0.3)), coord);
  }

  #[test]
  fn test_lattice_order() {
    let grid = grid();
    let coords: Vec<IVec3> = grid.lattice().map(|(c, _)| c).collect();
    assert_eq!(coords.len(), grid.len());
    for (index, coord) in coords.iter().enumerate() {
      assert_eq!(grid.index_of(*coord), Some(index));
    }
  }
}
