//! Element accessor strategies.
//!
//! The octree never reads element fields directly. Bounds, center and density
//! each come from an independently substitutable strategy, chosen as a type
//! parameter so calls monomorphize away. Closures work as center and density
//! strategies:
//!
//! ```ignore
//! let tree = Octree::new(bounds, |v: &Voxel| v.density * 2.0);
//! ```

use glam::Vec3;

use super::Aabb3;
use crate::grid::VoxelGrid;
use crate::types::{Dense, Positioned};

/// Derives an element's box from the fixed per-element extent.
pub trait BoundsAccessor<T: ?Sized> {
  fn bounds(&self, element: &T, size: Vec3) -> Aabb3;
}

/// Derives the point used for octant classification and de-duplication.
pub trait CenterAccessor<T: ?Sized> {
  fn center(&self, element: &T) -> Vec3;
}

/// Derives the scalar accumulated into node density sums.
pub trait DensityAccessor<T: ?Sized> {
  fn density(&self, element: &T) -> f32;
}

/// Box of `size` centered on the element's stored position.
#[derive(Clone, Copy, Debug, Default)]
pub struct CenteredBounds;

impl<T: Positioned + ?Sized> BoundsAccessor<T> for CenteredBounds {
  #[inline]
  fn bounds(&self, element: &T, size: Vec3) -> Aabb3 {
    Aabb3::from_center_half_extents(element.position(), size * 0.5)
  }
}

/// The element's stored position.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoredCenter;

impl<T: Positioned + ?Sized> CenterAccessor<T> for StoredCenter {
  #[inline]
  fn center(&self, element: &T) -> Vec3 {
    element.position()
  }
}

/// The element's stored density.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoredDensity;

impl<T: Dense + ?Sized> DensityAccessor<T> for StoredDensity {
  #[inline]
  fn density(&self, element: &T) -> f32 {
    element.density()
  }
}

/// Every element weighs the same. Useful for position-only trees.
#[derive(Clone, Copy, Debug)]
pub struct ConstantDensity(pub f32);

impl<T: ?Sized> DensityAccessor<T> for ConstantDensity {
  #[inline]
  fn density(&self, _element: &T) -> f32 {
    self.0
  }
}

/// Density looked up in an external grid at the element's lattice coordinate.
///
/// Lets a tree be weighted by a field that lives beside the elements instead
/// of inside them. Elements off the lattice read as zero.
#[derive(Clone, Copy, Debug)]
pub struct GridDensity<'a> {
  grid: &'a VoxelGrid,
}

impl<'a> GridDensity<'a> {
  pub fn new(grid: &'a VoxelGrid) -> Self {
    Self { grid }
  }
}

impl<T: Positioned + ?Sized> DensityAccessor<T> for GridDensity<'_> {
  #[inline]
  fn density(&self, element: &T) -> f32 {
    self
      .grid
      .density_at(self.grid.world_to_voxel(element.position()))
  }
}

impl<T: ?Sized, F> DensityAccessor<T> for F
where
  F: Fn(&T) -> f32,
{
  #[inline]
  fn density(&self, element: &T) -> f32 {
    self(element)
  }
}

impl<T: ?Sized, F> CenterAccessor<T> for F
where
  F: Fn(&T) -> Vec3,
{
  #[inline]
  fn center(&self, element: &T) -> Vec3 {
    self(element)
  }
}
