//! Axis-aligned bounding box used for node bounds and octant subdivision.

use glam::Vec3;

use crate::constants::{octant_axes, octant_index};

/// Single-precision axis-aligned bounding box.
///
/// Node bounds are uploaded to the GPU as `f32`, so the box stays in the same
/// precision the shader sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
  /// Minimum corner.
  pub min: Vec3,
  /// Maximum corner.
  pub max: Vec3,
}

impl Aabb3 {
  /// Inverted box, the identity for [`Aabb3::union`].
  pub const EMPTY: Self = Self {
    min: Vec3::splat(f32::INFINITY),
    max: Vec3::splat(f32::NEG_INFINITY),
  };

  /// Box spanning `min..max`. Debug builds reject inverted corners.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(
      min.cmple(max).all(),
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Element cell around `center`: `center ± half_extents`.
  pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// True when min <= max on all axes (an `EMPTY` box is not valid).
  #[inline]
  pub fn is_valid(&self) -> bool {
    self.min.cmple(self.max).all()
  }

  /// Smallest box enclosing both boxes.
  #[inline]
  pub fn union(&self, other: &Aabb3) -> Aabb3 {
    Aabb3 {
      min: self.min.min(other.min),
      max: self.max.max(other.max),
    }
  }

  /// Grow this box in place to enclose `other`.
  #[inline]
  pub fn encapsulate(&mut self, other: &Aabb3) {
    self.min = self.min.min(other.min);
    self.max = self.max.max(other.max);
  }

  /// Half-open containment: `min <= p < max` on every axis.
  ///
  /// Sibling octants from [`Aabb3::child`] share faces, and this predicate
  /// never reports a point as inside two of them.
  #[inline]
  pub fn contains_point_lesser(&self, point: Vec3) -> bool {
    point.cmpge(self.min).all() && point.cmplt(self.max).all()
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }

  /// Octant sub-box. See [`crate::constants`] for the index convention.
  pub fn child(&self, octant: usize) -> Aabb3 {
    debug_assert!(octant < 8, "octant out of range: {}", octant);
    let mid = self.center();
    let (ux, uy, uz) = octant_axes(octant);
    let pick = |upper: bool, lo: f32, mid: f32, hi: f32| {
      if upper {
        (mid, hi)
      } else {
        (lo, mid)
      }
    };
    let (x0, x1) = pick(ux, self.min.x, mid.x, self.max.x);
    let (y0, y1) = pick(uy, self.min.y, mid.y, self.max.y);
    let (z0, z1) = pick(uz, self.min.z, mid.z, self.max.z);
    Aabb3 {
      min: Vec3::new(x0, y0, z0),
      max: Vec3::new(x1, y1, z1),
    }
  }

  /// Octant whose half-open box holds `point`.
  ///
  /// Agrees with `self.child(i).contains_point_lesser(point)` for interior
  /// points. Points on or beyond the max faces clamp into the upper octants,
  /// so every point maps to exactly one octant.
  #[inline]
  pub fn octant_of(&self, point: Vec3) -> usize {
    let mid = self.center();
    octant_index(point.x >= mid.x, point.y >= mid.y, point.z >= mid.z)
  }
}

impl Default for Aabb3 {
  fn default() -> Self {
    Self::EMPTY
  }
}
