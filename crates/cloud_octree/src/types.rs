//! Core element types indexed by the octree.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Element with a world-space position.
pub trait Positioned {
  fn position(&self) -> Vec3;
}

/// Element carrying a scalar density.
pub trait Dense {
  fn density(&self) -> f32;
}

/// A positioned density sample of a cloud volume.
///
/// Uploaded verbatim into the voxel storage buffer, so the layout is fixed.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Voxel {
  /// World-space center of the voxel.
  pub position: Vec3,

  /// Cloud density at this sample (0 = clear air).
  pub density: f32,

  /// Moisture carried for lighting/precipitation shaders.
  pub moisture: f32,

  /// Temperature carried for lighting/precipitation shaders.
  pub temperature: f32,
}

static_assertions::assert_eq_size!(Voxel, [u8; 24]);

impl Voxel {
  pub fn new(position: Vec3, density: f32) -> Self {
    Self {
      position,
      density,
      moisture: 0.0,
      temperature: 0.0,
    }
  }

  pub fn with_moisture(mut self, moisture: f32) -> Self {
    self.moisture = moisture;
    self
  }

  pub fn with_temperature(mut self, temperature: f32) -> Self {
    self.temperature = temperature;
    self
  }

  /// A voxel with exactly zero density contributes nothing to the volume.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.density == 0.0
  }
}

impl Positioned for Voxel {
  #[inline]
  fn position(&self) -> Vec3 {
    self.position
  }
}

impl Dense for Voxel {
  #[inline]
  fn density(&self) -> f32 {
    self.density
  }
}

// Bare positions index fine; density comes from a separate accessor.
impl Positioned for Vec3 {
  #[inline]
  fn position(&self) -> Vec3 {
    *self
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
