//! Structural constants for the cloud octree.
//!
//! # Octant Convention
//!
//! ```text
//! Octant index bits (binary: ZYX), set bit = upper half of that axis:
//!   0 = (-,-,-)    4 = (-,-,+)
//!   1 = (+,-,-)    5 = (+,-,+)
//!   2 = (-,+,-)    6 = (-,+,+)
//!   3 = (+,+,-)    7 = (+,+,+)
//! ```
//!
//! The lower half of every axis is closed and the upper half is open
//! (`min <= p < mid` vs `mid <= p`), so a point on a split plane lands in
//! exactly one octant.

/// Deepest level a node may live at (root = 0).
pub const MAX_OCTREE_DEPTH: u32 = 8;

/// Element count at or below which a node stops subdividing.
pub const ELEMENTS_PER_LEAF: usize = 4;

/// Children per internal node.
pub const OCTANT_COUNT: usize = 8;

/// Sentinel written to GPU index fields when a range is empty.
pub const NO_INDEX: i32 = -1;

/// Decompose an octant index into per-axis upper-half flags `(x, y, z)`.
#[inline(always)]
pub const fn octant_axes(octant: usize) -> (bool, bool, bool) {
  (octant & 1 != 0, octant & 2 != 0, octant & 4 != 0)
}

/// Compose an octant index from per-axis upper-half flags.
#[inline(always)]
pub const fn octant_index(upper_x: bool, upper_y: bool, upper_z: bool) -> usize {
  (upper_x as usize) | ((upper_y as usize) << 1) | ((upper_z as usize) << 2)
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
