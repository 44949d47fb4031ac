//! Density octree over positioned elements and its GPU flattening.
//!
//! # Module Structure
//!
//! - [`bounds`]: `Aabb3` - node bounds and octant subdivision
//! - [`accessors`]: bounds/center/density strategies
//! - [`config`]: `OctreeConfig` - subdivision limits
//! - [`node`]: `OctreeNode` - arena cell addressed by `NodeId`
//! - [`tree`]: `Octree` - build and statistics
//! - [`gpu`]: `OctreeNodeGpu` and the `GpuOctree` accumulator
//!
//! # Example
//!
//! ```ignore
//! let mut tree = Octree::new(cloud_bounds, StoredDensity);
//! tree.build(&voxels, Vec3::splat(20.0));
//!
//! let mut out = GpuOctree::new();
//! let root = tree.serialize_to_gpu(&voxels, &mut out);
//! let (node_bytes, voxel_bytes) = out.as_bytes();
//! ```

pub mod accessors;
pub mod bounds;
pub mod config;
pub mod gpu;
pub mod node;
mod serialize;
pub mod tree;

// Re-exports
pub use accessors::{
  BoundsAccessor, CenterAccessor, CenteredBounds, ConstantDensity, DensityAccessor, GridDensity,
  StoredCenter, StoredDensity,
};
pub use bounds::Aabb3;
pub use config::OctreeConfig;
pub use gpu::{GpuOctree, OctreeNodeGpu, PositionKey};
pub use node::{NodeId, OctreeNode};
pub use tree::Octree;
