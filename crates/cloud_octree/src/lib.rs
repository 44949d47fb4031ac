//! cloud_octree - sparse density octrees for volumetric clouds
//!
//! This crate partitions positioned, density-bearing elements (voxels) into a
//! bounded octree, aggregates per-cell density, and flattens the tree into
//! pointer-free arrays a compute shader can walk.
//!
//! # Features
//!
//! - **Tight-fit octree**: node bounds hug their elements, not the octant box
//! - **Pluggable accessors**: bounds, center and density strategies as
//!   generics, closures included
//! - **GPU flattening**: contiguous child runs, element de-duplication by
//!   position, several trees per buffer
//! - **Cloud manager**: per-cloud trees rebuilt in parallel with rayon and
//!   merged into shared buffers
//!
//! # Example
//!
//! ```ignore
//! use cloud_octree::{Cloud, CloudDesc, CloudManager};
//!
//! let cloud = Cloud::generate(CloudDesc::new(Vec3::ZERO), &|p: Vec3| noise(p));
//!
//! let mut manager = CloudManager::default();
//! manager.add_cloud(cloud)?;
//! let buffers = manager.serialize();
//!
//! let (node_bytes, voxel_bytes) = buffers.octree.as_bytes();
//! let cloud_bytes: &[u8] = bytemuck::cast_slice(&buffers.clouds);
//! ```

pub mod constants;
pub mod grid;
pub mod types;

// Re-export commonly used items
pub use constants::{ELEMENTS_PER_LEAF, MAX_OCTREE_DEPTH, NO_INDEX};
pub use grid::VoxelGrid;
pub use types::{Dense, Positioned, Voxel};

// Octree construction and GPU flattening
pub mod octree;
pub use octree::{Aabb3, GpuOctree, NodeId, Octree, OctreeConfig, OctreeNode, OctreeNodeGpu};

// Cloud volumes sampled from external density fields
pub mod cloud;
pub use cloud::{Cloud, CloudDesc, CloudGpu, DensitySampler};

// Per-cloud tree ownership and merged serialization
pub mod manager;
pub use manager::{CloudBuffers, CloudId, CloudManager, ManagerConfig, ManagerError};

// Engine-agnostic metrics collection
pub mod metrics;
