use glam::{IVec3, UVec3, Vec3};

use super::*;

fn small_desc() -> CloudDesc {
  CloudDesc::new(Vec3::new(10.0, 0.0, -4.0))
    .with_grid_dimensions(UVec3::new(4, 3, 2))
    .with_voxel_size(Vec3::splat(2.0))
}

#[test]
fn test_desc_defaults() {
  let desc = CloudDesc::default();
  assert_eq!(desc.grid_dimensions, UVec3::splat(64));
  assert_eq!(desc.voxel_size, Vec3::ONE);
  assert_eq!(desc.threshold, 0.0);
}

/// Every lattice sample lands in the grid; positions start at the center.
#[test]
fn test_generate_samples_lattice() {
  let desc = small_desc();
  let cloud = Cloud::generate(desc, &|p: Vec3| p.x);

  assert_eq!(cloud.grid().len(), 24);
  // x fastest: first two samples differ by one voxel step along X.
  assert_eq!(cloud.grid().densities()[0], 10.0);
  assert_eq!(cloud.grid().densities()[1], 12.0);
  assert_eq!(cloud.grid().density_at(IVec3::new(3, 2, 1)), 16.0);

  // All samples are above the zero threshold.
  assert_eq!(cloud.voxels().len(), 24);
  assert_eq!(cloud.voxels()[0].position, desc.center);
  assert_eq!(cloud.voxels()[23].position, Vec3::new(16.0, 4.0, -2.0));
}

/// Only samples strictly above the threshold become voxels.
#[test]
fn test_generate_threshold_is_strict() {
  let desc = small_desc().with_threshold(12.0);
  let cloud = Cloud::generate(desc, &|p: Vec3| p.x);

  // x in {10, 12, 14, 16}: only 14 and 16 pass, 6 samples each.
  assert_eq!(cloud.voxels().len(), 12);
  assert!(cloud.voxels().iter().all(|v| v.density > 12.0));
  // The grid still records sub-threshold samples.
  assert_eq!(cloud.grid().density_at(IVec3::ZERO), 10.0);
}

#[test]
fn test_bounds_cover_voxel_cells() {
  let cloud = Cloud::generate(small_desc(), &|_: Vec3| 1.0);
  let bounds = cloud.bounds();
  assert_eq!(bounds.min, Vec3::new(9.0, -1.0, -5.0));
  assert_eq!(bounds.max, Vec3::new(17.0, 5.0, -1.0));
}

/// Without voxels the bounds are the single cell around the center.
#[test]
fn test_bounds_without_voxels() {
  let cloud = Cloud::generate(small_desc(), &|_: Vec3| 0.0);
  assert!(cloud.voxels().is_empty());
  assert_eq!(
    cloud.bounds(),
    Aabb3::from_center_half_extents(Vec3::new(10.0, 0.0, -4.0), Vec3::ONE)
  );
  assert_eq!(cloud.density_range(), None);
}

#[test]
fn test_refresh_after_edit() {
  let mut cloud = Cloud::from_voxels(small_desc(), vec![Voxel::new(Vec3::new(10.0, 0.0, -4.0), 1.0)]);
  cloud.voxels_mut().push(Voxel::new(Vec3::new(30.0, 0.0, -4.0), 0.5));
  cloud.refresh_bounds();
  assert_eq!(cloud.bounds().max.x, 31.0);
  assert_eq!(cloud.density_range(), Some((0.5, 1.0)));
}

#[test]
fn test_gpu_record() {
  let cloud = Cloud::generate(small_desc(), &|_: Vec3| 1.0);
  let record = cloud.gpu_record(100, 24, 7);

  assert_eq!(record.center, [10.0, 0.0, -4.0]);
  assert_eq!(record.grid_dimensions, [4, 3, 2]);
  assert_eq!(record.min_bounds, [9.0, -1.0, -5.0]);
  assert_eq!(record.max_bounds, [17.0, 5.0, -1.0]);
  assert_eq!((record.voxel_offset, record.voxel_count, record.octree_index), (100, 24, 7));
  assert_eq!(bytemuck::bytes_of(&record).len(), 60);
}

/// Struct samplers work alongside closures.
#[test]
fn test_struct_sampler() {
  struct Sphere {
    center: Vec3,
    radius: f32,
  }

  impl DensitySampler for Sphere {
    fn sample(&self, world_pos: Vec3) -> f32 {
      (self.radius - world_pos.distance(self.center)).max(0.0)
    }
  }

  let desc = CloudDesc::new(Vec3::ZERO)
    .with_grid_dimensions(UVec3::splat(5))
    .with_voxel_size(Vec3::ONE);
  let sphere = Sphere {
    center: Vec3::splat(2.0),
    radius: 1.5,
  };
  let cloud = Cloud::generate(desc, &sphere);

  // Center plus its six face neighbours lie within radius 1.5.
  // Edge neighbours sit at sqrt(2) ~ 1.414 and pass too (12 of them).
  assert_eq!(cloud.voxels().len(), 1 + 6 + 12);
  assert!(cloud.voxels().iter().all(|v| v.position.distance(Vec3::splat(2.0)) < 1.5));
}

#[test]
fn test_density_range_over_slice() {
  let voxels = [
    Voxel::new(Vec3::ZERO, 0.7),
    Voxel::new(Vec3::X, 0.1),
    Voxel::new(Vec3::Y, 0.4),
  ];
  assert_eq!(density_range(&voxels), Some((0.1, 0.7)));
  assert_eq!(density_range(&[]), None);
}
