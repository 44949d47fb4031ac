use super::*;

#[test]
fn test_default_matches_constants() {
  let config = OctreeConfig::default();
  assert_eq!(config.max_depth, 8);
  assert_eq!(config.elements_per_leaf, 4);
}

#[test]
fn test_builder_overrides() {
  let config = OctreeConfig::new()
    .with_max_depth(3)
    .with_elements_per_leaf(16);
  assert_eq!(config.max_depth, 3);
  assert_eq!(config.elements_per_leaf, 16);
}

/// Small element counts terminate regardless of depth.
#[test]
fn test_leaf_by_count() {
  let config = OctreeConfig::default();
  assert!(config.is_leaf(0, 0));
  assert!(config.is_leaf(0, 4));
  assert!(!config.is_leaf(0, 5));
}

/// Reaching max depth terminates regardless of count.
#[test]
fn test_leaf_by_depth() {
  let config = OctreeConfig::default();
  assert!(!config.is_leaf(7, 100));
  assert!(config.is_leaf(8, 100));
  assert!(config.is_leaf(9, 100));
}
