use super::*;

#[test]
fn test_default_limits() {
  assert_eq!(MAX_OCTREE_DEPTH, 8, "Max depth must be 8");
  assert_eq!(ELEMENTS_PER_LEAF, 4, "Leaf capacity must be 4");
  assert_eq!(OCTANT_COUNT, 8);
}

/// octant_index(octant_axes(i)) == i for every octant.
#[test]
fn test_octant_roundtrip() {
  for octant in 0..OCTANT_COUNT {
    let (x, y, z) = octant_axes(octant);
    assert_eq!(
      octant_index(x, y, z),
      octant,
      "Roundtrip failed for octant {}",
      octant
    );
  }
}

/// Bit 0 is X, bit 1 is Y, bit 2 is Z.
#[test]
fn test_octant_bit_layout() {
  assert_eq!(octant_index(true, false, false), 1);
  assert_eq!(octant_index(false, true, false), 2);
  assert_eq!(octant_index(false, false, true), 4);
  assert_eq!(octant_index(true, true, true), 7);
  assert_eq!(octant_axes(6), (false, true, true));
}
