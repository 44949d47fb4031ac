//! Build and serialization statistics for cloud octrees.
//!
//! Feature-gated and runtime-toggled so the hot path pays nothing when
//! disabled.
//!
//! # Usage
//!
//! ```ignore
//! use cloud_octree::metrics::{OctreeMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! metrics.record_tree(&tree);
//! metrics.record_build_timing(timing_us);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::octree::Octree;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// True when the `metrics` feature is compiled in and the runtime toggle is on.
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Fixed-capacity history, oldest evicted first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Oldest to newest.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
  pub fn sum(&self) -> T {
    self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
  }
}

impl RollingWindow<u64> {
  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.sum() as f64 / self.buffer.len() as f64
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = self.buffer.iter().min()?;
    let max = self.buffer.iter().max()?;
    Some((*min, *max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128)
  }
}

/// Tree-shape totals and timing history across every managed tree.
#[derive(Debug, Clone, Default)]
pub struct OctreeMetrics {
  // Shape (summed over trees since the last `reset_shape`)
  pub node_count: usize,
  pub leaf_count: usize,
  pub forced_leaf_count: usize,
  pub element_count: usize,
  /// Deepest node across all trees.
  pub max_depth: u32,

  // Timing
  /// Rebuild times in microseconds.
  pub build_timings: RollingWindow<u64>,
  /// Merged serialization times in microseconds.
  pub serialize_timings: RollingWindow<u64>,
  pub last_build_us: u64,
  pub last_serialize_us: u64,

  /// Trees rebuilt this session.
  pub total_builds: u64,
}

impl OctreeMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Zero the shape totals before re-accumulating them.
  pub fn reset_shape(&mut self) {
    self.node_count = 0;
    self.leaf_count = 0;
    self.forced_leaf_count = 0;
    self.element_count = 0;
    self.max_depth = 0;
  }

  /// Add one tree's shape to the totals.
  pub fn record_tree<T, D, C, B>(&mut self, tree: &Octree<T, D, C, B>) {
    if !is_enabled() {
      return;
    }
    self.node_count += tree.node_count();
    self.leaf_count += tree.leaf_count();
    self.forced_leaf_count += tree.forced_leaf_count();
    self.element_count += tree.total_elements();
    self.max_depth = self.max_depth.max(tree.max_depth_reached());
  }

  pub fn record_build_timing(&mut self, timing_us: u64, trees: u64) {
    if is_enabled() {
      self.build_timings.push(timing_us);
      self.last_build_us = timing_us;
      self.total_builds += trees;
    }
  }

  pub fn record_serialize_timing(&mut self, timing_us: u64) {
    if is_enabled() {
      self.serialize_timings.push(timing_us);
      self.last_serialize_us = timing_us;
    }
  }

  pub fn avg_build_timing_us(&self) -> f64 {
    self.build_timings.average()
  }

  pub fn avg_serialize_timing_us(&self) -> f64 {
    self.serialize_timings.average()
  }

  /// Share of leaves kept oversized by the degenerate-split rule.
  pub fn forced_leaf_ratio(&self) -> f64 {
    if self.leaf_count == 0 {
      0.0
    } else {
      self.forced_leaf_count as f64 / self.leaf_count as f64
    }
  }
}
