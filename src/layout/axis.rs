//! Size estimates and running offsets along one grid axis.
//!
//! Every index starts at the default size estimate; measured sizes override
//! it and survive the axis shrinking and growing again. Offsets come from a
//! Fenwick tree over the sizes, so a measurement and an offset or position
//! lookup each cost O(log n) even on a million-row axis.

use std::collections::HashMap;

/// Sizes and running offsets for the rows (or columns) of a sheet.
#[derive(Debug, Clone)]
pub struct AxisLayout {
    default_size: f64,
    /// Measured sizes by index.
    measured: HashMap<u32, f64>,
    /// Current size of each index.
    sizes: Vec<f64>,
    /// `tree[i]` sums the `lowbit(i + 1)` sizes ending at index `i`.
    tree: Vec<f64>,
}

fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

impl AxisLayout {
    pub fn new(count: u32, default_size: f64) -> Self {
        let mut layout = Self {
            default_size: default_size.max(1.0),
            measured: HashMap::new(),
            sizes: Vec::new(),
            tree: Vec::new(),
        };
        layout.set_count(count);
        layout
    }

    pub fn count(&self) -> u32 {
        u32::try_from(self.sizes.len()).unwrap_or(u32::MAX)
    }

    pub fn default_size(&self) -> f64 {
        self.default_size
    }

    /// Grow or shrink the axis to `count` entries.
    pub fn set_count(&mut self, count: u32) {
        let target = count as usize;
        if target < self.sizes.len() {
            // nodes below the cut only cover indices below it
            self.sizes.truncate(target);
            self.tree.truncate(target);
            return;
        }
        for index in self.count()..count {
            let size = self
                .measured
                .get(&index)
                .copied()
                .unwrap_or(self.default_size);
            self.push(size);
        }
    }

    fn push(&mut self, size: f64) {
        let n = self.sizes.len();
        let p = n + 1;
        let node = size + self.prefix(n) - self.prefix(p - lowbit(p));
        self.sizes.push(size);
        self.tree.push(node);
    }

    /// Sum of the first `n` sizes.
    fn prefix(&self, n: usize) -> f64 {
        let mut i = n.min(self.tree.len());
        let mut sum = 0.0;
        while i > 0 {
            sum += self.tree.get(i - 1).copied().unwrap_or(0.0);
            i &= i - 1;
        }
        sum
    }

    fn add(&mut self, index: usize, delta: f64) {
        let mut i = index + 1;
        while let Some(node) = self.tree.get_mut(i - 1) {
            *node += delta;
            i += lowbit(i);
        }
    }

    /// Record a measured size. Returns true when any offset moved.
    pub fn measure(&mut self, index: u32, size: f64) -> bool {
        let size = size.max(0.0);
        self.measured.insert(index, size);
        let idx = index as usize;
        let Some(slot) = self.sizes.get_mut(idx) else {
            return false;
        };
        let delta = size - *slot;
        if delta.abs() < f64::EPSILON {
            return false;
        }
        *slot = size;
        self.add(idx, delta);
        true
    }

    /// Start offset of an index; indices past the end report the end edge.
    pub fn offset(&self, index: u32) -> f64 {
        self.prefix(index as usize)
    }

    pub fn size(&self, index: u32) -> f64 {
        self.sizes
            .get(index as usize)
            .copied()
            .unwrap_or(self.default_size)
    }

    /// Total scrollable extent.
    pub fn total(&self) -> f64 {
        self.prefix(self.sizes.len())
    }

    /// Index containing the given offset. Offsets past the end clamp to the
    /// last index; an empty axis has none.
    pub fn index_at(&self, offset: f64) -> Option<u32> {
        let len = self.tree.len();
        let last = len.checked_sub(1)?;
        // largest `pos` whose prefix sum is <= offset
        let mut pos = 0usize;
        let mut remaining = offset;
        let mut step = 1usize << len.ilog2();
        while step > 0 {
            let next = pos + step;
            if let Some(&node) = self.tree.get(next - 1) {
                if node <= remaining {
                    pos = next;
                    remaining -= node;
                }
            }
            step >>= 1;
        }
        u32::try_from(pos.min(last)).ok()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        let layout = AxisLayout::new(10, 20.0);
        assert_eq!(layout.count(), 10);
        assert_eq!(layout.total(), 200.0);
        assert_eq!(layout.offset(3), 60.0);
        assert_eq!(layout.offset(50), 200.0);
    }

    #[test]
    fn test_index_at() {
        let layout = AxisLayout::new(10, 20.0);
        assert_eq!(layout.index_at(0.0), Some(0));
        assert_eq!(layout.index_at(10.0), Some(0));
        assert_eq!(layout.index_at(20.0), Some(1));
        assert_eq!(layout.index_at(50.0), Some(2));
        assert_eq!(layout.index_at(10_000.0), Some(9));
        assert_eq!(AxisLayout::new(0, 20.0).index_at(0.0), None);
    }

    #[test]
    fn test_measure_shifts_following_offsets() {
        let mut layout = AxisLayout::new(5, 20.0);
        assert!(layout.measure(1, 50.0));
        assert_eq!(layout.offset(1), 20.0);
        assert_eq!(layout.offset(2), 70.0);
        assert_eq!(layout.total(), 130.0);
        assert!(!layout.measure(1, 50.0));
    }

    #[test]
    fn test_measure_matches_running_sum() {
        let mut layout = AxisLayout::new(1_000, 20.0);
        let mut sizes = vec![20.0; 1_000];
        for (i, size) in [(0u32, 35.0), (999, 5.0), (500, 0.0), (17, 64.0), (500, 21.0)] {
            layout.measure(i, size);
            sizes[i as usize] = size;
        }
        let mut edge = 0.0;
        for (i, size) in sizes.iter().enumerate() {
            let i = u32::try_from(i).unwrap();
            assert_eq!(layout.offset(i), edge);
            assert_eq!(layout.index_at(edge + size / 2.0), Some(i));
            edge += size;
        }
        assert_eq!(layout.total(), edge);
    }

    #[test]
    fn test_measurement_survives_shrink_and_grow() {
        let mut layout = AxisLayout::new(5, 20.0);
        layout.measure(4, 40.0);
        layout.set_count(2);
        assert_eq!(layout.total(), 40.0);
        layout.set_count(5);
        assert_eq!(layout.size(4), 40.0);
        assert_eq!(layout.total(), 120.0);
    }
}
