//! Viewport state: scroll offsets and visible size.

use super::AxisLayout;

/// Viewport state - represents the visible area of the grid
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Horizontal scroll position in grid coordinates
    pub scroll_left: f64,
    /// Vertical scroll position in grid coordinates
    pub scroll_top: f64,
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_left: 0.0,
            scroll_top: 0.0,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Visible row range (inclusive) based on current scroll position.
    pub fn visible_rows(&self, rows: &AxisLayout) -> Option<(u32, u32)> {
        visible_span(rows, self.scroll_top, self.height)
    }

    /// Visible column range (inclusive) based on current scroll position.
    pub fn visible_cols(&self, cols: &AxisLayout) -> Option<(u32, u32)> {
        visible_span(cols, self.scroll_left, self.width)
    }

    /// Clamp scroll position to valid range.
    pub fn clamp_scroll(&mut self, rows: &AxisLayout, cols: &AxisLayout) {
        let max_left = (cols.total() - self.width).max(0.0);
        let max_top = (rows.total() - self.height).max(0.0);
        self.scroll_left = self.scroll_left.clamp(0.0, max_left);
        self.scroll_top = self.scroll_top.clamp(0.0, max_top);
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, left: f64, top: f64, rows: &AxisLayout, cols: &AxisLayout) {
        self.scroll_left = left;
        self.scroll_top = top;
        self.clamp_scroll(rows, cols);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }
}

fn visible_span(axis: &AxisLayout, scroll: f64, extent: f64) -> Option<(u32, u32)> {
    let start = axis.index_at(scroll)?;
    let edge = scroll + extent;
    let mut end = axis.index_at(edge)?;
    // The far edge is exclusive: an index starting exactly on it is not visible.
    if end > start && axis.offset(end) >= edge {
        end -= 1;
    }
    Some((start, end))
}

/// New scroll offset that brings `[start, start + size)` fully into a window
/// of `extent` pixels currently scrolled to `scroll`, moving as little as
/// possible. Spans wider than the window align their leading edge.
pub(crate) fn scroll_to_reveal(scroll: f64, extent: f64, start: f64, size: f64) -> f64 {
    let end = start + size;
    if start < scroll || size > extent {
        start
    } else if end > scroll + extent {
        end - extent
    } else {
        scroll
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
    fn test_visible_rows_at_scroll_zero() {
        let rows = AxisLayout::new(100, 20.0);
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.visible_rows(&rows), Some((0, 29)));
    }

    #[test]
    fn test_clamp_scroll() {
        let rows = AxisLayout::new(100, 20.0);
        let cols = AxisLayout::new(5, 100.0);
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.set_scroll(10_000.0, 10_000.0, &rows, &cols);
        assert_eq!(viewport.scroll_top, 1400.0);
        assert_eq!(viewport.scroll_left, 0.0);
        viewport.set_scroll(-5.0, -5.0, &rows, &cols);
        assert_eq!(viewport.scroll_top, 0.0);
    }

    #[test]
    fn test_scroll_to_reveal_moves_minimally() {
        // Already visible
        assert_eq!(scroll_to_reveal(100.0, 300.0, 150.0, 50.0), 100.0);
        // Before the window: align leading edge
        assert_eq!(scroll_to_reveal(100.0, 300.0, 40.0, 50.0), 40.0);
        // Past the window: align trailing edge
        assert_eq!(scroll_to_reveal(100.0, 300.0, 380.0, 50.0), 130.0);
        // Wider than the window
        assert_eq!(scroll_to_reveal(0.0, 100.0, 500.0, 300.0), 500.0);
    }
}
