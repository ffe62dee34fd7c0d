//! Maps the logical grid (up to ~10^6 rows x `ZZZ` columns) onto the small
//! visible window.
//!
//! Small sheets render every row: the bookkeeping of windowing costs more
//! than it saves there. Once the navigable row count reaches
//! `virtualize_threshold_rows` only the rows intersecting the viewport (plus
//! overscan) are reported, with spacer heights before and after them.

use serde::Serialize;

use super::viewport::scroll_to_reveal;
use super::{AxisLayout, Viewport};
use crate::cell_ref::MAX_COLUMNS;
use crate::settings::EditorSettings;
use crate::store::Bounds;
use crate::types::GridExtent;

/// How the grid body is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderMode {
    /// Every row is rendered.
    Full,
    /// Only rows near the viewport are rendered.
    Windowed,
}

/// Rows to render, half-open, with spacer sizes for the skipped rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRange {
    pub start: u32,
    pub end: u32,
    pub padding_before: f64,
    pub padding_after: f64,
}

impl VirtualRange {
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Viewport virtualizer for one active sheet.
#[derive(Debug, Clone)]
pub struct ViewportVirtualizer {
    rows: AxisLayout,
    cols: AxisLayout,
    viewport: Viewport,
    extent: GridExtent,
    threshold_rows: u32,
    overscan_rows: u32,
    row_padding: u32,
    col_padding: u32,
}

impl ViewportVirtualizer {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            rows: AxisLayout::new(0, settings.default_row_height),
            cols: AxisLayout::new(0, settings.default_col_width),
            viewport: Viewport::new(settings.viewport_width, settings.viewport_height),
            extent: GridExtent::default(),
            threshold_rows: settings.virtualize_threshold_rows,
            overscan_rows: settings.overscan_rows,
            row_padding: settings.row_padding,
            col_padding: settings.col_padding,
        }
    }

    /// Navigable extent for the given data bounds: padding past the data,
    /// columns capped at `ZZZ`.
    pub fn extent_for(&self, bounds: Bounds) -> GridExtent {
        GridExtent {
            row_count: bounds.rows.saturating_add(self.row_padding),
            col_count: bounds
                .cols
                .saturating_add(self.col_padding)
                .min(MAX_COLUMNS),
        }
    }

    /// Resize the axes to the new bounds. Returns the navigable extent.
    pub fn update_extent(&mut self, bounds: Bounds) -> GridExtent {
        let extent = self.extent_for(bounds);
        if extent != self.extent {
            self.rows.set_count(extent.row_count);
            self.cols.set_count(extent.col_count);
            self.extent = extent;
            self.viewport.clamp_scroll(&self.rows, &self.cols);
        }
        extent
    }

    /// Forget measurements and scroll back to the origin (sheet switch).
    pub fn reset(&mut self, bounds: Bounds) -> GridExtent {
        self.rows = AxisLayout::new(0, self.rows.default_size());
        self.cols = AxisLayout::new(0, self.cols.default_size());
        self.extent = GridExtent::default();
        self.viewport.scroll_left = 0.0;
        self.viewport.scroll_top = 0.0;
        self.update_extent(bounds)
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn mode(&self) -> RenderMode {
        if self.extent.row_count >= self.threshold_rows {
            RenderMode::Windowed
        } else {
            RenderMode::Full
        }
    }

    /// Rows to render for the current scroll position.
    pub fn visible_rows(&self) -> VirtualRange {
        let count = self.extent.row_count;
        if self.mode() == RenderMode::Full {
            return VirtualRange {
                start: 0,
                end: count,
                padding_before: 0.0,
                padding_after: 0.0,
            };
        }
        let Some((first, last)) = self.viewport.visible_rows(&self.rows) else {
            return VirtualRange {
                start: 0,
                end: 0,
                padding_before: 0.0,
                padding_after: 0.0,
            };
        };
        let start = first.saturating_sub(self.overscan_rows);
        let end = last
            .saturating_add(self.overscan_rows)
            .saturating_add(1)
            .min(count);
        VirtualRange {
            start,
            end,
            padding_before: self.rows.offset(start),
            padding_after: self.rows.total() - self.rows.offset(end),
        }
    }

    /// Columns intersecting the viewport (inclusive).
    pub fn visible_cols(&self) -> Option<(u32, u32)> {
        self.viewport.visible_cols(&self.cols)
    }

    /// Scrollable height for scrollbar sizing.
    pub fn total_height(&self) -> f64 {
        self.rows.total()
    }

    /// Scrollable width for scrollbar sizing.
    pub fn total_width(&self) -> f64 {
        self.cols.total()
    }

    pub fn row_offset(&self, row: u32) -> f64 {
        self.rows.offset(row)
    }

    pub fn col_offset(&self, col: u32) -> f64 {
        self.cols.offset(col)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.viewport.clamp_scroll(&self.rows, &self.cols);
    }

    /// Host-driven scroll (scroll events from the grid container).
    pub fn set_scroll(&mut self, left: f64, top: f64) {
        self.viewport.set_scroll(left, top, &self.rows, &self.cols);
    }

    pub fn measure_row(&mut self, row: u32, height: f64) -> bool {
        let moved = self.rows.measure(row, height);
        if moved {
            self.viewport.clamp_scroll(&self.rows, &self.cols);
        }
        moved
    }

    pub fn measure_col(&mut self, col: u32, width: f64) -> bool {
        let moved = self.cols.measure(col, width);
        if moved {
            self.viewport.clamp_scroll(&self.rows, &self.cols);
        }
        moved
    }

    /// Scroll vertically just enough to show `row`. Returns true if the
    /// offset changed; rows outside the extent are ignored.
    pub fn scroll_to_index(&mut self, row: u32) -> bool {
        if row >= self.extent.row_count {
            log::debug!("scroll_to_index({row}) outside {} rows", self.extent.row_count);
            return false;
        }
        let target = scroll_to_reveal(
            self.viewport.scroll_top,
            self.viewport.height,
            self.rows.offset(row),
            self.rows.size(row),
        );
        let before = self.viewport.scroll_top;
        self.viewport
            .set_scroll(self.viewport.scroll_left, target, &self.rows, &self.cols);
        (self.viewport.scroll_top - before).abs() > f64::EPSILON
    }

    /// Scroll horizontally just enough to show `col`.
    pub fn scroll_col_into_view(&mut self, col: u32) -> bool {
        if col >= self.extent.col_count {
            log::debug!("scroll_col_into_view({col}) outside {} cols", self.extent.col_count);
            return false;
        }
        self.scroll_span_into_view(self.cols.offset(col), self.cols.size(col))
    }

    /// Scroll horizontally to show a measured element spanning
    /// `[left, left + width)` in content coordinates. Clamped, not centered.
    pub fn scroll_span_into_view(&mut self, left: f64, width: f64) -> bool {
        let target = scroll_to_reveal(self.viewport.scroll_left, self.viewport.width, left, width);
        let before = self.viewport.scroll_left;
        self.viewport
            .set_scroll(target, self.viewport.scroll_top, &self.rows, &self.cols);
        (self.viewport.scroll_left - before).abs() > f64::EPSILON
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

    fn settings() -> EditorSettings {
        EditorSettings {
            virtualize_threshold_rows: 1000,
            row_padding: 10,
            col_padding: 5,
            default_row_height: 20.0,
            default_col_width: 100.0,
            overscan_rows: 2,
            viewport_width: 500.0,
            viewport_height: 200.0,
            ..EditorSettings::default()
        }
    }

    #[test]
    fn test_extent_adds_padding_and_caps_columns() {
        let v = ViewportVirtualizer::new(&settings());
        let extent = v.extent_for(Bounds { rows: 3, cols: 4 });
        assert_eq!(extent, GridExtent { row_count: 13, col_count: 9 });
        let capped = v.extent_for(Bounds { rows: 0, cols: MAX_COLUMNS - 1 });
        assert_eq!(capped.col_count, MAX_COLUMNS);
    }

    #[test]
    fn test_small_sheet_renders_everything() {
        let mut v = ViewportVirtualizer::new(&settings());
        v.update_extent(Bounds { rows: 40, cols: 2 });
        assert_eq!(v.mode(), RenderMode::Full);
        let range = v.visible_rows();
        assert_eq!((range.start, range.end), (0, 50));
        assert_eq!(range.padding_before, 0.0);
    }

    #[test]
    fn test_large_sheet_windows_rows() {
        let mut v = ViewportVirtualizer::new(&settings());
        v.update_extent(Bounds { rows: 1_000_000, cols: 2 });
        assert_eq!(v.mode(), RenderMode::Windowed);
        assert_eq!(v.total_height(), 20.0 * 1_000_010.0);

        v.set_scroll(0.0, 2000.0);
        let range = v.visible_rows();
        // rows 100..=109 visible, 2 rows overscan each side
        assert_eq!((range.start, range.end), (98, 112));
        assert_eq!(range.padding_before, 98.0 * 20.0);
        assert_eq!(
            range.padding_before + f64::from(range.len()) * 20.0 + range.padding_after,
            v.total_height()
        );
    }

    #[test]
    fn test_scroll_to_index_is_minimal() {
        let mut v = ViewportVirtualizer::new(&settings());
        v.update_extent(Bounds { rows: 100, cols: 2 });
        assert!(!v.scroll_to_index(5));
        assert!(v.scroll_to_index(20));
        // row 20 spans 400..420, viewport 200 tall: bottom-aligned
        assert_eq!(v.viewport().scroll_top, 220.0);
        assert!(v.scroll_to_index(3));
        assert_eq!(v.viewport().scroll_top, 60.0);
        assert!(!v.scroll_to_index(5_000));
    }

    #[test]
    fn test_horizontal_scroll_into_view_clamps() {
        let mut v = ViewportVirtualizer::new(&settings());
        v.update_extent(Bounds { rows: 1, cols: 5 });
        // 10 columns of 100px, 500px viewport: max scroll 500
        assert!(v.scroll_col_into_view(7));
        assert_eq!(v.viewport().scroll_left, 300.0);
        assert!(v.scroll_span_into_view(2_000.0, 100.0));
        assert_eq!(v.viewport().scroll_left, 500.0);
        assert!(v.scroll_col_into_view(0));
        assert_eq!(v.viewport().scroll_left, 0.0);
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let mut v = ViewportVirtualizer::new(&settings());
        v.update_extent(Bounds { rows: 100, cols: 2 });
        v.set_scroll(0.0, 500.0);
        v.measure_row(0, 60.0);
        v.reset(Bounds { rows: 100, cols: 2 });
        assert_eq!(v.viewport().scroll_top, 0.0);
        assert_eq!(v.row_offset(1), 20.0);
    }
}
