//! Layout engine mapping the logical grid onto the visible window.
//!
//! This module handles:
//! - Per-row/per-column size estimates and running offsets
//! - Viewport state (scroll position, visible range)
//! - Binary search for the indices intersecting the viewport
//! - The full-render vs. windowed-render policy

mod axis;
mod viewport;
mod virtualizer;

pub use axis::AxisLayout;
pub use viewport::Viewport;
pub use virtualizer::{RenderMode, ViewportVirtualizer, VirtualRange};
