//! View-state layer - geometry, scrolling and load orchestration.
//!
//! # Module Structure
//!
//! - `layout`: LayoutEngine / LayoutMetrics - grid geometry from viewport and font
//! - `hit_test`: offset_from_position / position_of - pixel <-> byte mapping
//! - `scroll`: ScrollState - committed and pending scroll position
//! - `visible_range`: visible, required and window byte ranges
//! - `viewport`: ViewportController - at-most-one in-flight load per move

pub mod layout;
pub mod scroll;
pub mod viewport;
pub mod visible_range;

pub use hit_test::{hit_cell, offset_from_position, position_of, CellArea, CellHit};
pub use layout::{compute_layout, FontMetrics, GridStyle, LayoutEngine, LayoutInputs, LayoutMetrics};
pub use scroll::ScrollState;
pub use viewport::{LoadPoll, LoadedWindow, ViewportController, ViewportOptions, DEFAULT_WINDOW_SIZE};
pub use visible_range::{
    max_required_span, required_range, visible_range, visible_rows, window_range, RowSpan,
    DEFAULT_OVERSCAN_ROWS,
};
