//! Byte-grid drawing contract.
//!
//! The engine never paints. Each tick it hands a [`Renderer`] an immutable
//! [`RenderFrame`]: geometry, the rows to draw with their bytes, and the
//! overlays (selection, hover, highlight, scrollbar). Any surface that can
//! draw a grid of cells implements [`Renderer`].

mod driver;

pub use driver::{FrameOutcome, FrameOverlay, RenderDriver};

use crate::model::{is_offset_in_range, ByteRange, SelectionRange};
use crate::state::ScrollbarGeometry;
use crate::view_state::LayoutMetrics;
use std::sync::Arc;

/// Surface that draws frames.
pub trait Renderer {
    /// Error raised by the surface.
    type Error;

    /// Draw `frame`. Called at most once per tick.
    fn paint(&mut self, frame: &RenderFrame) -> Result<(), Self::Error>;
}

/// One grid row ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    /// Row index in the file.
    pub index: u64,
    /// Offset of the first byte.
    pub offset: u64,
    /// Top edge in viewport coordinates.
    pub y: f64,
    /// Row bytes; shorter than `bytes_per_row` only on the last row.
    pub bytes: Arc<[u8]>,
}

/// Snapshot handed to the [`Renderer`].
///
/// Rows are only ever taken from fully loaded data. While the bytes for the
/// committed position are missing the previous frame's rows are reused and
/// `stale` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Geometry the rows were laid out with.
    pub metrics: LayoutMetrics,
    /// Scroll position the rows were laid out at.
    pub scroll_top: f64,
    /// Bytes the rows cover.
    pub visible: ByteRange,
    /// Rows to draw, top to bottom.
    pub rows: Vec<FrameRow>,
    /// Current selection.
    pub selection: Option<SelectionRange>,
    /// Byte under the mouse.
    pub hover: Option<u64>,
    /// Byte carrying the navigation highlight.
    pub highlight: Option<u64>,
    /// Scrollbar, when the content scrolls.
    pub scrollbar: Option<ScrollbarGeometry>,
    /// A load is in flight.
    pub loading: bool,
    /// Message of the last load failure.
    pub error: Option<String>,
    /// Rows are from an earlier frame.
    pub stale: bool,
    /// Total bytes in the source.
    pub source_size: u64,
}

impl RenderFrame {
    /// Check if `offset` is inside the selection.
    pub fn is_selected(&self, offset: u64) -> bool {
        is_offset_in_range(offset, self.selection)
    }

    /// Check if `offset` is hovered.
    pub fn is_hovered(&self, offset: u64) -> bool {
        self.hover == Some(offset)
    }

    /// Check if `offset` carries the highlight.
    pub fn is_highlighted(&self, offset: u64) -> bool {
        self.highlight == Some(offset)
    }
}

/// Character shown in the ASCII column for `byte`.
///
/// Printable ASCII maps to itself, everything else to `.`.
pub fn glyph_for(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    }
}

/// Zero-padded upper-case hex address.
pub fn format_address(offset: u64, digits: usize) -> String {
    format!("{offset:0digits$X}")
}
