//! Per-frame render driver.

use super::{FrameRow, RenderFrame, Renderer};
use crate::model::{ByteRange, SelectionRange};
use crate::state::ScrollbarGeometry;
use crate::view_state::{visible_rows, LayoutMetrics, RowSpan, ViewportController};
use std::sync::Arc;
use tracing::trace;

/// Input-layer state drawn on top of the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOverlay {
    /// Current selection.
    pub selection: Option<SelectionRange>,
    /// Byte under the mouse.
    pub hover: Option<u64>,
    /// Byte carrying the navigation highlight.
    pub highlight: Option<u64>,
}

/// What a call to [`RenderDriver::draw`] painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame built from the committed position's bytes.
    Painted,
    /// The previous frame's rows with current overlays; bytes are still loading.
    Stale,
    /// No geometry yet, nothing painted.
    Skipped,
}

/// Builds frames from the viewport and hands them to a [`Renderer`].
///
/// Remembers the last frame so that, while the loaded window does not
/// cover the committed position, the renderer keeps showing good rows
/// instead of partial ones.
#[derive(Debug, Default)]
pub struct RenderDriver {
    last_frame: Option<Arc<RenderFrame>>,
}

impl RenderDriver {
    /// Create a driver with no previous frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent frame handed to the renderer.
    pub fn last_frame(&self) -> Option<&Arc<RenderFrame>> {
        self.last_frame.as_ref()
    }

    /// Forget the previous frame (new source).
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    /// Build the next frame and paint it.
    pub fn draw<R: Renderer>(
        &mut self,
        viewport: &mut ViewportController,
        metrics: Option<&LayoutMetrics>,
        overlay: FrameOverlay,
        renderer: &mut R,
    ) -> Result<FrameOutcome, R::Error> {
        let Some((frame, outcome)) = self.prepare(viewport, metrics, overlay) else {
            return Ok(FrameOutcome::Skipped);
        };
        renderer.paint(&frame)?;
        Ok(outcome)
    }

    /// Build the next frame without painting it.
    ///
    /// Returns `None` without geometry.
    pub fn prepare(
        &mut self,
        viewport: &mut ViewportController,
        metrics: Option<&LayoutMetrics>,
        overlay: FrameOverlay,
    ) -> Option<(Arc<RenderFrame>, FrameOutcome)> {
        let metrics = metrics?;
        let scroll_top = viewport.scroll_top();
        let span = visible_rows(metrics, scroll_top);
        let visible = span.to_bytes(metrics);

        let scrollbar = ScrollbarGeometry::compute(metrics, viewport.scroll().target());
        let loading = viewport.is_loading();
        let error = viewport.last_error().map(|e| e.to_string());

        let rows = if visible.is_empty() {
            Some(Vec::new())
        } else {
            collect_rows(viewport, metrics, span, scroll_top)
        };

        let (frame, outcome) = match rows {
            Some(rows) => (
                RenderFrame {
                    metrics: *metrics,
                    scroll_top,
                    visible,
                    rows,
                    selection: overlay.selection,
                    hover: overlay.hover,
                    highlight: overlay.highlight,
                    scrollbar,
                    loading,
                    error,
                    stale: false,
                    source_size: metrics.source_size,
                },
                FrameOutcome::Painted,
            ),
            None => {
                trace!(
                    start = visible.start,
                    end = visible.end,
                    "Window does not cover visible rows, repainting last frame"
                );
                let frame = match self.last_frame.as_deref() {
                    Some(last) => RenderFrame {
                        selection: overlay.selection,
                        hover: overlay.hover,
                        highlight: overlay.highlight,
                        scrollbar,
                        loading,
                        error,
                        stale: true,
                        ..last.clone()
                    },
                    None => RenderFrame {
                        metrics: *metrics,
                        scroll_top,
                        visible: ByteRange::EMPTY,
                        rows: Vec::new(),
                        selection: overlay.selection,
                        hover: overlay.hover,
                        highlight: overlay.highlight,
                        scrollbar,
                        loading,
                        error,
                        stale: true,
                        source_size: metrics.source_size,
                    },
                };
                (frame, FrameOutcome::Stale)
            }
        };

        let frame = Arc::new(frame);
        self.last_frame = Some(Arc::clone(&frame));
        Some((frame, outcome))
    }
}

/// Rows of `span`, or `None` if any row's bytes are not loaded.
fn collect_rows(
    viewport: &mut ViewportController,
    metrics: &LayoutMetrics,
    span: RowSpan,
    scroll_top: f64,
) -> Option<Vec<FrameRow>> {
    let window = viewport.window().cloned()?;
    if !window.covers(&span.to_bytes(metrics)) {
        return None;
    }

    let mut rows = Vec::with_capacity(span.len() as usize);
    for index in span.rows() {
        let range = RowSpan {
            first: index,
            end: index + 1,
        }
        .to_bytes(metrics);
        if range.is_empty() {
            break;
        }
        let cached = viewport.cache_mut().row_bytes(index, metrics.bytes_per_row);
        let bytes = if cached.len() as u64 == range.len() {
            cached
        } else {
            Arc::from(window.slice(&range)?)
        };
        rows.push(FrameRow {
            index,
            offset: range.start,
            y: metrics.row_top(index) - scroll_top,
            bytes,
        });
    }
    Some(rows)
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
