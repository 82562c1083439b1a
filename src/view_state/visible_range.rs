//! Visible, required and window byte ranges for a scroll position.

use super::layout::LayoutMetrics;
use crate::model::ByteRange;

/// Default rows loaded above and below the visible rows.
pub const DEFAULT_OVERSCAN_ROWS: u64 = 5;

/// Half-open span of rows `[first, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowSpan {
    /// First row (inclusive).
    pub first: u64,
    /// One past the last row.
    pub end: u64,
}

impl RowSpan {
    /// Number of rows.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.first)
    }

    /// Check if the span has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the row indices.
    pub fn rows(&self) -> std::ops::Range<u64> {
        self.first..self.end.max(self.first)
    }

    /// Bytes covered by the rows, clamped to the source.
    pub fn to_bytes(&self, metrics: &LayoutMetrics) -> ByteRange {
        ByteRange::clamped(
            self.first.saturating_mul(metrics.bytes_per_row),
            self.end.saturating_mul(metrics.bytes_per_row),
            metrics.source_size,
        )
    }
}

/// Rows intersecting the viewport at `scroll_top`.
///
/// `[floor((scroll - padding) / row_height), ceil((scroll - padding + height) / row_height))`,
/// bounded by the row count.
pub fn visible_rows(metrics: &LayoutMetrics, scroll_top: f64) -> RowSpan {
    let top = scroll_top - metrics.vertical_padding;
    let first = (top / metrics.row_height).floor().max(0.0) as u64;
    let end = ((top + metrics.viewport_height) / metrics.row_height).ceil().max(0.0) as u64;
    let end = end.min(metrics.row_count);
    RowSpan {
        first: first.min(end),
        end,
    }
}

/// Bytes strictly visible at `scroll_top`. Empty without geometry.
pub fn visible_range(metrics: Option<&LayoutMetrics>, scroll_top: f64) -> ByteRange {
    match metrics {
        Some(metrics) => visible_rows(metrics, scroll_top).to_bytes(metrics),
        None => ByteRange::EMPTY,
    }
}

/// Bytes that must be resident before `scroll_top` can be committed: the
/// visible rows padded by `overscan_rows` on each side.
pub fn required_range(
    metrics: Option<&LayoutMetrics>,
    scroll_top: f64,
    overscan_rows: u64,
) -> ByteRange {
    let Some(metrics) = metrics else {
        return ByteRange::EMPTY;
    };
    let visible = visible_rows(metrics, scroll_top);
    RowSpan {
        first: visible.first.saturating_sub(overscan_rows),
        end: visible
            .end
            .saturating_add(overscan_rows)
            .min(metrics.row_count),
    }
    .to_bytes(metrics)
}

/// Upper bound on the length of [`required_range`] at any scroll position.
///
/// A fractional scroll position can expose one partial row at each edge.
pub fn max_required_span(metrics: &LayoutMetrics, overscan_rows: u64) -> u64 {
    let visible = (metrics.viewport_height / metrics.row_height).ceil().max(0.0) as u64;
    let rows = visible
        .saturating_add(1)
        .saturating_add(overscan_rows.saturating_mul(2))
        .min(metrics.row_count);
    rows.saturating_mul(metrics.bytes_per_row)
        .min(metrics.source_size)
}

/// Grow `required` symmetrically to at least `window_size` bytes, shifted
/// back inside `[0, source_size]` when it runs off either end.
pub fn window_range(required: ByteRange, window_size: u64, source_size: u64) -> ByteRange {
    if required.len() >= window_size {
        return required;
    }
    let extra = window_size - required.len();
    let start = required.start.saturating_sub(extra / 2);
    let end = start.saturating_add(window_size).min(source_size);
    let start = end.saturating_sub(window_size).min(start);
    ByteRange::clamped(start, end, source_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::layout::{compute_layout, LayoutInputs};

    fn metrics(size: u64) -> LayoutMetrics {
        compute_layout(&LayoutInputs {
            viewport_width: 80.0,
            viewport_height: 24.0,
            source_size: size,
            ..LayoutInputs::default()
        })
        .unwrap()
    }

    #[test]
    fn visible_rows_at_top() {
        let span = visible_rows(&metrics(10_000), 0.0);
        assert_eq!(span, RowSpan { first: 0, end: 24 });
    }

    #[test]
    fn fractional_scroll_shows_partial_rows() {
        let span = visible_rows(&metrics(10_000), 2.5);
        assert_eq!(span, RowSpan { first: 2, end: 27 });
    }

    #[test]
    fn visible_rows_stop_at_row_count() {
        let span = visible_rows(&metrics(100), 0.0);
        assert_eq!(span, RowSpan { first: 0, end: 7 });
        assert_eq!(visible_range(Some(&metrics(100)), 0.0), ByteRange::new(0, 100));
    }

    #[test]
    fn required_range_adds_overscan() {
        let m = metrics(10_000);
        let required = required_range(Some(&m), 10.0, 5);
        assert_eq!(required, ByteRange::new(5 * 16, 39 * 16));
    }

    #[test]
    fn overscan_is_clamped_at_both_ends() {
        let m = metrics(1000);
        assert_eq!(required_range(Some(&m), 0.0, 5).start, 0);
        assert_eq!(required_range(Some(&m), m.max_scroll, 5).end, 1000);
    }

    #[test]
    fn no_geometry_means_empty_ranges() {
        assert_eq!(visible_range(None, 50.0), ByteRange::EMPTY);
        assert_eq!(required_range(None, 50.0, 5), ByteRange::EMPTY);
    }

    #[test]
    fn window_grows_around_required() {
        let window = window_range(ByteRange::new(1000, 1100), 300, 10_000);
        assert_eq!(window, ByteRange::new(900, 1200));
    }

    #[test]
    fn window_shifts_inside_source() {
        assert_eq!(
            window_range(ByteRange::new(0, 100), 300, 10_000),
            ByteRange::new(0, 300)
        );
        assert_eq!(
            window_range(ByteRange::new(9_950, 10_000), 300, 10_000),
            ByteRange::new(9_700, 10_000)
        );
        assert_eq!(
            window_range(ByteRange::new(0, 50), 300, 120),
            ByteRange::new(0, 120)
        );
    }

    #[test]
    fn large_required_is_kept() {
        let required = ByteRange::new(0, 5000);
        assert_eq!(window_range(required, 300, 10_000), required);
    }
}
