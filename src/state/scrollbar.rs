//! Synthetic scrollbar geometry and interaction.

use crate::view_state::LayoutMetrics;

/// Part of the scrollbar under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarHit {
    /// The draggable thumb.
    Thumb,
    /// The track outside the thumb.
    Track,
}

/// Scrollbar placement for one scroll position.
///
/// Only exists while the content is taller than the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarGeometry {
    /// Left edge of the track.
    pub x: f64,
    /// Track width.
    pub width: f64,
    /// Track height (the viewport height).
    pub track_height: f64,
    /// Top of the thumb.
    pub thumb_top: f64,
    /// Thumb height: `viewport_height^2 / total_height`, at least one row.
    pub thumb_height: f64,
    /// Scroll bound the thumb maps onto.
    pub max_scroll: f64,
}

impl ScrollbarGeometry {
    /// Geometry for `metrics` at `scroll_top`, or `None` when nothing scrolls.
    pub fn compute(metrics: &LayoutMetrics, scroll_top: f64) -> Option<Self> {
        if metrics.max_scroll <= 0.0 || metrics.scrollbar_width <= 0.0 {
            return None;
        }
        let track_height = metrics.viewport_height;
        let thumb_height = (track_height * track_height / metrics.total_height)
            .max(metrics.row_height)
            .min(track_height);
        let travel = track_height - thumb_height;
        let thumb_top = if travel > 0.0 {
            metrics.clamp_scroll(scroll_top) / metrics.max_scroll * travel
        } else {
            0.0
        };

        Some(Self {
            x: metrics.scrollbar_x(),
            width: metrics.scrollbar_width,
            track_height,
            thumb_top,
            thumb_height,
            max_scroll: metrics.max_scroll,
        })
    }

    /// What `(x, y)` lands on, if anything.
    pub fn hit(&self, x: f64, y: f64) -> Option<ScrollbarHit> {
        if x < self.x || x >= self.x + self.width || y < 0.0 || y >= self.track_height {
            return None;
        }
        if y >= self.thumb_top && y < self.thumb_top + self.thumb_height {
            Some(ScrollbarHit::Thumb)
        } else {
            Some(ScrollbarHit::Track)
        }
    }

    /// Scroll position after dragging the thumb by `delta_y` from `start_scroll`.
    pub fn scroll_for_drag(&self, start_scroll: f64, delta_y: f64) -> f64 {
        let travel = self.track_height - self.thumb_height;
        if travel <= 0.0 {
            return start_scroll;
        }
        (start_scroll + delta_y * self.max_scroll / travel).clamp(0.0, self.max_scroll)
    }

    /// Scroll position that centers the thumb on `y`.
    pub fn scroll_for_track_click(&self, y: f64) -> f64 {
        let travel = self.track_height - self.thumb_height;
        if travel <= 0.0 {
            return 0.0;
        }
        let top = y - self.thumb_height / 2.0;
        (top / travel * self.max_scroll).clamp(0.0, self.max_scroll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::{compute_layout, LayoutInputs};

    fn metrics(size: u64) -> LayoutMetrics {
        compute_layout(&LayoutInputs {
            viewport_width: 80.0,
            viewport_height: 20.0,
            source_size: size,
            ..LayoutInputs::default()
        })
        .unwrap()
    }

    #[test]
    fn no_scrollbar_when_content_fits() {
        assert!(ScrollbarGeometry::compute(&metrics(64), 0.0).is_none());
    }

    #[test]
    fn thumb_is_proportional() {
        // 80 rows in a 20-row viewport: thumb is 20 * 20 / 80 = 5.
        let geometry = ScrollbarGeometry::compute(&metrics(80 * 16), 0.0).unwrap();
        assert_eq!(geometry.thumb_height, 5.0);
        assert_eq!(geometry.thumb_top, 0.0);
        assert_eq!(geometry.x, 79.0);

        let bottom = ScrollbarGeometry::compute(&metrics(80 * 16), 60.0).unwrap();
        assert_eq!(bottom.thumb_top, 15.0);
    }

    #[test]
    fn thumb_has_minimum_height() {
        let geometry = ScrollbarGeometry::compute(&metrics(1 << 30), 0.0).unwrap();
        assert_eq!(geometry.thumb_height, 1.0);
    }

    #[test]
    fn hit_distinguishes_thumb_and_track() {
        let geometry = ScrollbarGeometry::compute(&metrics(80 * 16), 0.0).unwrap();
        assert_eq!(geometry.hit(79.0, 2.0), Some(ScrollbarHit::Thumb));
        assert_eq!(geometry.hit(79.5, 12.0), Some(ScrollbarHit::Track));
        assert_eq!(geometry.hit(78.0, 2.0), None);
        assert_eq!(geometry.hit(79.0, 20.0), None);
    }

    #[test]
    fn drag_maps_pixels_proportionally() {
        // Travel 15px maps onto 60 scroll: 1px of thumb = 4 scroll.
        let geometry = ScrollbarGeometry::compute(&metrics(80 * 16), 0.0).unwrap();
        assert_eq!(geometry.scroll_for_drag(0.0, 3.0), 12.0);
        assert_eq!(geometry.scroll_for_drag(10.0, -100.0), 0.0);
        assert_eq!(geometry.scroll_for_drag(0.0, 100.0), 60.0);
    }

    #[test]
    fn track_click_centers_thumb() {
        let geometry = ScrollbarGeometry::compute(&metrics(80 * 16), 0.0).unwrap();
        // Center at 10 puts the thumb top at 7.5 of 15 travel: halfway.
        assert_eq!(geometry.scroll_for_track_click(10.0), 30.0);
        assert_eq!(geometry.scroll_for_track_click(0.0), 0.0);
        assert_eq!(geometry.scroll_for_track_click(19.0), 60.0);
    }
}
