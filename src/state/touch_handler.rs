//! Touch gestures: tap, vertical scroll with momentum, drag-select.
//!
//! A touch starts undecided. Its first significant movement classifies it
//! once, as a vertical scroll (`|dy| > |dx|` and `|dy| > TAP_SLOP`) or
//! otherwise a drag-selection; it never reclassifies. A release without
//! significant movement inside [`TAP_TIMEOUT`] is a tap.

use super::input::{Effect, Gesture, InputContext, InputState, PointerEventData, Transition};
use crate::model::SelectionRange;
use crate::view_state::{offset_from_position, LayoutMetrics};
use std::time::{Duration, Instant};

/// Movement in pixels below which a touch is still a tap.
pub const TAP_SLOP: f64 = 5.0;
/// Longest touch that still counts as a tap.
pub const TAP_TIMEOUT: Duration = Duration::from_millis(300);
/// Scroll samples kept for release velocity.
pub const VELOCITY_SAMPLES: usize = 5;

/// Recent `(time, scroll position)` samples of a scroll gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityTracker {
    samples: [Option<(Instant, f64)>; VELOCITY_SAMPLES],
    len: usize,
}

impl VelocityTracker {
    /// Record a sample, dropping the oldest beyond [`VELOCITY_SAMPLES`].
    pub fn push(&mut self, at: Instant, scroll: f64) {
        if self.len == VELOCITY_SAMPLES {
            self.samples.rotate_left(1);
            self.len -= 1;
        }
        self.samples[self.len] = Some((at, scroll));
        self.len += 1;
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Weighted average velocity in px/ms, later intervals weighted higher.
    ///
    /// Intervals with no elapsed time are skipped; 0 without two samples.
    pub fn velocity(&self) -> f64 {
        let samples: Vec<(Instant, f64)> = self.samples[..self.len].iter().flatten().copied().collect();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (i, pair) in samples.windows(2).enumerate() {
            let (t0, s0) = pair[0];
            let (t1, s1) = pair[1];
            let dt = t1.saturating_duration_since(t0).as_secs_f64() * 1000.0;
            if dt <= 0.0 {
                continue;
            }
            let weight = (i + 1) as f64;
            weighted += (s1 - s0) / dt * weight;
            total_weight += weight;
        }
        if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        }
    }
}

/// Touch gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchGesture {
    /// Finger down, not yet classified.
    Undecided {
        /// Touch-down x.
        start_x: f64,
        /// Touch-down y.
        start_y: f64,
        /// Touch-down time.
        started_at: Instant,
        /// Byte under the touch-down point.
        offset: Option<u64>,
        /// Scroll target at touch-down.
        start_scroll: f64,
    },
    /// Vertical scroll following the finger.
    Scrolling {
        /// Touch-down y.
        start_y: f64,
        /// Scroll target at touch-down.
        start_scroll: f64,
        /// Samples for the release velocity.
        tracker: VelocityTracker,
    },
    /// Drag-selecting from `anchor`.
    Selecting {
        /// Byte under the touch-down point.
        anchor: u64,
    },
    /// Classified as a selection drag that began outside any byte.
    Ignored,
}

/// Finger down: remember where, classify later.
pub fn touch_down(
    mut state: InputState,
    event: &PointerEventData,
    ctx: &InputContext<'_>,
    metrics: &LayoutMetrics,
) -> Transition {
    state.gesture = Gesture::Touch(TouchGesture::Undecided {
        start_x: event.x,
        start_y: event.y,
        started_at: event.timestamp,
        offset: offset_from_position(metrics, event.x, event.y, ctx.scroll_top),
        start_scroll: ctx.scroll_target,
    });
    Transition::unchanged(state)
}

/// Finger moved.
pub fn touch_move(
    mut state: InputState,
    gesture: TouchGesture,
    event: &PointerEventData,
    ctx: &InputContext<'_>,
    metrics: &LayoutMetrics,
) -> Transition {
    match gesture {
        TouchGesture::Undecided {
            start_x,
            start_y,
            started_at,
            offset,
            start_scroll,
        } => {
            let dx = event.x - start_x;
            let dy = event.y - start_y;
            if dy.abs() > dx.abs() && dy.abs() > TAP_SLOP {
                let mut tracker = VelocityTracker::default();
                tracker.push(started_at, start_scroll);
                let target = ctx.clamp_scroll(start_scroll - dy);
                tracker.push(event.timestamp, target);
                state.gesture = Gesture::Touch(TouchGesture::Scrolling {
                    start_y,
                    start_scroll,
                    tracker,
                });
                Transition::with(state, vec![Effect::ScrollTo(target)])
            } else if dx.abs().max(dy.abs()) > TAP_SLOP {
                match offset {
                    Some(anchor) => {
                        state.gesture = Gesture::Touch(TouchGesture::Selecting { anchor });
                        extend_selection(state, anchor, event, ctx, metrics)
                    }
                    None => {
                        state.gesture = Gesture::Touch(TouchGesture::Ignored);
                        Transition::unchanged(state)
                    }
                }
            } else {
                Transition::unchanged(state)
            }
        }
        TouchGesture::Scrolling {
            start_y,
            start_scroll,
            mut tracker,
        } => {
            let target = ctx.clamp_scroll(start_scroll - (event.y - start_y));
            tracker.push(event.timestamp, target);
            state.gesture = Gesture::Touch(TouchGesture::Scrolling {
                start_y,
                start_scroll,
                tracker,
            });
            Transition::with(state, vec![Effect::ScrollTo(target)])
        }
        TouchGesture::Selecting { anchor } => extend_selection(state, anchor, event, ctx, metrics),
        TouchGesture::Ignored => Transition::unchanged(state),
    }
}

/// Finger lifted.
pub fn touch_up(mut state: InputState, gesture: TouchGesture, event: &PointerEventData) -> Transition {
    state.gesture = Gesture::Idle;
    match gesture {
        TouchGesture::Undecided {
            start_x,
            start_y,
            started_at,
            offset,
            ..
        } => {
            let still = (event.x - start_x).abs() < TAP_SLOP && (event.y - start_y).abs() < TAP_SLOP;
            let quick = event.timestamp.saturating_duration_since(started_at) < TAP_TIMEOUT;
            match offset {
                Some(offset) if still && quick => tap(state, offset),
                _ => Transition::unchanged(state),
            }
        }
        TouchGesture::Scrolling { tracker, .. } => {
            state.inertia.start(tracker.velocity(), event.timestamp);
            Transition::unchanged(state)
        }
        TouchGesture::Selecting { .. } | TouchGesture::Ignored => Transition::unchanged(state),
    }
}

/// Tap selects a byte, or deselects the current single-byte selection.
fn tap(mut state: InputState, offset: u64) -> Transition {
    let selection = match state.selection {
        Some(current) if current.is_single() && current.start == offset => None,
        _ => Some(SelectionRange::single(offset)),
    };
    state.selection = selection;
    Transition::with(state, vec![Effect::SelectionChanged(selection)])
}

fn extend_selection(
    mut state: InputState,
    anchor: u64,
    event: &PointerEventData,
    ctx: &InputContext<'_>,
    metrics: &LayoutMetrics,
) -> Transition {
    let cursor = offset_from_position(metrics, event.x, event.y, ctx.scroll_top).unwrap_or(
        state
            .selection
            .filter(|s| s.start == anchor)
            .map_or(anchor, |s| s.end),
    );
    let selection = Some(SelectionRange::new(anchor, cursor));
    if selection == state.selection {
        return Transition::unchanged(state);
    }
    state.selection = selection;
    Transition::with(state, vec![Effect::SelectionChanged(selection)])
}
