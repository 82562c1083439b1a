//! Momentum scrolling after a touch fling.

use std::time::Instant;

/// Minimum release speed (px/ms) that starts momentum.
pub const START_VELOCITY: f64 = 0.5;
/// Speed (px/ms) below which momentum stops.
pub const STOP_VELOCITY: f64 = 0.1;
/// Velocity retained per 60 Hz frame.
pub const FRICTION: f64 = 0.95;
/// Length of one 60 Hz frame in milliseconds.
pub const FRAME_MS: f64 = 16.67;

/// Ephemeral momentum state.
///
/// Reset by any new gesture, wheel or scrollbar interaction, and when the
/// scroll position runs into a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InertiaState {
    velocity: f64,
    active: bool,
    last_frame: Option<Instant>,
}

impl InertiaState {
    /// Current velocity in px/ms (positive scrolls toward the end).
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Check if momentum is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start momentum at `velocity` if it is fast enough.
    ///
    /// Returns `true` when momentum started.
    pub fn start(&mut self, velocity: f64, now: Instant) -> bool {
        if !velocity.is_finite() || velocity.abs() <= START_VELOCITY {
            self.cancel();
            return false;
        }
        self.velocity = velocity;
        self.active = true;
        self.last_frame = Some(now);
        true
    }

    /// Stop immediately.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Advance one frame.
    ///
    /// Decays velocity by `FRICTION^(dt / FRAME_MS)`, then moves by
    /// `velocity * dt`. Returns the new scroll position, or `None` when
    /// nothing moved. Stops below [`STOP_VELOCITY`] or on reaching a
    /// boundary while heading into it.
    pub fn step(&mut self, now: Instant, scroll_top: f64, max_scroll: f64) -> Option<f64> {
        if !self.active {
            return None;
        }
        let last = self.last_frame.unwrap_or(now);
        let dt = now.saturating_duration_since(last).as_secs_f64() * 1000.0;
        if dt <= 0.0 {
            return None;
        }
        self.last_frame = Some(now);

        self.velocity *= FRICTION.powf(dt / FRAME_MS);
        if self.velocity.abs() < STOP_VELOCITY {
            self.cancel();
            return None;
        }

        let next = scroll_top + self.velocity * dt;
        if next <= 0.0 && self.velocity < 0.0 {
            self.cancel();
            return Some(0.0);
        }
        if next >= max_scroll && self.velocity > 0.0 {
            self.cancel();
            return Some(max_scroll.max(0.0));
        }
        Some(next)
    }
}
