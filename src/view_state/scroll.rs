//! Committed and pending scroll position.

/// Scroll position of the viewport.
///
/// `committed` is the last position whose bytes are resident and safe to
/// paint. `pending` holds a requested position while its load is in flight.
///
/// # Invariants
/// - `0 <= committed <= max`
/// - `pending`, when set, is also within `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    committed: f64,
    pending: Option<f64>,
    max: f64,
}

impl ScrollState {
    /// Scroll state at the top with the given bound.
    pub fn new(max: f64) -> Self {
        Self {
            committed: 0.0,
            pending: None,
            max: sanitize(max),
        }
    }

    /// Last committed position.
    pub fn committed(&self) -> f64 {
        self.committed
    }

    /// Requested position awaiting a load.
    pub fn pending(&self) -> Option<f64> {
        self.pending
    }

    /// Largest valid position.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Where the viewport is heading: pending if set, else committed.
    pub fn target(&self) -> f64 {
        self.pending.unwrap_or(self.committed)
    }

    /// Check if a load is outstanding for a new position.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Clamp `value` into `[0, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.max)
    }

    /// Change the bound, clamping both positions into it.
    pub fn set_max(&mut self, max: f64) {
        self.max = sanitize(max);
        self.committed = self.clamp(self.committed);
        self.pending = self.pending.map(|p| self.clamp(p));
    }

    /// Record `value` (clamped) as pending.
    pub fn set_pending(&mut self, value: f64) -> f64 {
        let value = self.clamp(value);
        self.pending = Some(value);
        value
    }

    /// Commit `value` (clamped) and clear any pending position.
    pub fn commit(&mut self, value: f64) -> f64 {
        self.committed = self.clamp(value);
        self.pending = None;
        self.committed
    }

    /// Commit the pending position, if any.
    pub fn commit_pending(&mut self) -> f64 {
        match self.pending {
            Some(value) => self.commit(value),
            None => self.committed,
        }
    }
}

fn sanitize(max: f64) -> f64 {
    if max.is_finite() {
        max.max(0.0)
    } else {
        0.0
    }
}
