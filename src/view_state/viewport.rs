//! Scroll-driven load orchestration.
//!
//! The viewport is either **Stable** (nothing pending, the committed
//! position's bytes are in the loaded window) or **Loading** (a target is
//! pending and exactly one load is in flight for it). Transitions happen
//! only on a scroll-target change, a load completing, or a cancellation.

use super::layout::LayoutMetrics;
use super::scroll::ScrollState;
use super::visible_range::{
    max_required_span, required_range, visible_range, window_range, DEFAULT_OVERSCAN_ROWS,
};
use crate::cache::{ChunkCache, LoadExecutor, PendingLoad};
use crate::model::{ByteRange, LoadError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default size of the loaded window (128 KiB).
pub const DEFAULT_WINDOW_SIZE: u64 = 128 * 1024;

/// Contiguous bytes pulled from the cache for painting.
///
/// Replaced wholesale on every successful load and never mutated, so a
/// renderer holding an `Arc` to it always sees a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedWindow {
    range: ByteRange,
    bytes: Vec<u8>,
}

impl LoadedWindow {
    /// Window starting at `start` holding `bytes`.
    pub fn new(start: u64, bytes: Vec<u8>) -> Self {
        Self {
            range: ByteRange::new(start, start + bytes.len() as u64),
            bytes,
        }
    }

    /// Bytes covered.
    pub fn range(&self) -> ByteRange {
        self.range
    }

    /// Window contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check if every byte of `range` is in the window.
    pub fn covers(&self, range: &ByteRange) -> bool {
        self.range.covers(range)
    }

    /// Bytes of `range`, if the window covers it.
    pub fn slice(&self, range: &ByteRange) -> Option<&[u8]> {
        self.range.relative(range).map(|r| &self.bytes[r])
    }
}

/// Tuning for a [`ViewportController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportOptions {
    /// Rows loaded above and below the visible rows.
    pub overscan_rows: u64,
    /// Minimum bytes loaded around the visible rows.
    pub window_size: u64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// What a poll of the in-flight load observed.
#[derive(Debug, Clone)]
pub enum LoadPoll {
    /// Nothing in flight.
    Idle,
    /// A load is in flight and has not reported yet.
    Waiting,
    /// The load completed and its target was committed.
    Committed {
        /// The new committed position.
        scroll_top: f64,
    },
    /// The result belonged to a superseded or cancelled load and was dropped.
    Discarded,
    /// The byte source failed. The viewport stays Loading and keeps its window.
    Failed(LoadError),
}

/// Owns the chunk cache, the scroll state and the single in-flight load.
pub struct ViewportController {
    cache: ChunkCache,
    executor: Box<dyn LoadExecutor>,
    options: ViewportOptions,
    scroll: ScrollState,
    generation: u64,
    in_flight: Option<PendingLoad>,
    window: Option<Arc<LoadedWindow>>,
    visible: ByteRange,
    last_error: Option<LoadError>,
    // Set after a failure; cleared by a new target or an explicit retry.
    stalled: bool,
}

impl ViewportController {
    /// Create a controller at scroll position 0.
    pub fn new(cache: ChunkCache, executor: Box<dyn LoadExecutor>, options: ViewportOptions) -> Self {
        Self {
            cache,
            executor,
            options,
            scroll: ScrollState::default(),
            generation: 0,
            in_flight: None,
            window: None,
            visible: ByteRange::EMPTY,
            last_error: None,
            stalled: false,
        }
    }

    /// The chunk cache.
    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// The chunk cache, for row queries.
    pub fn cache_mut(&mut self) -> &mut ChunkCache {
        &mut self.cache
    }

    /// Scroll state.
    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    /// Committed scroll position.
    pub fn scroll_top(&self) -> f64 {
        self.scroll.committed()
    }

    /// Current loaded window.
    pub fn window(&self) -> Option<&Arc<LoadedWindow>> {
        self.window.as_ref()
    }

    /// Visible range as of the last refresh.
    pub fn visible_range(&self) -> ByteRange {
        self.visible
    }

    /// Check if a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Check if the last load failed and no retry has been issued since.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Most recent load failure, cleared by the next successful load.
    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Generation of the most recently issued load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tuning in effect.
    pub fn options(&self) -> ViewportOptions {
        self.options
    }

    /// Bytes that must be resident to commit `scroll_top`.
    pub fn required_range_for(&self, metrics: Option<&LayoutMetrics>, scroll_top: f64) -> ByteRange {
        required_range(metrics, scroll_top, self.options.overscan_rows)
    }

    /// Apply new geometry: update the scroll bound and clamp into it.
    ///
    /// Grows the cache when it could not hold a full screen of rows plus
    /// overscan, so the visible rows can always be loaded together.
    pub fn set_layout(&mut self, metrics: Option<&LayoutMetrics>) {
        self.scroll.set_max(metrics.map_or(0.0, |m| m.max_scroll));
        if let Some(metrics) = metrics {
            self.cache
                .reserve_span(max_required_span(metrics, self.options.overscan_rows));
        }
    }

    /// Request a new scroll position.
    ///
    /// Commits immediately if the required bytes are resident. Otherwise the
    /// target becomes pending and a load is issued, cancelling any load still
    /// in flight. Returns the clamped target.
    pub fn set_scroll_target(&mut self, value: f64, metrics: Option<&LayoutMetrics>) -> f64 {
        let target = self.scroll.clamp(value);
        self.stalled = false;

        if self.in_flight.is_some() && self.scroll.pending() == Some(target) {
            return target;
        }

        let required = self.required_range_for(metrics, target);
        if self.cache.is_range_loaded(required) {
            self.cancel_in_flight();
            self.scroll.commit(target);
            self.adopt_resident(required);
            return target;
        }

        self.scroll.set_pending(target);
        self.start_load(required);
        target
    }

    /// Check the in-flight load and apply its result if it is current.
    pub fn poll_load(&mut self) -> LoadPoll {
        let Some(load) = self.in_flight.as_ref() else {
            return LoadPoll::Idle;
        };
        let Some(result) = load.poll() else {
            return LoadPoll::Waiting;
        };
        let cancelled = load.is_cancelled();
        self.in_flight = None;

        if cancelled || result.generation != self.generation {
            debug!(
                generation = result.generation,
                current = self.generation,
                "Dropping stale load result"
            );
            return LoadPoll::Discarded;
        }

        match result.outcome {
            Ok(chunks) => {
                self.cache.insert_chunks(chunks);
                let bytes = self.cache.read_bytes(result.range);
                self.window = Some(Arc::new(LoadedWindow::new(result.range.start, bytes)));
                self.last_error = None;
                let scroll_top = self.scroll.commit_pending();
                debug!(
                    generation = result.generation,
                    start = result.range.start,
                    end = result.range.end,
                    scroll_top,
                    "Committed load"
                );
                LoadPoll::Committed { scroll_top }
            }
            Err(LoadError::Cancelled) => LoadPoll::Discarded,
            Err(err) => {
                warn!(error = %err, "Chunk load failed");
                self.last_error = Some(err.clone());
                self.stalled = true;
                LoadPoll::Failed(err)
            }
        }
    }

    /// Per-frame upkeep.
    ///
    /// Re-derives the visible range from the committed position and, when
    /// the window no longer covers what the current target needs (after a
    /// layout change, or after a superseded load), issues a load for it.
    pub fn refresh(&mut self, metrics: Option<&LayoutMetrics>) {
        self.visible = visible_range(metrics, self.scroll.committed());
        if self.in_flight.is_some() || self.stalled {
            return;
        }

        let target = self.scroll.target();
        let required = self.required_range_for(metrics, target);
        let covered = required.is_empty()
            || self.window.as_ref().is_some_and(|w| w.covers(&required));
        if covered {
            if self.scroll.is_loading() {
                self.scroll.commit_pending();
                self.visible = visible_range(metrics, self.scroll.committed());
            }
            return;
        }

        if self.cache.is_range_loaded(required) {
            self.scroll.commit(target);
            self.adopt_resident(required);
        } else {
            self.scroll.set_pending(target);
            self.start_load(required);
        }
        self.visible = visible_range(metrics, self.scroll.committed());
    }

    /// Clear a failure and try the current target again.
    pub fn retry(&mut self, metrics: Option<&LayoutMetrics>) {
        if self.stalled {
            debug!("Retrying after load failure");
        }
        self.stalled = false;
        self.refresh(metrics);
    }

    /// Swap in a new cache (a new byte source) and return to the top.
    pub fn reset(&mut self, cache: ChunkCache) {
        self.cancel_in_flight();
        self.generation += 1;
        self.cache = cache;
        self.scroll = ScrollState::default();
        self.window = None;
        self.visible = ByteRange::EMPTY;
        self.last_error = None;
        self.stalled = false;
    }

    fn window_for(&self, required: ByteRange) -> ByteRange {
        // One chunk of slack: an unaligned window touches one chunk more than it fills.
        let fits = self
            .cache
            .max_span()
            .saturating_sub(self.cache.chunk_size());
        let size = self.options.window_size.min(fits);
        window_range(required, size, self.cache.source_size())
    }

    /// Rebuild the window from resident chunks if it no longer covers `required`.
    fn adopt_resident(&mut self, required: ByteRange) {
        if self.window.as_ref().is_some_and(|w| w.covers(&required)) {
            return;
        }
        let wanted = self.window_for(required);
        let range = if self.cache.is_range_loaded(wanted) {
            wanted
        } else {
            required
        };
        let bytes = self.cache.read_bytes(range);
        self.window = Some(Arc::new(LoadedWindow::new(range.start, bytes)));
    }

    fn start_load(&mut self, required: ByteRange) {
        self.cancel_in_flight();
        self.generation += 1;

        let plan = self.cache.plan_load(self.window_for(required));
        if plan.is_empty() {
            // Only reachable when the window exceeds what the cache can hold.
            self.scroll.commit_pending();
            self.adopt_resident(required);
            return;
        }

        self.in_flight = Some(PendingLoad::spawn(
            self.executor.as_ref(),
            Arc::clone(self.cache.source()),
            plan,
            self.generation,
        ));
    }

    fn cancel_in_flight(&mut self) {
        if let Some(load) = self.in_flight.take() {
            load.cancel();
            debug!(generation = load.generation(), "Cancelled superseded load");
        }
    }
}

impl std::fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("scroll", &self.scroll)
            .field("generation", &self.generation)
            .field("loading", &self.in_flight.is_some())
            .field("window", &self.window.as_ref().map(|w| w.range()))
            .field("visible", &self.visible)
            .field("stalled", &self.stalled)
            .finish()
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
