//! The hex viewer engine facade.
//!
//! [`HexViewer`] owns a [`ViewerState`] (layout, viewport, input) and is
//! driven by its host: input events go through [`HexViewer::handle_input`]
//! and [`HexViewer::tick`] is called once per display refresh. Changes are
//! reported to subscribed [`ViewerObserver`]s as [`ViewerEvent`]s.

use crate::cache::{
    ChunkCache, ChunkCacheConfig, LoadExecutor, DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_SIZE,
    DEFAULT_EVICTION_BUFFER, DEFAULT_ROW_CAPACITY,
};
use crate::model::{is_offset_in_range, LoadError, SelectionRange, ViewerEvent, ViewerObserver};
use crate::render::{FrameOutcome, FrameOverlay, RenderDriver, RenderFrame, Renderer};
use crate::source::ByteSource;
use crate::state::{
    expire_highlight, handle_input, set_highlight, tick_inertia, Effect, InputContext, InputEvent,
    InputState, Transition, DEFAULT_HIGHLIGHT_DURATION,
};
use crate::view_state::{
    FontMetrics, LayoutEngine, LayoutInputs, LayoutMetrics, LoadPoll, ViewportController,
    ViewportOptions, DEFAULT_OVERSCAN_ROWS, DEFAULT_WINDOW_SIZE,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Construction-time settings for a [`HexViewer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    /// Bytes per cached chunk.
    pub chunk_size: u64,
    /// Minimum bytes loaded around the visible rows.
    pub window_size: u64,
    /// Maximum resident chunks.
    pub cache_capacity: usize,
    /// Chunks kept around a requested range before proactive eviction.
    pub eviction_buffer: u64,
    /// Maximum cached rows.
    pub row_cache_capacity: usize,
    /// Rows loaded above and below the visible rows.
    pub overscan_rows: u64,
    /// Show the ASCII column.
    pub show_ascii: bool,
    /// Fixed bytes per row instead of fitting the width.
    pub bytes_per_row_override: Option<u32>,
    /// Lifetime of the navigation highlight.
    pub highlight_duration: Duration,
    /// Glyph size in viewport units.
    pub font: FontMetrics,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            cache_capacity: DEFAULT_CHUNK_CAPACITY,
            eviction_buffer: DEFAULT_EVICTION_BUFFER,
            row_cache_capacity: DEFAULT_ROW_CAPACITY,
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            show_ascii: true,
            bytes_per_row_override: None,
            highlight_duration: DEFAULT_HIGHLIGHT_DURATION,
            font: FontMetrics::default(),
        }
    }
}

impl ViewerConfig {
    fn cache_config(&self) -> ChunkCacheConfig {
        ChunkCacheConfig {
            chunk_size: self.chunk_size,
            capacity: self.cache_capacity,
            eviction_buffer: self.eviction_buffer,
            row_capacity: self.row_cache_capacity,
        }
    }

    fn viewport_options(&self) -> ViewportOptions {
        ViewportOptions {
            overscan_rows: self.overscan_rows,
            window_size: if self.window_size == 0 {
                DEFAULT_WINDOW_SIZE
            } else {
                self.window_size
            },
        }
    }
}

/// Everything the engine mutates, owned in one place.
pub struct ViewerState {
    /// Grid geometry.
    pub layout: LayoutEngine,
    /// Scroll position, cache and in-flight load.
    pub viewport: ViewportController,
    /// Selection, gestures, hover, highlight and momentum.
    pub input: InputState,
}

/// Windowed hex viewer over a [`ByteSource`].
pub struct HexViewer {
    state: ViewerState,
    config: ViewerConfig,
    driver: RenderDriver,
    observers: Vec<Box<dyn ViewerObserver>>,
    reported_scroll: f64,
}

impl HexViewer {
    /// Create a viewer over `source`, running loads on `executor`.
    ///
    /// Nothing is laid out until the host calls [`set_viewport_size`](Self::set_viewport_size).
    pub fn new(
        source: Arc<dyn ByteSource>,
        executor: Box<dyn LoadExecutor>,
        config: ViewerConfig,
    ) -> Self {
        let layout = LayoutEngine::new(LayoutInputs {
            font: config.font,
            show_ascii: config.show_ascii,
            bytes_per_row_override: config.bytes_per_row_override,
            source_size: source.size(),
            ..LayoutInputs::default()
        });
        let cache = ChunkCache::new(source, config.cache_config());
        info!(
            source_size = cache.source_size(),
            chunk_size = cache.chunk_size(),
            capacity = cache.capacity(),
            "Created viewer"
        );
        let viewport = ViewportController::new(cache, executor, config.viewport_options());

        Self {
            state: ViewerState {
                layout,
                viewport,
                input: InputState::default(),
            },
            config,
            driver: RenderDriver::new(),
            observers: Vec::new(),
            reported_scroll: 0.0,
        }
    }

    /// Engine state, read-only.
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Settings the viewer was built with.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Current geometry, `None` while the viewport has no size.
    pub fn metrics(&self) -> Option<&LayoutMetrics> {
        self.state.layout.metrics()
    }

    /// Size of the byte source.
    pub fn source_size(&self) -> u64 {
        self.state.viewport.cache().source_size()
    }

    /// Register an observer for [`ViewerEvent`]s.
    pub fn subscribe(&mut self, observer: impl ViewerObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ===== Queries =====

    /// Current selection.
    pub fn selected_range(&self) -> Option<SelectionRange> {
        self.state.input.selection
    }

    /// Committed scroll position.
    pub fn scroll_top(&self) -> f64 {
        self.state.viewport.scroll_top()
    }

    /// Check if `offset` is inside the selection.
    pub fn is_offset_selected(&self, offset: u64) -> bool {
        is_offset_in_range(offset, self.state.input.selection)
    }

    /// Byte under the mouse.
    pub fn hover(&self) -> Option<u64> {
        self.state.input.hover
    }

    /// Byte carrying the navigation highlight.
    pub fn highlighted_offset(&self) -> Option<u64> {
        self.state.input.highlight.map(|h| h.offset)
    }

    /// Check if a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.viewport.is_loading()
    }

    /// Most recent load failure, until a load succeeds.
    pub fn last_error(&self) -> Option<&LoadError> {
        self.state.viewport.last_error()
    }

    /// The last frame handed to the renderer.
    pub fn last_frame(&self) -> Option<&Arc<RenderFrame>> {
        self.driver.last_frame()
    }

    /// Bytes of row `row` under the current layout.
    ///
    /// Short or empty when the row is not resident. `None` without geometry.
    pub fn row_bytes(&mut self, row: u64) -> Option<Arc<[u8]>> {
        let bytes_per_row = self.state.layout.metrics()?.bytes_per_row;
        Some(self.state.viewport.cache_mut().row_bytes(row, bytes_per_row))
    }

    // ===== Commands =====

    /// Replace the selection. Endpoints past the end of the source are clamped.
    pub fn set_selected_range(&mut self, range: Option<SelectionRange>) {
        let size = self.source_size();
        let range = match range {
            Some(_) if size == 0 => None,
            Some(r) => Some(SelectionRange::new(r.start.min(size - 1), r.end.min(size - 1))),
            None => None,
        };
        if self.state.input.selection == range {
            return;
        }
        self.state.input.selection = range;
        self.emit(ViewerEvent::SelectionChange { range });
    }

    /// Scroll so the row holding `offset` is centered, and highlight it.
    ///
    /// Offsets past the end are clamped to the last byte. Returns the scroll
    /// target, or `None` when there is no geometry or nothing to show.
    pub fn scroll_to_offset(&mut self, offset: u64, now: Instant) -> Option<f64> {
        let size = self.source_size();
        if size == 0 {
            return None;
        }
        let offset = offset.min(size - 1);
        let target = self.scroll_target_for(offset)?;
        let target = self.set_scroll_target(target);

        let transition = {
            let ctx = self.context(now);
            set_highlight(self.state.input, offset, &ctx)
        };
        self.apply(transition);
        Some(target)
    }

    /// Request a scroll position. Returns the clamped target.
    pub fn set_scroll_target(&mut self, value: f64) -> f64 {
        let target = self
            .state
            .viewport
            .set_scroll_target(value, self.state.layout.metrics());
        self.report_scroll();
        target
    }

    /// Feed one input event.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        let transition = {
            let ctx = self.context(now);
            handle_input(self.state.input, &event, &ctx)
        };
        self.apply(transition);
    }

    /// Try the current target again after a load failure.
    pub fn retry(&mut self) {
        self.state.viewport.retry(self.state.layout.metrics());
    }

    /// Show a different source, returning to the top with nothing selected.
    pub fn open(&mut self, source: Arc<dyn ByteSource>) {
        let size = source.size();
        info!(source_size = size, "Opening new source");
        let cache = ChunkCache::new(source, self.config.cache_config());
        self.state.viewport.reset(cache);
        self.state.layout.set_source_size(size);
        self.state.viewport.set_layout(self.state.layout.metrics());
        self.state.viewport.refresh(self.state.layout.metrics());
        self.driver.reset();

        let previous = std::mem::take(&mut self.state.input);
        if previous.selection.is_some() {
            self.emit(ViewerEvent::SelectionChange { range: None });
        }
        if previous.highlight.is_some() {
            self.emit(ViewerEvent::OffsetHighlight { offset: None });
        }
        self.report_scroll();
    }

    // ===== Layout inputs =====

    /// Resize the viewport.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        if self.state.layout.set_viewport_size(width, height) {
            self.layout_changed();
        }
    }

    /// Change the glyph size.
    pub fn set_font_metrics(&mut self, font: FontMetrics) {
        if self.state.layout.set_font(font) {
            self.layout_changed();
        }
    }

    /// Show or hide the ASCII column.
    pub fn set_show_ascii(&mut self, show_ascii: bool) {
        if self.state.layout.set_show_ascii(show_ascii) {
            self.layout_changed();
        }
    }

    /// Flip the ASCII column.
    pub fn toggle_ascii(&mut self) {
        let shown = self.state.layout.inputs().show_ascii;
        self.set_show_ascii(!shown);
    }

    /// Fix bytes per row, or fit the width with `None`.
    pub fn set_bytes_per_row_override(&mut self, bytes_per_row: Option<u32>) {
        if self.state.layout.set_bytes_per_row_override(bytes_per_row) {
            self.layout_changed();
        }
    }

    // ===== Frame loop =====

    /// Advance one frame and paint.
    ///
    /// Steps momentum, expires the highlight, applies a finished load,
    /// re-derives what must be loaded, then hands the frame to `renderer`.
    pub fn tick<R: Renderer>(&mut self, now: Instant, renderer: &mut R) -> Result<FrameOutcome, R::Error> {
        let transition = {
            let ctx = self.context(now);
            tick_inertia(self.state.input, &ctx)
        };
        self.apply(transition);
        let transition = expire_highlight(self.state.input, now);
        self.apply(transition);

        match self.state.viewport.poll_load() {
            LoadPoll::Failed(err) => {
                self.emit(ViewerEvent::LoadFailed {
                    message: err.to_string(),
                })
            }
            LoadPoll::Committed { scroll_top } => debug!(scroll_top, "Load committed"),
            LoadPoll::Idle | LoadPoll::Waiting | LoadPoll::Discarded => {}
        }
        self.state.viewport.refresh(self.state.layout.metrics());
        self.report_scroll();

        let input = self.state.input;
        let overlay = FrameOverlay {
            selection: input.selection,
            hover: input.hover,
            highlight: input.highlight.map(|h| h.offset),
        };
        self.driver.draw(
            &mut self.state.viewport,
            self.state.layout.metrics(),
            overlay,
            renderer,
        )
    }

    fn context(&self, now: Instant) -> InputContext<'_> {
        InputContext {
            metrics: self.state.layout.metrics(),
            scroll_top: self.state.viewport.scroll_top(),
            scroll_target: self.state.viewport.scroll().target(),
            now,
            highlight_duration: self.config.highlight_duration,
        }
    }

    fn apply(&mut self, transition: Transition) {
        self.state.input = transition.state;
        for effect in transition.effects {
            match effect {
                Effect::SelectionChanged(range) => self.emit(ViewerEvent::SelectionChange { range }),
                Effect::ScrollTo(value) => {
                    self.set_scroll_target(value);
                }
                Effect::ScrollIntoView(offset) => {
                    if let Some(target) = self.scroll_target_for(offset) {
                        self.set_scroll_target(target);
                    }
                }
                Effect::HighlightChanged(offset) => self.emit(ViewerEvent::OffsetHighlight { offset }),
            }
        }
    }

    /// Scroll position that centers the row holding `offset`.
    fn scroll_target_for(&self, offset: u64) -> Option<f64> {
        let metrics = self.state.layout.metrics()?;
        let row = metrics.row_of(offset);
        let center = metrics.row_top(row) + metrics.row_height / 2.0;
        Some(metrics.clamp_scroll(center - metrics.viewport_height / 2.0))
    }

    fn layout_changed(&mut self) {
        let metrics = self.state.layout.metrics();
        debug!(
            bytes_per_row = metrics.map(|m| m.bytes_per_row),
            max_scroll = metrics.map(|m| m.max_scroll),
            "Layout changed"
        );
        self.state.viewport.set_layout(metrics);
        self.state.viewport.refresh(metrics);
        self.report_scroll();
    }

    fn report_scroll(&mut self) {
        let scroll_top = self.state.viewport.scroll_top();
        if scroll_top != self.reported_scroll {
            self.reported_scroll = scroll_top;
            self.emit(ViewerEvent::Scroll { scroll_top });
        }
    }

    fn emit(&mut self, event: ViewerEvent) {
        debug!(?event, "Viewer event");
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

impl std::fmt::Debug for HexViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HexViewer")
            .field("config", &self.config)
            .field("viewport", &self.state.viewport)
            .field("input", &self.state.input)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "viewer_tests.rs"]
mod tests;
