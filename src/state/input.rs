//! Input state machine.
//!
//! Mouse and single-touch input arrive as one [`PointerEventData`] shape.
//! Every handler is a pure function taking the current [`InputState`] by
//! value and returning a [`Transition`]: the next state plus the
//! [`Effect`]s the viewer must apply (scrolling, events).

use super::inertia::InertiaState;
use super::keyboard_handler::handle_key;
use super::pointer_handler::{handle_pointer_down, handle_pointer_move, handle_pointer_up};
use super::touch_handler::TouchGesture;
use crate::model::{NavKey, SelectionRange};
use crate::view_state::LayoutMetrics;
use std::time::{Duration, Instant};

/// Default lifetime of the navigation highlight.
pub const DEFAULT_HIGHLIGHT_DURATION: Duration = Duration::from_millis(2000);

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Mouse or pen.
    Mouse,
    /// Single touch point.
    Touch,
}

/// Normalized pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEventData {
    /// Horizontal position in pixels.
    pub x: f64,
    /// Vertical position in pixels.
    pub y: f64,
    /// Whether shift was held.
    pub shift_key: bool,
    /// Producing device.
    pub kind: PointerKind,
    /// When the event happened.
    pub timestamp: Instant,
}

impl PointerEventData {
    /// Mouse event without modifiers.
    pub fn mouse(x: f64, y: f64, timestamp: Instant) -> Self {
        Self {
            x,
            y,
            shift_key: false,
            kind: PointerKind::Mouse,
            timestamp,
        }
    }

    /// Touch event.
    pub fn touch(x: f64, y: f64, timestamp: Instant) -> Self {
        Self {
            x,
            y,
            shift_key: false,
            kind: PointerKind::Touch,
            timestamp,
        }
    }

    /// Same event with shift held.
    pub fn with_shift(self) -> Self {
        Self {
            shift_key: true,
            ..self
        }
    }
}

/// Input consumed by the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Button pressed or finger down.
    PointerDown(PointerEventData),
    /// Pointer moved, pressed or not.
    PointerMove(PointerEventData),
    /// Button released or finger up.
    PointerUp(PointerEventData),
    /// Pointer left the viewport.
    PointerLeave,
    /// Navigation key.
    Key(NavKey),
    /// Wheel scroll by `delta_y` pixels.
    Wheel {
        /// Pixels to scroll; positive scrolls toward the end.
        delta_y: f64,
    },
}

/// Read-only facts a handler needs.
#[derive(Debug, Clone, Copy)]
pub struct InputContext<'a> {
    /// Current geometry, `None` while the viewport has no size.
    pub metrics: Option<&'a LayoutMetrics>,
    /// Committed scroll position (what is painted).
    pub scroll_top: f64,
    /// Where scrolling is heading: pending if a load is outstanding.
    pub scroll_target: f64,
    /// Current time.
    pub now: Instant,
    /// Lifetime of the navigation highlight.
    pub highlight_duration: Duration,
}

impl InputContext<'_> {
    /// Scroll bound, 0 without geometry.
    pub fn max_scroll(&self) -> f64 {
        self.metrics.map_or(0.0, |m| m.max_scroll)
    }

    /// Clamp a scroll position into `[0, max_scroll]`.
    pub fn clamp_scroll(&self, value: f64) -> f64 {
        match self.metrics {
            Some(m) => m.clamp_scroll(value),
            None => 0.0,
        }
    }
}

/// Side effects of a transition, applied by the viewer in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// The selection changed.
    SelectionChanged(Option<SelectionRange>),
    /// Scroll to an absolute position.
    ScrollTo(f64),
    /// Scroll so the row holding this offset is centered.
    ScrollIntoView(u64),
    /// The navigation highlight was set or cleared.
    HighlightChanged(Option<u64>),
}

/// Temporary highlight left by keyboard navigation or `scroll_to_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    /// Highlighted byte.
    pub offset: u64,
    /// When the highlight clears itself.
    pub expires_at: Instant,
}

/// Thumb drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarDrag {
    /// Pointer y when the drag began.
    pub grab_y: f64,
    /// Scroll position when the drag began.
    pub start_scroll: f64,
}

/// Gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No button or finger down.
    #[default]
    Idle,
    /// Mouse down on a byte, not yet moved to another byte.
    Pressed {
        /// Byte pressed.
        offset: u64,
        /// Pressed the current single-byte selection: release deselects.
        should_deselect: bool,
    },
    /// Mouse drag-selecting from `anchor`.
    Dragging {
        /// Fixed end of the selection.
        anchor: u64,
    },
    /// Dragging the scrollbar.
    Scrollbar(ScrollbarDrag),
    /// Touch gesture.
    Touch(TouchGesture),
}

/// Everything the input layer owns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    /// Current selection; `start` is the anchor.
    pub selection: Option<SelectionRange>,
    /// Byte under an unpressed mouse.
    pub hover: Option<u64>,
    /// Gesture in progress.
    pub gesture: Gesture,
    /// Momentum after a touch fling.
    pub inertia: InertiaState,
    /// Navigation highlight.
    pub highlight: Option<Highlight>,
}

/// Next state plus effects to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State after the event.
    pub state: InputState,
    /// Effects, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Transition with no effects.
    pub fn unchanged(state: InputState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    /// Transition with effects.
    pub fn with(state: InputState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }
}

/// Route `event` to its handler.
pub fn handle_input(state: InputState, event: &InputEvent, ctx: &InputContext<'_>) -> Transition {
    match event {
        InputEvent::PointerDown(pointer) => handle_pointer_down(state, pointer, ctx),
        InputEvent::PointerMove(pointer) => handle_pointer_move(state, pointer, ctx),
        InputEvent::PointerUp(pointer) => handle_pointer_up(state, pointer, ctx),
        InputEvent::PointerLeave => {
            let mut state = state;
            state.hover = None;
            Transition::unchanged(state)
        }
        InputEvent::Key(key) => handle_key(state, *key, ctx),
        InputEvent::Wheel { delta_y } => handle_wheel(state, *delta_y, ctx),
    }
}

/// Wheel scrolling: cancels momentum and scrolls relative to the target.
pub fn handle_wheel(mut state: InputState, delta_y: f64, ctx: &InputContext<'_>) -> Transition {
    state.inertia.cancel();
    if ctx.metrics.is_none() || !delta_y.is_finite() || delta_y == 0.0 {
        return Transition::unchanged(state);
    }
    let target = ctx.clamp_scroll(ctx.scroll_target + delta_y);
    Transition::with(state, vec![Effect::ScrollTo(target)])
}

/// Set the navigation highlight on `offset`, expiring after the configured duration.
pub fn set_highlight(mut state: InputState, offset: u64, ctx: &InputContext<'_>) -> Transition {
    state.highlight = Some(Highlight {
        offset,
        expires_at: ctx.now + ctx.highlight_duration,
    });
    Transition::with(state, vec![Effect::HighlightChanged(Some(offset))])
}

/// Clear the highlight once it has expired.
pub fn expire_highlight(mut state: InputState, now: Instant) -> Transition {
    match state.highlight {
        Some(highlight) if now >= highlight.expires_at => {
            state.highlight = None;
            Transition::with(state, vec![Effect::HighlightChanged(None)])
        }
        _ => Transition::unchanged(state),
    }
}

/// Advance momentum by one frame.
pub fn tick_inertia(mut state: InputState, ctx: &InputContext<'_>) -> Transition {
    match state
        .inertia
        .step(ctx.now, ctx.scroll_target, ctx.max_scroll())
    {
        Some(next) => Transition::with(state, vec![Effect::ScrollTo(ctx.clamp_scroll(next))]),
        None => Transition::unchanged(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::{compute_layout, LayoutInputs};

    fn metrics() -> LayoutMetrics {
        compute_layout(&LayoutInputs {
            viewport_width: 80.0,
            viewport_height: 24.0,
            source_size: 10_000,
            ..LayoutInputs::default()
        })
        .unwrap()
    }

    fn ctx(metrics: &LayoutMetrics, now: Instant) -> InputContext<'_> {
        InputContext {
            metrics: Some(metrics),
            scroll_top: 10.0,
            scroll_target: 20.0,
            now,
            highlight_duration: DEFAULT_HIGHLIGHT_DURATION,
        }
    }

    #[test]
    fn wheel_scrolls_from_target() {
        let m = metrics();
        let t = handle_wheel(InputState::default(), 3.0, &ctx(&m, Instant::now()));
        assert_eq!(t.effects, vec![Effect::ScrollTo(23.0)]);
    }

    #[test]
    fn wheel_is_clamped_and_cancels_inertia() {
        let m = metrics();
        let now = Instant::now();
        let mut state = InputState::default();
        state.inertia.start(4.0, now);

        let t = handle_wheel(state, -500.0, &ctx(&m, now));

        assert_eq!(t.effects, vec![Effect::ScrollTo(0.0)]);
        assert!(!t.state.inertia.is_active());
    }

    #[test]
    fn wheel_without_geometry_is_ignored() {
        let c = InputContext {
            metrics: None,
            ..ctx(&metrics(), Instant::now())
        };
        assert!(handle_wheel(InputState::default(), 3.0, &c).effects.is_empty());
    }

    #[test]
    fn highlight_expires_after_duration() {
        let m = metrics();
        let now = Instant::now();
        let t = set_highlight(InputState::default(), 500, &ctx(&m, now));
        assert_eq!(t.effects, vec![Effect::HighlightChanged(Some(500))]);

        let early = expire_highlight(t.state, now + Duration::from_millis(1999));
        assert!(early.effects.is_empty());
        assert_eq!(early.state.highlight.map(|h| h.offset), Some(500));

        let late = expire_highlight(early.state, now + Duration::from_millis(2000));
        assert_eq!(late.effects, vec![Effect::HighlightChanged(None)]);
        assert!(late.state.highlight.is_none());
    }

    #[test]
    fn inertia_tick_scrolls_from_target() {
        let m = metrics();
        let now = Instant::now();
        let mut state = InputState::default();
        state.inertia.start(1.0, now);

        let t = tick_inertia(state, &ctx(&m, now + Duration::from_micros(16_670)));

        match t.effects.as_slice() {
            [Effect::ScrollTo(next)] => assert!(*next > 20.0),
            other => panic!("Expected one ScrollTo, got {:?}", other),
        }
    }

    #[test]
    fn pointer_leave_clears_hover() {
        let m = metrics();
        let state = InputState {
            hover: Some(4),
            ..InputState::default()
        };
        let t = handle_input(state, &InputEvent::PointerLeave, &ctx(&m, Instant::now()));
        assert_eq!(t.state.hover, None);
    }
}
