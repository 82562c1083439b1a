//! Pointer event handlers.
//!
//! Pure functions that transform [`InputState`] in response to pointer
//! events. Scrollbar presses are handled here for both devices; byte-grid
//! presses go to the mouse selection machine or the touch gesture machine.
//!
//! Mouse selection runs `Idle -> Pressed -> (Dragging | release)`:
//! - Pressing the current single-byte selection defers a deselect to release.
//! - Moving to any other byte turns the press into a drag from the pressed byte.
//! - Shift-press extends from the anchor and never deselects.

use super::input::{Effect, Gesture, InputContext, InputState, PointerEventData, PointerKind, ScrollbarDrag, Transition};
use super::scrollbar::{ScrollbarGeometry, ScrollbarHit};
use super::touch_handler::{touch_down, touch_move, touch_up};
use crate::model::SelectionRange;
use crate::view_state::{offset_from_position, LayoutMetrics};

/// Handle a button press or touch start.
///
/// Always cancels momentum.
pub fn handle_pointer_down(
    mut state: InputState,
    event: &PointerEventData,
    ctx: &InputContext<'_>,
) -> Transition {
    state.inertia.cancel();
    let Some(metrics) = ctx.metrics else {
        state.gesture = Gesture::Idle;
        return Transition::unchanged(state);
    };

    // Hit-test against the thumb as drawn, which tracks the scroll target.
    if let Some(geometry) = ScrollbarGeometry::compute(metrics, ctx.scroll_target) {
        if let Some(hit) = geometry.hit(event.x, event.y) {
            return press_scrollbar(state, &geometry, hit, event, ctx);
        }
    }

    match event.kind {
        PointerKind::Touch => touch_down(state, event, ctx, metrics),
        PointerKind::Mouse => mouse_down(state, event, ctx, metrics),
    }
}

/// Handle pointer movement, pressed or not.
pub fn handle_pointer_move(
    mut state: InputState,
    event: &PointerEventData,
    ctx: &InputContext<'_>,
) -> Transition {
    let Some(metrics) = ctx.metrics else {
        return Transition::unchanged(state);
    };

    match state.gesture {
        Gesture::Idle => {
            state.hover = offset_from_position(metrics, event.x, event.y, ctx.scroll_top);
            Transition::unchanged(state)
        }
        Gesture::Pressed { offset, .. } => {
            let current = offset_from_position(metrics, event.x, event.y, ctx.scroll_top);
            state.hover = current;
            match current {
                Some(current) if current != offset => {
                    state.gesture = Gesture::Dragging { anchor: offset };
                    select(state, SelectionRange::new(offset, current))
                }
                _ => Transition::unchanged(state),
            }
        }
        Gesture::Dragging { anchor } => {
            let current = offset_from_position(metrics, event.x, event.y, ctx.scroll_top);
            state.hover = current;
            match current {
                Some(current) => select(state, SelectionRange::new(anchor, current)),
                None => Transition::unchanged(state),
            }
        }
        Gesture::Scrollbar(drag) => {
            match ScrollbarGeometry::compute(metrics, ctx.scroll_target) {
                Some(geometry) => {
                    let target = geometry.scroll_for_drag(drag.start_scroll, event.y - drag.grab_y);
                    Transition::with(state, vec![Effect::ScrollTo(target)])
                }
                None => Transition::unchanged(state),
            }
        }
        Gesture::Touch(gesture) => touch_move(state, gesture, event, ctx, metrics),
    }
}

/// Handle a button release or touch end.
pub fn handle_pointer_up(
    mut state: InputState,
    event: &PointerEventData,
    _ctx: &InputContext<'_>,
) -> Transition {
    let gesture = std::mem::take(&mut state.gesture);
    match gesture {
        Gesture::Pressed {
            should_deselect: true,
            ..
        } => {
            state.selection = None;
            Transition::with(state, vec![Effect::SelectionChanged(None)])
        }
        Gesture::Touch(gesture) => touch_up(state, gesture, event),
        _ => Transition::unchanged(state),
    }
}

fn mouse_down(
    mut state: InputState,
    event: &PointerEventData,
    ctx: &InputContext<'_>,
    metrics: &LayoutMetrics,
) -> Transition {
    let Some(offset) = offset_from_position(metrics, event.x, event.y, ctx.scroll_top) else {
        state.gesture = Gesture::Idle;
        return Transition::unchanged(state);
    };

    if event.shift_key {
        if let Some(current) = state.selection {
            state.gesture = Gesture::Idle;
            return select(state, SelectionRange::new(current.start, offset));
        }
    }

    let should_deselect = state
        .selection
        .is_some_and(|s| s.is_single() && s.start == offset);
    state.gesture = Gesture::Pressed {
        offset,
        should_deselect,
    };
    if should_deselect {
        Transition::unchanged(state)
    } else {
        select(state, SelectionRange::single(offset))
    }
}

fn press_scrollbar(
    mut state: InputState,
    geometry: &ScrollbarGeometry,
    hit: ScrollbarHit,
    event: &PointerEventData,
    ctx: &InputContext<'_>,
) -> Transition {
    match hit {
        ScrollbarHit::Thumb => {
            state.gesture = Gesture::Scrollbar(ScrollbarDrag {
                grab_y: event.y,
                start_scroll: ctx.scroll_target,
            });
            Transition::unchanged(state)
        }
        ScrollbarHit::Track => {
            let target = geometry.scroll_for_track_click(event.y);
            state.gesture = Gesture::Scrollbar(ScrollbarDrag {
                grab_y: event.y,
                start_scroll: target,
            });
            Transition::with(state, vec![Effect::ScrollTo(target)])
        }
    }
}

fn select(mut state: InputState, range: SelectionRange) -> Transition {
    if state.selection == Some(range) {
        return Transition::unchanged(state);
    }
    state.selection = Some(range);
    Transition::with(state, vec![Effect::SelectionChanged(Some(range))])
}

#[cfg(test)]
#[path = "pointer_handler_tests.rs"]
mod tests;
