//! Input state machine (pure).
//!
//! All state transitions are pure functions testable without a terminal.

pub mod inertia;
pub mod input;
pub mod keyboard_handler;
pub mod pointer_handler;
pub mod scrollbar;
pub mod touch_handler;

// Re-export for convenience
pub use inertia::InertiaState;
pub use input::{
    expire_highlight, handle_input, handle_wheel, set_highlight, tick_inertia, Effect, Gesture,
    Highlight, InputContext, InputEvent, InputState, PointerEventData, PointerKind, ScrollbarDrag,
    Transition, DEFAULT_HIGHLIGHT_DURATION,
};
pub use keyboard_handler::{handle_key, navigate, Navigation};
pub use pointer_handler::{handle_pointer_down, handle_pointer_move, handle_pointer_up};
pub use scrollbar::{ScrollbarGeometry, ScrollbarHit};
pub use touch_handler::{TouchGesture, VelocityTracker};
