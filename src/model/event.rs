//! Outbound viewer events and the observer interface.

use super::SelectionRange;

/// Notifications produced by the viewer for its host.
///
/// A closed set: hosts match on the variant instead of registering
/// string-keyed listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// The selection changed (`None` when cleared).
    SelectionChange {
        /// New selection.
        range: Option<SelectionRange>,
    },
    /// The committed scroll position changed.
    Scroll {
        /// New committed scroll offset in pixels.
        scroll_top: f64,
    },
    /// The temporary navigation highlight was set or cleared.
    OffsetHighlight {
        /// Highlighted byte, `None` once the highlight expires.
        offset: Option<u64>,
    },
    /// A chunk load failed; the view keeps painting its last good frame.
    LoadFailed {
        /// Human-readable failure for a non-fatal banner.
        message: String,
    },
}

/// Receives [`ViewerEvent`]s.
///
/// Implemented for any `FnMut(&ViewerEvent)` so closures can subscribe
/// directly.
pub trait ViewerObserver {
    /// Called once per event, in emission order.
    fn on_event(&mut self, event: &ViewerEvent);
}

impl<F> ViewerObserver for F
where
    F: FnMut(&ViewerEvent),
{
    fn on_event(&mut self, event: &ViewerEvent) {
        self(event)
    }
}
