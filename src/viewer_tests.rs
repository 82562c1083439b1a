//! Tests for the viewer facade.
//!
//! Loads run on an `InlineExecutor`: a load finishes as soon as it is
//! scheduled and is applied on the next tick.

use super::*;
use crate::cache::InlineExecutor;
use crate::config::{apply_cli_overrides, merge_config};
use crate::model::NavKey;
use crate::source::MemorySource;
use crate::state::PointerEventData;
use crate::view_state::position_of;
use std::cell::RefCell;
use std::convert::Infallible;
use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

struct NullRenderer;

impl Renderer for NullRenderer {
    type Error = Infallible;

    fn paint(&mut self, _frame: &RenderFrame) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Source whose reads fail while `broken` is set.
struct Switchable {
    inner: MemorySource,
    broken: AtomicBool,
}

impl ByteSource for Switchable {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read_range(&self, start: u64, end: u64) -> io::Result<Vec<u8>> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "revoked"));
        }
        self.inner.read_range(start, end)
    }
}

type Events = Rc<RefCell<Vec<ViewerEvent>>>;

fn record(viewer: &mut HexViewer) -> Events {
    let events: Events = Rc::default();
    let sink = Rc::clone(&events);
    viewer.subscribe(move |event: &ViewerEvent| sink.borrow_mut().push(event.clone()));
    events
}

fn viewer_over(source: Arc<dyn ByteSource>) -> HexViewer {
    HexViewer::new(source, Box::new(InlineExecutor), ViewerConfig::default())
}

/// 80x24 viewer over `size` sequential bytes, first frame painted.
fn ready(size: usize) -> (HexViewer, Events) {
    let mut viewer = viewer_over(Arc::new(MemorySource::sequential(size)));
    viewer.set_viewport_size(80.0, 24.0);
    let outcome = viewer.tick(Instant::now(), &mut NullRenderer).unwrap();
    assert_eq!(outcome, FrameOutcome::Painted);
    let events = record(&mut viewer);
    (viewer, events)
}

fn pointer_at(viewer: &HexViewer, offset: u64, now: Instant) -> PointerEventData {
    let (x, y) = position_of(viewer.metrics().unwrap(), offset, viewer.scroll_top()).unwrap();
    PointerEventData::mouse(x, y, now)
}

// ===== Frame loop =====

#[test]
fn nothing_is_painted_without_viewport_size() {
    let mut viewer = viewer_over(Arc::new(MemorySource::sequential(1000)));
    let outcome = viewer.tick(Instant::now(), &mut NullRenderer).unwrap();
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert!(viewer.row_bytes(0).is_none());
}

#[test]
fn first_tick_after_sizing_paints_rows() {
    let (viewer, _events) = ready(1000);
    let frame = viewer.last_frame().unwrap();
    assert_eq!(frame.rows.len(), 24);
    assert!(!frame.stale);
    assert!(!viewer.is_loading());
}

#[test]
fn row_bytes_follow_layout() {
    let (mut viewer, _events) = ready(1000);
    assert_eq!(&viewer.row_bytes(1).unwrap()[..], &(16u8..32).collect::<Vec<_>>()[..]);

    viewer.set_bytes_per_row_override(Some(8));

    assert_eq!(viewer.metrics().unwrap().bytes_per_row, 8);
    assert_eq!(&viewer.row_bytes(1).unwrap()[..], &(8u8..16).collect::<Vec<_>>()[..]);
}

#[test]
fn tiny_chunk_size_still_paints_the_whole_screen() {
    let config = apply_cli_overrides(merge_config(None), None, false, Some(4)).viewer_config();
    assert_eq!(config.chunk_size, 4);
    let mut viewer = HexViewer::new(
        Arc::new(MemorySource::sequential(10_000)),
        Box::new(InlineExecutor),
        config,
    );
    viewer.set_viewport_size(80.0, 24.0);
    let now = Instant::now();

    let outcome = viewer.tick(now, &mut NullRenderer).unwrap();

    assert_eq!(outcome, FrameOutcome::Painted);
    assert_eq!(viewer.last_frame().unwrap().rows.len(), 24);
    assert!(viewer.state().viewport.cache().capacity() > config.cache_capacity);

    viewer.set_scroll_target(300.0);
    let outcome = viewer.tick(now, &mut NullRenderer).unwrap();

    assert_eq!(outcome, FrameOutcome::Painted);
    assert_eq!(viewer.scroll_top(), 300.0);
    let frame = viewer.last_frame().unwrap();
    assert_eq!(frame.rows.len(), 24);
    assert_eq!(frame.rows[0].offset, 300 * 16);
    assert!(frame.rows.iter().all(|row| row.bytes.len() == 16));
}

#[test]
fn growing_the_viewport_grows_the_cache() {
    let config = ViewerConfig {
        chunk_size: 64,
        cache_capacity: 4,
        ..ViewerConfig::default()
    };
    let mut viewer = HexViewer::new(
        Arc::new(MemorySource::sequential(100_000)),
        Box::new(InlineExecutor),
        config,
    );
    viewer.set_viewport_size(80.0, 24.0);
    viewer.tick(Instant::now(), &mut NullRenderer).unwrap();
    let small = viewer.state().viewport.cache().capacity();

    viewer.set_viewport_size(200.0, 100.0);
    let outcome = viewer.tick(Instant::now(), &mut NullRenderer).unwrap();

    assert!(viewer.state().viewport.cache().capacity() > small);
    assert_eq!(outcome, FrameOutcome::Painted);
    assert_eq!(viewer.last_frame().unwrap().rows.len(), 100);
}

// ===== Scroll to offset =====

#[test]
fn scroll_to_offset_centers_row_and_highlights() {
    let (mut viewer, events) = ready(1000);
    let now = Instant::now();

    // Row 31 of 63 centered in 24 rows: 31.5 - 12.
    let target = viewer.scroll_to_offset(500, now);

    assert_eq!(target, Some(19.5));
    assert_eq!(viewer.scroll_top(), 19.5);
    assert_eq!(viewer.highlighted_offset(), Some(500));
    assert_eq!(
        *events.borrow(),
        vec![
            ViewerEvent::Scroll { scroll_top: 19.5 },
            ViewerEvent::OffsetHighlight { offset: Some(500) },
        ]
    );

    viewer
        .tick(now + Duration::from_millis(1999), &mut NullRenderer)
        .unwrap();
    assert_eq!(viewer.highlighted_offset(), Some(500));

    viewer
        .tick(now + Duration::from_millis(2000), &mut NullRenderer)
        .unwrap();
    assert_eq!(viewer.highlighted_offset(), None);
    assert_eq!(
        events.borrow().last(),
        Some(&ViewerEvent::OffsetHighlight { offset: None })
    );
}

#[test]
fn scroll_to_offset_clamps_past_end() {
    let (mut viewer, _events) = ready(1000);
    viewer.scroll_to_offset(50_000, Instant::now());
    assert_eq!(viewer.highlighted_offset(), Some(999));
    assert_eq!(viewer.scroll_top(), 39.0);
}

#[test]
fn scroll_to_offset_needs_geometry() {
    let mut viewer = viewer_over(Arc::new(MemorySource::sequential(1000)));
    assert_eq!(viewer.scroll_to_offset(10, Instant::now()), None);
    assert_eq!(viewer.highlighted_offset(), None);
}

// ===== Input =====

#[test]
fn click_then_click_again_deselects() {
    let (mut viewer, events) = ready(1000);
    let now = Instant::now();

    let at = pointer_at(&viewer, 42, now);
    viewer.handle_input(InputEvent::PointerDown(at), now);
    viewer.handle_input(InputEvent::PointerUp(at), now);
    assert_eq!(viewer.selected_range(), Some(SelectionRange::single(42)));

    viewer.handle_input(InputEvent::PointerDown(at), now);
    viewer.handle_input(InputEvent::PointerUp(at), now);
    assert_eq!(viewer.selected_range(), None);

    assert_eq!(
        *events.borrow(),
        vec![
            ViewerEvent::SelectionChange {
                range: Some(SelectionRange::single(42))
            },
            ViewerEvent::SelectionChange { range: None },
        ]
    );
}

#[test]
fn drag_selection_is_kept_on_release() {
    let (mut viewer, _events) = ready(1000);
    let now = Instant::now();

    viewer.handle_input(InputEvent::PointerDown(pointer_at(&viewer, 42, now)), now);
    viewer.handle_input(InputEvent::PointerMove(pointer_at(&viewer, 50, now)), now);
    viewer.handle_input(InputEvent::PointerUp(pointer_at(&viewer, 50, now)), now);

    assert_eq!(viewer.selected_range(), Some(SelectionRange::new(42, 50)));
    assert!(viewer.is_offset_selected(46));
}

#[test]
fn arrow_key_without_selection_selects_first_byte() {
    let (mut viewer, events) = ready(1000);
    viewer.handle_input(InputEvent::Key(NavKey::ArrowRight), Instant::now());

    assert_eq!(viewer.selected_range(), Some(SelectionRange::single(0)));
    assert_eq!(
        *events.borrow(),
        vec![
            ViewerEvent::SelectionChange {
                range: Some(SelectionRange::single(0))
            },
            ViewerEvent::OffsetHighlight { offset: Some(0) },
        ]
    );
}

#[test]
fn end_key_scrolls_last_byte_into_view() {
    let (mut viewer, _events) = ready(1000);
    let now = Instant::now();
    viewer.handle_input(InputEvent::Key(NavKey::Home), now);
    viewer.handle_input(InputEvent::Key(NavKey::End), now);

    assert_eq!(viewer.selected_range(), Some(SelectionRange::single(999)));
    assert_eq!(viewer.scroll_top(), 39.0);
}

#[test]
fn wheel_scrolls_resident_bytes_immediately() {
    let (mut viewer, events) = ready(1000);
    viewer.handle_input(InputEvent::Wheel { delta_y: 5.0 }, Instant::now());

    assert_eq!(viewer.scroll_top(), 5.0);
    assert_eq!(*events.borrow(), vec![ViewerEvent::Scroll { scroll_top: 5.0 }]);
}

#[test]
fn hover_tracks_unpressed_mouse() {
    let (mut viewer, _events) = ready(1000);
    let now = Instant::now();
    viewer.handle_input(InputEvent::PointerMove(pointer_at(&viewer, 77, now)), now);
    assert_eq!(viewer.hover(), Some(77));

    viewer.handle_input(InputEvent::PointerLeave, now);
    assert_eq!(viewer.hover(), None);
}

// ===== Selection API =====

#[test]
fn set_selected_range_clamps_and_reports_changes_once() {
    let (mut viewer, events) = ready(1000);

    viewer.set_selected_range(Some(SelectionRange::new(990, 5000)));
    viewer.set_selected_range(Some(SelectionRange::new(990, 999)));

    assert_eq!(viewer.selected_range(), Some(SelectionRange::new(990, 999)));
    assert_eq!(events.borrow().len(), 1);
}

// ===== Layout =====

#[test]
fn taller_viewport_clamps_scroll() {
    let (mut viewer, events) = ready(1000);
    viewer.set_scroll_target(39.0);

    viewer.set_viewport_size(80.0, 60.0);

    assert_eq!(viewer.scroll_top(), 3.0);
    assert_eq!(
        *events.borrow(),
        vec![
            ViewerEvent::Scroll { scroll_top: 39.0 },
            ViewerEvent::Scroll { scroll_top: 3.0 },
        ]
    );
}

#[test]
fn toggle_ascii_flips_column() {
    let (mut viewer, _events) = ready(1000);
    viewer.toggle_ascii();
    assert!(!viewer.metrics().unwrap().show_ascii);
    viewer.toggle_ascii();
    assert!(viewer.metrics().unwrap().show_ascii);
}

// ===== Failures =====

#[test]
fn failed_load_reports_once_and_waits_for_retry() {
    let source = Arc::new(Switchable {
        inner: MemorySource::sequential(1000),
        broken: AtomicBool::new(true),
    });
    let mut viewer = viewer_over(source.clone());
    let events = record(&mut viewer);
    viewer.set_viewport_size(80.0, 24.0);

    let outcome = viewer.tick(Instant::now(), &mut NullRenderer).unwrap();
    assert_eq!(outcome, FrameOutcome::Stale);
    assert!(viewer.last_error().is_some());
    assert!(matches!(
        events.borrow().as_slice(),
        [ViewerEvent::LoadFailed { message }] if message.contains("revoked")
    ));

    source.broken.store(false, Ordering::SeqCst);
    let outcome = viewer.tick(Instant::now(), &mut NullRenderer).unwrap();
    assert_eq!(outcome, FrameOutcome::Stale, "no automatic retry");

    viewer.retry();
    let outcome = viewer.tick(Instant::now(), &mut NullRenderer).unwrap();
    assert_eq!(outcome, FrameOutcome::Painted);
    assert!(viewer.last_error().is_none());
    assert_eq!(events.borrow().len(), 1);
}

// ===== Open =====

#[test]
fn open_resets_selection_scroll_and_frame() {
    let (mut viewer, events) = ready(1000);
    viewer.set_selected_range(Some(SelectionRange::single(10)));
    viewer.scroll_to_offset(900, Instant::now());
    events.borrow_mut().clear();

    viewer.open(Arc::new(MemorySource::new(vec![1, 2, 3])));

    assert_eq!(viewer.selected_range(), None);
    assert_eq!(viewer.highlighted_offset(), None);
    assert_eq!(viewer.scroll_top(), 0.0);
    assert_eq!(viewer.source_size(), 3);
    assert!(viewer.last_frame().is_none());
    assert_eq!(
        *events.borrow(),
        vec![
            ViewerEvent::SelectionChange { range: None },
            ViewerEvent::OffsetHighlight { offset: None },
            ViewerEvent::Scroll { scroll_top: 0.0 },
        ]
    );

    let outcome = viewer.tick(Instant::now(), &mut NullRenderer).unwrap();
    assert_eq!(outcome, FrameOutcome::Painted);
    assert_eq!(&viewer.last_frame().unwrap().rows[0].bytes[..], &[1, 2, 3]);
}
