//! Acceptance scenarios for the viewer engine.
//!
//! Each test drives `HexViewer` through its public API only. Loads run on a
//! `DeferredExecutor` (or `InlineExecutor` where ordering does not matter)
//! so completion order is decided by the test.

use hexview::cache::{ChunkCache, ChunkCacheConfig, DeferredExecutor, InlineExecutor};
use hexview::model::{ByteRange, SelectionRange, ViewerEvent};
use hexview::render::{FrameOutcome, RenderFrame, Renderer};
use hexview::source::{CancellationToken, MemorySource};
use hexview::state::{InputEvent, PointerEventData};
use hexview::view_state::position_of;
use hexview::viewer::{HexViewer, ViewerConfig};
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

#[derive(Default)]
struct Recorder {
    frames: Vec<RenderFrame>,
}

impl Renderer for Recorder {
    type Error = Infallible;

    fn paint(&mut self, frame: &RenderFrame) -> Result<(), Infallible> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

type Events = Rc<RefCell<Vec<ViewerEvent>>>;

fn record(viewer: &mut HexViewer) -> Events {
    let events: Events = Rc::default();
    let sink = Rc::clone(&events);
    viewer.subscribe(move |event: &ViewerEvent| sink.borrow_mut().push(event.clone()));
    events
}

/// 80x24 viewer over `size` sequential bytes with its first frame painted.
fn deferred_viewer(size: u64) -> (HexViewer, DeferredExecutor) {
    let executor = DeferredExecutor::new();
    let mut viewer = HexViewer::new(
        Arc::new(MemorySource::sequential(size as usize)),
        Box::new(executor.clone()),
        ViewerConfig::default(),
    );
    viewer.set_viewport_size(80.0, 24.0);
    executor.run_all();
    let outcome = viewer.tick(Instant::now(), &mut Recorder::default()).unwrap();
    assert_eq!(outcome, FrameOutcome::Painted);
    (viewer, executor)
}

fn pointer_at(viewer: &HexViewer, offset: u64, now: Instant) -> PointerEventData {
    let (x, y) = position_of(viewer.metrics().unwrap(), offset, viewer.scroll_top()).unwrap();
    PointerEventData::mouse(x, y, now)
}

fn click(viewer: &mut HexViewer, offset: u64, now: Instant) {
    let at = pointer_at(viewer, offset, now);
    viewer.handle_input(InputEvent::PointerDown(at), now);
    viewer.handle_input(InputEvent::PointerUp(at), now);
}

// ===== Scenario A: scroll to offset =====

#[test]
fn scenario_a_scroll_to_offset_centers_row_and_expires_highlight() {
    let executor = DeferredExecutor::new();
    let mut viewer = HexViewer::new(
        Arc::new(MemorySource::sequential(1000)),
        Box::new(executor.clone()),
        ViewerConfig::default(),
    );
    viewer.set_viewport_size(80.0, 24.0);
    executor.run_all();
    let start = Instant::now();
    viewer.tick(start, &mut Recorder::default()).unwrap();
    assert_eq!(viewer.metrics().unwrap().bytes_per_row, 16);

    let target = viewer.scroll_to_offset(500, start);

    // Row 31 centered: 31 * 16 <= 500 < 32 * 16, top = 31.5 - 24 / 2.
    assert_eq!(target, Some(19.5));
    assert_eq!(viewer.highlighted_offset(), Some(500));

    let mut recorder = Recorder::default();
    viewer.tick(start + Duration::from_millis(16), &mut recorder).unwrap();
    assert_eq!(viewer.scroll_top(), 19.5);
    let frame = recorder.frames.last().unwrap();
    let row = frame.rows.iter().find(|r| r.index == 31).unwrap();
    assert_eq!(row.offset, 496);
    assert!(frame.is_highlighted(500));

    viewer
        .tick(start + Duration::from_millis(1999), &mut recorder)
        .unwrap();
    assert_eq!(viewer.highlighted_offset(), Some(500));

    viewer
        .tick(start + Duration::from_millis(2000), &mut recorder)
        .unwrap();
    assert_eq!(viewer.highlighted_offset(), None);
    assert!(!recorder.frames.last().unwrap().is_highlighted(500));
}

#[test]
fn scenario_a_in_a_large_file_waits_for_the_load() {
    let (mut viewer, executor) = deferred_viewer(MIB);
    let events = record(&mut viewer);
    let now = Instant::now();

    let target = viewer.scroll_to_offset(500_000, now).unwrap();

    // 500_000 / 16 = row 31250.
    assert_eq!(target, 31_250.5 - 12.0);
    assert_eq!(viewer.scroll_top(), 0.0, "nothing commits before the bytes arrive");

    let mut recorder = Recorder::default();
    viewer.tick(now, &mut recorder).unwrap();
    let waiting = &recorder.frames[0];
    assert!(waiting.loading);
    assert_eq!(waiting.rows[0].offset, 0, "the old position keeps painting");

    executor.run_all();
    let outcome = viewer.tick(now, &mut recorder).unwrap();

    assert_eq!(outcome, FrameOutcome::Painted);
    assert_eq!(viewer.scroll_top(), target);
    let frame = recorder.frames.last().unwrap();
    assert!(frame.visible.contains(500_000));
    assert!(frame.rows.iter().all(|row| row.bytes.len() == 16));
    assert_eq!(
        *events.borrow(),
        vec![
            ViewerEvent::OffsetHighlight {
                offset: Some(500_000)
            },
            ViewerEvent::Scroll { scroll_top: target },
        ]
    );
}

// ===== Scenario B: bounded memory =====

#[test]
fn scenario_b_sequential_scroll_keeps_cache_bounded() {
    let config = ViewerConfig {
        chunk_size: 64 * KIB,
        cache_capacity: 50,
        ..ViewerConfig::default()
    };
    let mut viewer = HexViewer::new(
        Arc::new(MemorySource::sequential((10 * MIB) as usize)),
        Box::new(InlineExecutor),
        config,
    );
    viewer.set_viewport_size(80.0, 24.0);
    let mut recorder = Recorder::default();
    let now = Instant::now();
    let max_scroll = viewer.metrics().unwrap().max_scroll;

    let mut peak = 0;
    let mut target = 0.0;
    while viewer.scroll_top() < max_scroll {
        viewer.set_scroll_target(target);
        viewer.tick(now, &mut recorder).unwrap();
        viewer.tick(now, &mut recorder).unwrap();
        peak = peak.max(viewer.state().viewport.cache().len());
        target += 1500.0;
    }

    assert_eq!(viewer.scroll_top(), max_scroll);
    assert!(peak <= 50, "peak resident chunks {peak}");
    let last = recorder.frames.last().unwrap();
    assert_eq!(last.rows.last().unwrap().offset, 10 * MIB - 16);
}

#[test]
fn scenario_b_cache_alone_never_exceeds_capacity() {
    let mut cache = ChunkCache::new(
        Arc::new(MemorySource::sequential((10 * MIB) as usize)),
        ChunkCacheConfig {
            chunk_size: 64 * KIB,
            capacity: 50,
            eviction_buffer: 10,
            row_capacity: 1024,
        },
    );
    let token = CancellationToken::never();

    let mut start = 0;
    while start < 10 * MIB {
        let range = ByteRange::new(start, (start + 128 * KIB).min(10 * MIB));
        cache.ensure_range(range, &token).unwrap();
        assert!(cache.len() <= 50);
        assert!(cache.is_range_loaded(range));
        start += 32 * KIB;
    }
    assert_eq!(cache.read_bytes(ByteRange::new(10 * MIB - 4, 10 * MIB)), vec![252, 253, 254, 255]);
}

// ===== Scenario C: click, deselect, drag =====

#[test]
fn scenario_c_click_deselect_and_drag() {
    let (mut viewer, _executor) = deferred_viewer(1000);
    let events = record(&mut viewer);
    let now = Instant::now();

    click(&mut viewer, 42, now);
    assert_eq!(viewer.selected_range(), Some(SelectionRange::new(42, 42)));

    click(&mut viewer, 42, now);
    assert_eq!(viewer.selected_range(), None);

    viewer.handle_input(InputEvent::PointerDown(pointer_at(&viewer, 42, now)), now);
    viewer.handle_input(InputEvent::PointerMove(pointer_at(&viewer, 50, now)), now);
    viewer.handle_input(InputEvent::PointerUp(pointer_at(&viewer, 50, now)), now);
    assert_eq!(viewer.selected_range(), Some(SelectionRange::new(42, 50)));

    let selections: Vec<_> = events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            ViewerEvent::SelectionChange { range } => Some(*range),
            _ => None,
        })
        .collect();
    assert_eq!(
        selections.first(),
        Some(&Some(SelectionRange::single(42)))
    );
    assert_eq!(selections[1], None);
    assert_eq!(selections.last(), Some(&Some(SelectionRange::new(42, 50))));
}

#[test]
fn scenario_c_drag_from_selected_byte_does_not_deselect() {
    let (mut viewer, _executor) = deferred_viewer(1000);
    let now = Instant::now();

    click(&mut viewer, 42, now);
    assert_eq!(viewer.selected_range(), Some(SelectionRange::single(42)));

    viewer.handle_input(InputEvent::PointerDown(pointer_at(&viewer, 42, now)), now);
    viewer.handle_input(InputEvent::PointerMove(pointer_at(&viewer, 50, now)), now);
    viewer.handle_input(InputEvent::PointerUp(pointer_at(&viewer, 50, now)), now);

    assert_eq!(viewer.selected_range(), Some(SelectionRange::new(42, 50)));
}

// ===== Scenario D: superseded loads =====

#[test]
fn scenario_d_only_the_latest_target_commits() {
    let (mut viewer, executor) = deferred_viewer(MIB);
    let events = record(&mut viewer);
    let mut recorder = Recorder::default();
    let now = Instant::now();

    viewer.set_scroll_target(10_000.0);
    viewer.set_scroll_target(20_000.0);
    assert_eq!(executor.pending(), 2);

    // The second load finishes first.
    executor.run_last();
    viewer.tick(now, &mut recorder).unwrap();
    assert_eq!(viewer.scroll_top(), 20_000.0);

    // The first load's result arrives late and must not move the view.
    executor.run_next();
    viewer.tick(now, &mut recorder).unwrap();
    viewer.tick(now, &mut recorder).unwrap();

    assert_eq!(viewer.scroll_top(), 20_000.0);
    assert!(!viewer.is_loading());
    assert_eq!(
        *events.borrow(),
        vec![ViewerEvent::Scroll {
            scroll_top: 20_000.0
        }]
    );
    let frame = recorder.frames.last().unwrap();
    assert_eq!(frame.rows[0].index, 20_000);
}

#[test]
fn scenario_d_late_first_load_is_discarded_in_order_too() {
    let (mut viewer, executor) = deferred_viewer(MIB);
    let mut recorder = Recorder::default();
    let now = Instant::now();

    viewer.set_scroll_target(10_000.0);
    viewer.set_scroll_target(20_000.0);

    executor.run_next();
    viewer.tick(now, &mut recorder).unwrap();
    assert_eq!(viewer.scroll_top(), 0.0, "superseded load never commits");

    executor.run_all();
    viewer.tick(now, &mut recorder).unwrap();
    assert_eq!(viewer.scroll_top(), 20_000.0);
}
