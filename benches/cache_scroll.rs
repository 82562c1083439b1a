//! Sequential scroll benchmarks for the chunk cache and viewer.
//!
//! Scrolling end to end through a file must cost the same per step whatever
//! the file size, since only a bounded window is ever resident.
//!
//! Run with: cargo bench --bench cache_scroll

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hexview::cache::{ChunkCache, ChunkCacheConfig, InlineExecutor};
use hexview::model::ByteRange;
use hexview::render::{RenderFrame, Renderer};
use hexview::source::{CancellationToken, MemorySource};
use hexview::viewer::{HexViewer, ViewerConfig};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Renderer that only touches the row bytes.
struct Sink;

impl Renderer for Sink {
    type Error = Infallible;

    fn paint(&mut self, frame: &RenderFrame) -> Result<(), Infallible> {
        let total: usize = frame.rows.iter().map(|row| row.bytes.len()).sum();
        black_box(total);
        Ok(())
    }
}

/// Walk a 128 KiB window through the file in 32 KiB steps.
fn benchmark_ensure_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensure_range_sequential");

    for size_mib in [1u64, 10, 50] {
        let size = size_mib * MIB;
        let source = Arc::new(MemorySource::sequential(size as usize));
        group.throughput(Throughput::Bytes(size));

        group.bench_with_input(BenchmarkId::from_parameter(size_mib), &size, |b, &size| {
            b.iter(|| {
                let mut cache = ChunkCache::new(
                    source.clone(),
                    ChunkCacheConfig {
                        chunk_size: 64 * KIB,
                        capacity: 50,
                        eviction_buffer: 10,
                        row_capacity: 1024,
                    },
                );
                let token = CancellationToken::never();
                let mut start = 0;
                while start < size {
                    let range = ByteRange::new(start, (start + 128 * KIB).min(size));
                    black_box(cache.ensure_range(range, &token).ok());
                    start += 32 * KIB;
                }
                black_box(cache.len())
            });
        });
    }

    group.finish();
}

/// Row lookups on a warm cache, the per-frame hot path.
fn benchmark_row_bytes(c: &mut Criterion) {
    let size = 4 * MIB;
    let mut cache = ChunkCache::new(
        Arc::new(MemorySource::sequential(size as usize)),
        ChunkCacheConfig {
            chunk_size: 64 * KIB,
            capacity: 50,
            eviction_buffer: 10,
            row_capacity: 1024,
        },
    );
    cache
        .ensure_range(ByteRange::new(0, 256 * KIB), &CancellationToken::never())
        .ok();

    c.bench_function("row_bytes_warm_page", |b| {
        b.iter(|| {
            for row in 0..64 {
                black_box(cache.row_bytes(black_box(row), 16));
            }
        });
    });
}

/// Full frames while scrolling one page per tick through a 10 MiB file.
fn benchmark_viewer_scroll(c: &mut Criterion) {
    let source = Arc::new(MemorySource::sequential((10 * MIB) as usize));

    c.bench_function("viewer_scroll_10mib_1000_pages", |b| {
        b.iter(|| {
            let mut viewer = HexViewer::new(
                source.clone(),
                Box::new(InlineExecutor),
                ViewerConfig::default(),
            );
            viewer.set_viewport_size(80.0, 24.0);
            let now = Instant::now();
            let mut renderer = Sink;
            for page in 0..1000 {
                viewer.set_scroll_target(f64::from(page) * 24.0);
                let _ = viewer.tick(now, &mut renderer);
            }
            black_box(viewer.scroll_top())
        });
    });
}

criterion_group!(
    benches,
    benchmark_ensure_range,
    benchmark_row_bytes,
    benchmark_viewer_scroll
);
criterion_main!(benches);
