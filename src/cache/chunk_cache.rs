//! Fixed-capacity LRU cache of source chunks.

use super::loader::{fetch_chunks, Chunk, ChunkSpan, LoadPlan};
use super::row_cache::{RowCache, RowKey};
use crate::model::{ByteRange, LoadError};
use crate::source::{ByteSource, CancellationToken};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

/// Default chunk size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 64 * 1024;
/// Default hard capacity in chunks.
pub const DEFAULT_CHUNK_CAPACITY: usize = 50;
/// Default proactive eviction margin, in chunks, around a requested range.
pub const DEFAULT_EVICTION_BUFFER: u64 = 10;

/// Sizing for a [`ChunkCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCacheConfig {
    /// Bytes per chunk.
    pub chunk_size: u64,
    /// Maximum resident chunks.
    pub capacity: usize,
    /// Chunks kept on each side of a requested range before proactive eviction.
    pub eviction_buffer: u64,
    /// Maximum rows in the derived row cache.
    pub row_capacity: usize,
}

impl Default for ChunkCacheConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            capacity: DEFAULT_CHUNK_CAPACITY,
            eviction_buffer: DEFAULT_EVICTION_BUFFER,
            row_capacity: super::row_cache::DEFAULT_ROW_CAPACITY,
        }
    }
}

/// LRU cache of fixed-size chunks read from a [`ByteSource`].
///
/// # Invariants
/// - At most `capacity` chunks are resident at any time.
/// - A cancelled load never inserts chunks.
/// - The row cache is cleared whenever the resident chunk set changes.
///
/// Eviction is pure LRU on access order, preceded by a proactive pass that
/// drops chunks far outside the range being loaded.
pub struct ChunkCache {
    source: Arc<dyn ByteSource>,
    source_size: u64,
    chunk_size: u64,
    eviction_buffer: u64,
    chunks: LruCache<u64, Chunk>,
    rows: RowCache,
}

impl ChunkCache {
    /// Create an empty cache over `source`.
    ///
    /// Zero sizes in `config` fall back to the defaults.
    pub fn new(source: Arc<dyn ByteSource>, config: ChunkCacheConfig) -> Self {
        let chunk_size = if config.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            config.chunk_size
        };
        let capacity = NonZeroUsize::new(config.capacity)
            .or(NonZeroUsize::new(DEFAULT_CHUNK_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            source_size: source.size(),
            source,
            chunk_size,
            eviction_buffer: config.eviction_buffer,
            chunks: LruCache::new(capacity),
            rows: RowCache::new(config.row_capacity),
        }
    }

    /// The byte source chunks are read from.
    pub fn source(&self) -> &Arc<dyn ByteSource> {
        &self.source
    }

    /// Size of the byte source.
    pub fn source_size(&self) -> u64 {
        self.source_size
    }

    /// Bytes per chunk.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Maximum resident chunks.
    pub fn capacity(&self) -> usize {
        self.chunks.cap().get()
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if no chunks are resident.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Longest range the cache can hold resident at once.
    pub fn max_span(&self) -> u64 {
        self.chunk_size.saturating_mul(self.capacity() as u64)
    }

    /// Grow the capacity so any `span` contiguous bytes fit at once.
    ///
    /// A span may straddle one more chunk than it fills, so this reserves
    /// `ceil(span / chunk_size) + 1` chunks. Never shrinks. Returns `true`
    /// if the capacity changed.
    pub fn reserve_span(&mut self, span: u64) -> bool {
        let span = span.min(self.source_size);
        let needed = span.div_ceil(self.chunk_size).saturating_add(1);
        let needed = usize::try_from(needed).unwrap_or(usize::MAX);
        if needed <= self.capacity() {
            return false;
        }
        let Some(capacity) = NonZeroUsize::new(needed) else {
            return false;
        };
        info!(
            span,
            chunk_size = self.chunk_size,
            from = self.capacity(),
            to = needed,
            "Growing chunk cache to cover the viewport"
        );
        self.chunks.resize(capacity);
        true
    }

    /// Resident chunk indices in ascending order.
    pub fn resident_chunks(&self) -> Vec<u64> {
        let mut indices: Vec<u64> = self.chunks.iter().map(|(index, _)| *index).collect();
        indices.sort_unstable();
        indices
    }

    /// Check if the chunk at `index` is resident, without touching LRU order.
    pub fn contains_chunk(&self, index: u64) -> bool {
        self.chunks.contains(&index)
    }

    /// Check if every byte of `range` (clamped) is resident.
    ///
    /// Does not affect LRU order.
    pub fn is_range_loaded(&self, range: ByteRange) -> bool {
        match self.chunk_bounds(range) {
            Some((first, last)) => (first..=last).all(|index| self.chunks.contains(&index)),
            None => true,
        }
    }

    /// Load every chunk overlapping `range` that is not yet resident.
    ///
    /// Blocks on the byte source. Returns `Ok(true)` if any I/O happened,
    /// `Ok(false)` if everything was already resident.
    ///
    /// # Errors
    ///
    /// `LoadError::Cancelled` if `token` fired (the cache is left without the
    /// chunks that were being fetched), `LoadError::SourceRead` if the source
    /// failed (previously cached chunks are untouched).
    pub fn ensure_range(
        &mut self,
        range: ByteRange,
        token: &CancellationToken,
    ) -> Result<bool, LoadError> {
        let plan = self.plan_load(range);
        if plan.is_empty() {
            return Ok(false);
        }
        let chunks = fetch_chunks(self.source.as_ref(), &plan, token)?;
        if token.is_cancelled() {
            return Err(LoadError::Cancelled);
        }
        self.insert_chunks(chunks);
        Ok(true)
    }

    /// Prepare a load of `range` without doing any I/O.
    ///
    /// Proactively evicts chunks more than `eviction_buffer` chunks outside
    /// the range, promotes resident chunks inside it to most recently used,
    /// then evicts least recently used chunks so the missing ones will fit.
    /// Ranges longer than [`max_span`](Self::max_span) are truncated.
    pub fn plan_load(&mut self, range: ByteRange) -> LoadPlan {
        let Some((first, last)) = self.chunk_bounds(range) else {
            return LoadPlan {
                range: ByteRange::clamped(range.start, range.end, self.source_size),
                missing: Vec::new(),
            };
        };

        let capacity = self.capacity() as u64;
        let last = if last - first + 1 > capacity {
            debug!(first, last, capacity, "Requested range exceeds cache, truncating");
            first + capacity - 1
        } else {
            last
        };
        let range = ByteRange::clamped(
            range.start,
            range.end.min((last + 1).saturating_mul(self.chunk_size)),
            self.source_size,
        );

        self.evict_outside(
            first.saturating_sub(self.eviction_buffer),
            last.saturating_add(self.eviction_buffer),
        );

        let mut missing = Vec::new();
        for index in first..=last {
            if self.chunks.get(&index).is_none() {
                missing.push(self.span_of(index));
            }
        }

        // Make room for the incoming chunks without touching the ones just promoted.
        let mut evicted = 0usize;
        while self.chunks.len() + missing.len() > self.capacity() {
            match self.chunks.peek_lru() {
                Some((index, _)) if *index < first || *index > last => {
                    self.chunks.pop_lru();
                    evicted += 1;
                }
                _ => break,
            }
        }
        if evicted > 0 {
            debug!(evicted, "Evicted least recently used chunks");
            self.rows.invalidate();
        }

        LoadPlan { range, missing }
    }

    /// Store freshly fetched chunks as most recently used.
    ///
    /// Invalidates the row cache.
    pub fn insert_chunks(&mut self, chunks: Vec<Chunk>) {
        if chunks.is_empty() {
            return;
        }
        for chunk in chunks {
            if let Some((evicted, _)) = self.chunks.push(chunk.index, chunk) {
                debug!(evicted, "Evicted chunk at capacity");
            }
        }
        self.rows.invalidate();
    }

    /// Assemble `range` (clamped) from resident chunks.
    ///
    /// Best-effort: stops at the first missing chunk and returns the shorter
    /// prefix. Touched chunks become most recently used.
    pub fn read_bytes(&mut self, range: ByteRange) -> Vec<u8> {
        let range = ByteRange::clamped(range.start, range.end, self.source_size);
        let mut out = Vec::with_capacity(usize::try_from(range.len()).unwrap_or(0));
        let mut offset = range.start;

        while offset < range.end {
            let index = offset / self.chunk_size;
            let chunk_start = index * self.chunk_size;
            let Some(chunk) = self.chunks.get(&index) else {
                break;
            };
            let from = (offset - chunk_start) as usize;
            let to = ((range.end - chunk_start) as usize).min(chunk.bytes.len());
            if from >= to {
                break;
            }
            out.extend_from_slice(&chunk.bytes[from..to]);
            offset = chunk_start + to as u64;
        }

        out
    }

    /// Bytes of row `row` at `bytes_per_row` bytes per row.
    ///
    /// Served from the row cache when possible. Only complete rows are
    /// cached; a row whose chunks are not resident comes back short.
    pub fn row_bytes(&mut self, row: u64, bytes_per_row: u64) -> Arc<[u8]> {
        let key = RowKey { row, bytes_per_row };
        if let Some(hit) = self.rows.get(&key) {
            return hit;
        }

        let start = row.saturating_mul(bytes_per_row);
        let range = ByteRange::clamped(start, start.saturating_add(bytes_per_row), self.source_size);
        let bytes: Arc<[u8]> = Arc::from(self.read_bytes(range));
        if bytes.len() as u64 == range.len() {
            self.rows.put(key, Arc::clone(&bytes));
        }
        bytes
    }

    /// Number of rows currently cached.
    pub fn cached_rows(&self) -> usize {
        self.rows.len()
    }

    /// Drop every chunk and row.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.rows.invalidate();
    }

    /// First and last chunk index overlapping `range`, or `None` if empty.
    fn chunk_bounds(&self, range: ByteRange) -> Option<(u64, u64)> {
        let range = ByteRange::clamped(range.start, range.end, self.source_size);
        if range.is_empty() {
            return None;
        }
        Some((
            range.start / self.chunk_size,
            (range.end - 1) / self.chunk_size,
        ))
    }

    fn span_of(&self, index: u64) -> ChunkSpan {
        let start = index.saturating_mul(self.chunk_size);
        ChunkSpan {
            index,
            range: ByteRange::clamped(start, start.saturating_add(self.chunk_size), self.source_size),
        }
    }

    fn evict_outside(&mut self, low: u64, high: u64) {
        let stale: Vec<u64> = self
            .chunks
            .iter()
            .map(|(index, _)| *index)
            .filter(|index| *index < low || *index > high)
            .collect();
        if stale.is_empty() {
            return;
        }
        debug!(count = stale.len(), low, high, "Evicting chunks outside window");
        for index in stale {
            self.chunks.pop(&index);
        }
        self.rows.invalidate();
    }
}

impl std::fmt::Debug for ChunkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkCache")
            .field("source_size", &self.source_size)
            .field("chunk_size", &self.chunk_size)
            .field("capacity", &self.capacity())
            .field("resident", &self.resident_chunks())
            .finish()
    }
}

#[cfg(test)]
#[path = "chunk_cache_tests.rs"]
mod tests;
