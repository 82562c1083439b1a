//! LRU cache of assembled rows.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of rows kept.
pub const DEFAULT_ROW_CAPACITY: usize = 1024;

/// Key for row cache lookup.
///
/// Includes the row width so a layout change never serves a row cut for a
/// different `bytes_per_row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey {
    /// Row index from the start of the source.
    pub row: u64,
    /// Bytes per row when the row was assembled.
    pub bytes_per_row: u64,
}

/// LRU cache of complete rows.
///
/// Rows are derived from chunks and may straddle a chunk boundary, so the
/// owning [`ChunkCache`](super::ChunkCache) clears this cache wholesale
/// whenever any chunk is loaded or evicted.
#[derive(Debug)]
pub struct RowCache {
    rows: LruCache<RowKey, Arc<[u8]>>,
}

impl RowCache {
    /// Create a cache holding up to `capacity` rows.
    ///
    /// If capacity is 0, uses [`DEFAULT_ROW_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_ROW_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            rows: LruCache::new(capacity),
        }
    }

    /// Look up a row, marking it most recently used.
    pub fn get(&mut self, key: &RowKey) -> Option<Arc<[u8]>> {
        self.rows.get(key).cloned()
    }

    /// Store a row, evicting the least recently used one when full.
    pub fn put(&mut self, key: RowKey, bytes: Arc<[u8]>) {
        self.rows.put(key, bytes);
    }

    /// Drop every cached row.
    pub fn invalidate(&mut self) {
        self.rows.clear();
    }

    /// Number of cached rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows are cached.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for RowCache {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_CAPACITY)
    }
}
