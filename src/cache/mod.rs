//! Chunk and row caching over a byte source.
//!
//! - [`ChunkCache`] - fixed-capacity LRU of fixed-size chunks
//! - [`RowCache`] - LRU of assembled rows, invalidated on chunk changes
//! - [`loader`] - load planning, fetching, and background executors

pub mod chunk_cache;
pub mod loader;
pub mod row_cache;

pub use chunk_cache::{
    ChunkCache, ChunkCacheConfig, DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_SIZE,
    DEFAULT_EVICTION_BUFFER,
};
pub use loader::{
    fetch_chunks, Chunk, ChunkSpan, DeferredExecutor, InlineExecutor, LoadExecutor, LoadJob,
    LoadPlan, LoadResult, PendingLoad, ThreadExecutor, DEFAULT_LOADER_THREADS, MAX_FETCH_WORKERS,
};
pub use row_cache::{RowCache, RowKey, DEFAULT_ROW_CAPACITY};
