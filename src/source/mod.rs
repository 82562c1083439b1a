//! Random-access byte sources.
//!
//! This module provides the capability the engine reads from:
//! - [`ByteSource`] - `size()` plus half-open `read_range(start, end)`
//! - [`MemorySource`] - an owned buffer, for tests and small inputs
//! - [`FileSource`] - a file on disk, read on demand
//! - [`read_cancellable`] - the token-checked read every chunk load goes through

use crate::model::ReadError;
use std::io;

pub mod cancellation;
pub mod file;

pub use cancellation::{CancellationSource, CancellationToken};
pub use file::FileSource;

/// A random-access, read-only byte source of known size.
///
/// Reads may block; the engine only calls them from load jobs, never from
/// the tick itself. `Send + Sync` so loads can run on worker threads.
pub trait ByteSource: Send + Sync {
    /// Total size in bytes.
    fn size(&self) -> u64;

    /// Read bytes `[start, end)`.
    ///
    /// Implementations may return fewer bytes when the range runs past the
    /// end of the source.
    fn read_range(&self, start: u64, end: u64) -> io::Result<Vec<u8>>;
}

/// Read `[start, end)` from `source`, honouring `token`.
///
/// The token is checked before the read and again after it returns, so a
/// load superseded while blocked in I/O still reports
/// [`ReadError::Aborted`] and its bytes are discarded.
pub fn read_cancellable(
    source: &dyn ByteSource,
    start: u64,
    end: u64,
    token: &CancellationToken,
) -> Result<Vec<u8>, ReadError> {
    if token.is_cancelled() {
        return Err(ReadError::Aborted);
    }
    let bytes = source.read_range(start, end)?;
    if token.is_cancelled() {
        return Err(ReadError::Aborted);
    }
    Ok(bytes)
}

/// Byte source over an owned buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    /// Wrap `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Source whose byte at offset `i` is `i % 256`, handy for tests.
    pub fn sequential(len: usize) -> Self {
        Self {
            bytes: (0..len).map(|i| (i % 256) as u8).collect(),
        }
    }
}

impl ByteSource for MemorySource {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_range(&self, start: u64, end: u64) -> io::Result<Vec<u8>> {
        let len = self.bytes.len();
        let start = usize::try_from(start).unwrap_or(len).min(len);
        let end = usize::try_from(end).unwrap_or(len).clamp(start, len);
        Ok(self.bytes[start..end].to_vec())
    }
}
