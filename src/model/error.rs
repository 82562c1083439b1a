//! Error types for hexview.
//!
//! Errors are `thiserror` enums composed with `?` and `From`.
//!
//! # Error Hierarchy
//!
//! - [`LoadError`] - a single chunk-load attempt failed or was superseded
//!   - `Cancelled` - a newer scroll target replaced this load; always dropped silently
//!   - `SourceRead` - the byte source failed; reported upward as a non-fatal banner
//! - [`ReadError`] - low-level result of one cancellable read
//! - [`InputError`] - opening the file to view failed (fatal at startup)
//!
//! # Conditions that are not errors
//!
//! - Out-of-bounds ranges are clamped to the source size.
//! - A zero-size viewport yields no layout (`None`), and every range
//!   computed from it is empty.

use crate::model::ByteRange;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Failure of one `ensure_range` attempt.
///
/// Cloneable so the viewport can keep the most recent failure for the host
/// while the error is also delivered to observers.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The load was superseded by a newer request.
    ///
    /// Callers treat this as a no-op. It is never shown to the user and a
    /// cancelled load never mutates cache state.
    #[error("load cancelled")]
    Cancelled,

    /// The byte source failed while reading `range`.
    ///
    /// **Recovery**: the viewport stays in its loading state and keeps
    /// painting the last good frame. The host may call `retry()`; nothing is
    /// retried automatically.
    #[error("failed to read bytes {}..{}: {source}", .range.start, .range.end)]
    SourceRead {
        /// Byte range that was being read.
        range: ByteRange,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl LoadError {
    /// Check if this is the silent cancellation case.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }

    /// Wrap a low-level read failure for `range`.
    pub fn from_read(range: ByteRange, err: ReadError) -> Self {
        match err {
            ReadError::Aborted => LoadError::Cancelled,
            ReadError::Io(source) => LoadError::SourceRead {
                range,
                source: Arc::new(source),
            },
        }
    }
}

/// Result of a single cancellable byte-source read.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The cancellation token fired before or after the read.
    #[error("read aborted")]
    Aborted,

    /// The source itself failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors opening the file to view.
#[derive(Debug, Error)]
pub enum InputError {
    /// The given path does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use hexview::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.bin")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.bin"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// The path exists but is not a regular file.
    #[error("Not a regular file: {path}")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// Any other I/O failure (permissions, disk errors).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
