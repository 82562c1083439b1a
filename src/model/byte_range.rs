//! Byte ranges and selection ranges.

use std::ops::Range;

/// Half-open byte range `[start, end)` within a byte source.
///
/// # Invariants
/// - `start <= end`
/// - Wherever a source size is known, both ends are clamped to `[0, size]`
///   by [`ByteRange::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteRange {
    /// First byte in the range (inclusive).
    pub start: u64,
    /// One past the last byte (exclusive).
    pub end: u64,
}

impl ByteRange {
    /// The empty range at offset 0.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Create a range, swapping the ends if they arrive reversed.
    pub fn new(start: u64, end: u64) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Create a range clamped to `[0, size]`.
    ///
    /// Out-of-bounds requests are never an error; they shrink.
    pub fn clamped(start: u64, end: u64, size: u64) -> Self {
        let range = Self::new(start, end);
        Self {
            start: range.start.min(size),
            end: range.end.min(size),
        }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Check if the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if `offset` lies within `[start, end)`.
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Check if `other` lies entirely within this range.
    ///
    /// An empty `other` is covered by anything.
    pub fn covers(&self, other: &ByteRange) -> bool {
        other.is_empty() || (other.start >= self.start && other.end <= self.end)
    }

    /// Position of `other` relative to this range's start, as a slice range.
    ///
    /// Returns `None` unless this range covers `other`.
    pub fn relative(&self, other: &ByteRange) -> Option<Range<usize>> {
        if !self.covers(other) {
            return None;
        }
        if other.is_empty() {
            return Some(0..0);
        }
        let start = usize::try_from(other.start - self.start).ok()?;
        let end = usize::try_from(other.end - self.start).ok()?;
        Some(start..end)
    }
}

/// Selection between an anchor byte and a cursor byte.
///
/// `start` is the anchor and `end` the cursor; they are unordered and only
/// normalized when queried. Both endpoints are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    /// Anchor endpoint (where the selection began).
    pub start: u64,
    /// Cursor endpoint (where the selection currently ends).
    pub end: u64,
}

impl SelectionRange {
    /// Create a selection from anchor and cursor.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Selection of exactly one byte.
    pub fn single(offset: u64) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Lower of the two endpoints.
    pub fn min(&self) -> u64 {
        self.start.min(self.end)
    }

    /// Higher of the two endpoints.
    pub fn max(&self) -> u64 {
        self.start.max(self.end)
    }

    /// Check if the selection covers exactly one byte.
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Number of selected bytes.
    pub fn len(&self) -> u64 {
        self.max() - self.min() + 1
    }

    /// Selections always hold at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if `offset` lies between the endpoints, inclusive.
    pub fn contains(&self, offset: u64) -> bool {
        is_offset_in_range(offset, Some(*self))
    }
}

/// Check if `offset` lies within an optional selection.
///
/// True iff `min(start, end) <= offset <= max(start, end)`; never true for
/// `None`.
pub fn is_offset_in_range(offset: u64, range: Option<SelectionRange>) -> bool {
    match range {
        Some(range) => range.min() <= offset && offset <= range.max(),
        None => false,
    }
}
