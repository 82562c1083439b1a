//! Domain model types (pure).
//!
//! All types in this module are plain data with no I/O.

pub mod byte_range;
pub mod error;
pub mod event;
pub mod key_action;

// Re-export for convenience
pub use byte_range::{is_offset_in_range, ByteRange, SelectionRange};
pub use error::{InputError, LoadError, ReadError};
pub use event::{ViewerEvent, ViewerObserver};
pub use key_action::{KeyAction, NavKey};
