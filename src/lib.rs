//! hexview
//!
//! Windowed byte cache and virtualized hex grid engine, with a terminal host.
//!
//! Only the bytes around the visible rows are ever resident: a
//! [`cache::ChunkCache`] holds a bounded set of fixed-size chunks, and the
//! [`view_state::ViewportController`] commits a scroll position only once
//! the bytes for it are loaded. [`viewer::HexViewer`] ties geometry, loading,
//! input and painting together behind one per-frame `tick`.

pub mod cache;
pub mod config;
pub mod logging;
pub mod model;
pub mod render;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;
pub mod viewer;
