//! Letterbox compositing of page images onto the output canvas.

/// Single-image compositor.
pub mod frame;
/// Ordered batch compositing, optionally across a rayon pool.
pub mod pipeline;
