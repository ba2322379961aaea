//! Frame timing.

/// Page-to-frame sequence planning.
pub mod sequence;
