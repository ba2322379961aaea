//! Value types and the error taxonomy shared by every pipeline stage.

/// Pad color parsing.
pub mod color;
/// Canvas, frame rate, and duration value types.
pub mod core;
/// Error taxonomy.
pub mod error;
