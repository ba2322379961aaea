//! Page image discovery and decoding.

/// Decoding page image files into [`decode::PageImage`] values.
pub mod decode;
