//! Per-job variables and run-wide settings.

/// Run-wide slideshow settings (canvas, paths, threading).
pub mod settings;
/// Per-job variables file and the slide duration policy.
pub mod variables;
