//! Conversion jobs: working directories, staged uploads, and the assembler state machine.

/// Slideshow assembler state machine.
pub mod assembler;
/// Staged input documents and their removal guard.
pub mod upload;
/// Job-scoped working directories.
pub mod workspace;

use std::sync::atomic::{AtomicU64, Ordering};

/// Token unique within this process and, through the pid, across concurrent processes.
pub(crate) fn job_token() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}
