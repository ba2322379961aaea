use std::path::PathBuf;

use image::RgbaImage;
use rayon::prelude::*;

use crate::compose::frame::composite_path;
use crate::foundation::core::CanvasSpec;
use crate::foundation::error::{SlideError, SlideResult};

/// Thread configuration for batch compositing.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositeThreading {
    /// Composite pages on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count override (parallel mode only). `None` uses rayon's default.
    pub threads: Option<usize>,
}

/// Decode and letterbox every page, returning frames in input order.
///
/// Stops at the first failing page in input order, also in parallel mode.
pub fn composite_pages(
    pages: &[PathBuf],
    spec: &CanvasSpec,
    threading: &CompositeThreading,
) -> SlideResult<Vec<RgbaImage>> {
    if !threading.parallel {
        return pages.iter().map(|p| composite_path(p, spec)).collect();
    }

    let pool = build_thread_pool(threading.threads)?;
    let results: Vec<SlideResult<RgbaImage>> = pool.install(|| {
        pages
            .par_iter()
            .map(|p| composite_path(p, spec))
            .collect()
    });
    results.into_iter().collect()
}

fn build_thread_pool(threads: Option<usize>) -> SlideResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SlideError::validation(
            "composite threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SlideError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/pipeline.rs"]
mod tests;
