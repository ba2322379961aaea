//! Document rasterization collaborators.
//!
//! A [`Rasterizer`] writes one image per page into an output directory. Filenames are free-form
//! as long as natural filename order matches page order.

use std::path::Path;

use crate::foundation::error::SlideResult;

/// Image-directory passthrough rasterizer.
pub mod image_dir;
/// `pdftoppm` (poppler) rasterizer.
pub mod pdftoppm;

pub use image_dir::ImageDirRasterizer;
pub use pdftoppm::{PdftoppmRasterizer, is_pdftoppm_on_path};

/// Turns a document into page images.
pub trait Rasterizer {
    /// Write one image file per page of `document` into `out_dir`.
    ///
    /// `out_dir` exists and is empty when this is called.
    fn rasterize(&self, document: &Path, out_dir: &Path) -> SlideResult<()>;
}

impl<F> Rasterizer for F
where
    F: Fn(&Path, &Path) -> SlideResult<()>,
{
    fn rasterize(&self, document: &Path, out_dir: &Path) -> SlideResult<()> {
        self(document, out_dir)
    }
}
