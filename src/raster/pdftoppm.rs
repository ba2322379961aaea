use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::settings::DEFAULT_DPI;
use crate::foundation::error::{SlideError, SlideResult};
use crate::raster::Rasterizer;

/// Prefix of the page files written by [`PdftoppmRasterizer`] (`page-1.png`, `page-2.png`, ...).
pub const PAGE_PREFIX: &str = "page";

/// Return `true` when the `pdftoppm` binary can be spawned.
pub fn is_pdftoppm_on_path() -> bool {
    Command::new("pdftoppm")
        .arg("-v")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Rasterizes PDFs to PNG pages with the system `pdftoppm` binary.
#[derive(Clone, Debug)]
pub struct PdftoppmRasterizer {
    dpi: u32,
}

impl PdftoppmRasterizer {
    /// Rasterize at `dpi` dots per inch.
    pub fn new(dpi: u32) -> SlideResult<Self> {
        if dpi == 0 {
            return Err(SlideError::validation("pdftoppm dpi must be > 0"));
        }
        Ok(Self { dpi })
    }

    /// Resolution used for rasterization.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    fn command(&self, document: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new("pdftoppm");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(["-png", "-r", &self.dpi.to_string()])
            .arg(document)
            .arg(out_dir.join(PAGE_PREFIX));
        cmd
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, document: &Path, out_dir: &Path) -> SlideResult<()> {
        if !document.is_file() {
            return Err(SlideError::rasterize(format!(
                "document '{}' does not exist",
                document.display()
            )));
        }

        let output = self.command(document, out_dir).output().map_err(|e| {
            SlideError::rasterize(format!(
                "failed to spawn pdftoppm (is poppler-utils installed and on PATH?): {e}"
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlideError::rasterize(format!(
                "pdftoppm exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/pdftoppm.rs"]
mod tests;
