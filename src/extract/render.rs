//! Whole-page rasterisation.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Rasterises a single PDF page to a PNG file.
pub trait PageRenderer {
    /// Render 1-based `page` of `pdf` at `scale` (1.0 = 72 dpi) into `output`.
    fn render_page(&self, pdf: &Path, page: u32, scale: f32, output: &Path) -> Result<()>;
}

/// [`PageRenderer`] backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    program: PathBuf,
}

impl PdftoppmRenderer {
    /// Use `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("pdftoppm")
    }

    /// Use a specific `pdftoppm` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolution passed to `-r` for a scale factor.
    pub fn dpi(scale: f32) -> u32 {
        (72.0 * scale).round().max(1.0) as u32
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_page(&self, pdf: &Path, page: u32, scale: f32, output: &Path) -> Result<()> {
        // -singlefile writes exactly `<prefix>.png`
        let prefix = output.with_extension("");
        let page_arg = page.to_string();

        log::debug!("Rendering page {} of {} to {}", page, pdf.display(), output.display());
        let result = Command::new(&self.program)
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(Self::dpi(scale).to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| Error::Render(format!("{}: {}", self.program.display(), e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::Render(format!(
                "pdftoppm failed on page {}: {}",
                page,
                stderr.trim()
            )));
        }

        let written = prefix.with_extension("png");
        if written != output {
            std::fs::rename(&written, output)?;
        }
        if !output.exists() {
            return Err(Error::Render(format!(
                "pdftoppm produced no output at {}",
                output.display()
            )));
        }
        Ok(())
    }
}
