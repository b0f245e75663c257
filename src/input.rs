//! Resolution of the input argument into an ordered list of PDF files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Check if a path has a `.pdf` extension, in any letter case.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// List the PDFs named by `input`.
///
/// A PDF file yields itself. A directory yields the PDFs directly inside it,
/// or every PDF below it when `recursive` is set, ordered by file name
/// within each directory. Symbolic links are followed. Anything else is
/// [`Error::InvalidInput`].
pub fn enumerate_inputs(input: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if input.is_file() && is_pdf_path(input) {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(Error::InvalidInput(input.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let files: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", input.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_pdf_path(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    log::info!("Found {} PDF files in {}", files.len(), input.display());
    Ok(files)
}
