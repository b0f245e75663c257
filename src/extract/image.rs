//! Representative image selection and image file output.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Page, PageImage};

/// Pick the page's card image.
///
/// Images are visited in listed order. Background hashes, unhashed images
/// and images never drawn on the page are skipped; the first placement
/// rectangle gives the area, and anything covering more than
/// `max_area_ratio` of the page is skipped. The strictly largest remaining
/// area wins, so ties go to the earlier image.
pub fn select_image<'a>(
    page: &'a Page,
    ignore: &HashSet<String>,
    max_area_ratio: f32,
) -> Option<&'a PageImage> {
    let limit = page.area() * max_area_ratio;
    let mut best: Option<&PageImage> = None;
    let mut best_area = 0.0f32;

    for image in &page.images {
        let Some(hash) = image.hash.as_deref() else {
            continue;
        };
        if ignore.contains(hash) {
            continue;
        }
        let Some(rect) = image.first_rect() else {
            continue;
        };

        let area = rect.area();
        if area > limit {
            continue;
        }
        if area > best_area {
            best_area = area;
            best = Some(image);
        }
    }

    best
}

/// File name of a page's image: `<safeName>_p<zeroBasedPageIndex>.<ext>`.
pub fn image_file_name(safe_name: &str, page_index: u32, extension: &str) -> String {
    format!("{}_p{}.{}", safe_name, page_index, extension)
}

/// Writes selected images into the site's image directory.
#[derive(Debug, Clone)]
pub struct ImageWriter {
    dir: PathBuf,
    url_prefix: String,
}

impl ImageWriter {
    /// Create a writer targeting `dir`; returned paths start with `url_prefix`.
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Site-relative path for a file name in the target directory.
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}{}", self.url_prefix, file_name)
    }

    /// Write the image bytes, returning the site-relative path.
    pub fn write(&self, safe_name: &str, page_index: u32, image: &PageImage) -> Result<String> {
        let file_name = image_file_name(safe_name, page_index, &image.extension);
        fs::write(self.dir.join(&file_name), &image.data)?;
        Ok(self.url_for(&file_name))
    }

    /// Like [`write`](Self::write), but a failure is logged and yields
    /// an empty path.
    pub fn write_or_skip(&self, safe_name: &str, page_index: u32, image: &PageImage) -> String {
        match self.write(safe_name, page_index, image) {
            Ok(url) => url,
            Err(e) => {
                log::warn!(
                    "Could not save image for page {} of {}: {}",
                    page_index + 1,
                    safe_name,
                    e
                );
                String::new()
            }
        }
    }
}
