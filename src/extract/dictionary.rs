//! Full-text dictionary extraction for one parsed document.

use std::path::Path;

use crate::config::DictionaryOptions;
use crate::model::{DictionaryPage, DictionaryRecord, Document, Page};

use super::image::{image_file_name, ImageWriter};
use super::render::PageRenderer;

/// Turns the pages of a document into a [`DictionaryRecord`].
pub struct DictionaryExtractor<'a> {
    options: DictionaryOptions,
    images: ImageWriter,
    renderer: Option<&'a dyn PageRenderer>,
}

impl<'a> DictionaryExtractor<'a> {
    /// Create an extractor. Rendered pages go to the writer's directory.
    pub fn new(options: DictionaryOptions, images: ImageWriter) -> Self {
        Self {
            options,
            images,
            renderer: None,
        }
    }

    /// Rasterise pages through `renderer` when `render_pages` is set.
    pub fn with_renderer(mut self, renderer: &'a dyn PageRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Extract one record. `pdf` is the source file, needed for rendering.
    pub fn extract(&self, doc: &Document, pdf: &Path) -> DictionaryRecord {
        let safe_name = doc.safe_name();
        let pages = doc
            .pages
            .iter()
            .map(|page| self.extract_page(page, &safe_name, pdf))
            .filter(|page| {
                let keep = self.options.keep_empty_pages || !page.is_empty();
                if !keep {
                    log::debug!("Dropping empty page {} of {}", page.page, doc.name);
                }
                keep
            })
            .collect();

        DictionaryRecord {
            source: doc.name.clone(),
            pages,
        }
    }

    fn extract_page(&self, page: &Page, safe_name: &str, pdf: &Path) -> DictionaryPage {
        let content = content_lines(&page.plain_text);
        let title = self.options.title_heuristic.then(|| {
            content
                .first()
                .cloned()
                .unwrap_or_else(|| format!("Page {}", page.number))
        });

        DictionaryPage {
            page: page.number,
            title,
            image_path: self.render(page, safe_name, pdf),
            content,
            raw_text: page.plain_text.clone(),
        }
    }

    fn render(&self, page: &Page, safe_name: &str, pdf: &Path) -> Option<String> {
        if !self.options.render_pages {
            return None;
        }
        let renderer = self.renderer?;

        let file_name = image_file_name(safe_name, page.index(), "png");
        let output = self.images.dir().join(&file_name);
        match renderer.render_page(pdf, page.number, self.options.scale, &output) {
            Ok(()) => Some(self.images.url_for(&file_name)),
            Err(e) => {
                log::warn!("Could not render page {} of {}: {}", page.number, safe_name, e);
                None
            }
        }
    }
}

/// Trimmed, non-empty lines of extracted page text.
pub fn content_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
