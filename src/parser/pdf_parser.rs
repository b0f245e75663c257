//! Builds a [`Document`] from a [`PdfSource`].

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Document, Page};

use super::backend::{LopdfSource, PdfSource};
use super::layout::LayoutAnalyzer;
use super::options::{ErrorMode, ParseOptions};

/// PDF document parser.
pub struct PdfParser<S = LopdfSource> {
    source: S,
    name: String,
    options: ParseOptions,
}

impl PdfParser<LopdfSource> {
    /// Open a PDF file. The document is named after the file stem.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let source = LopdfSource::load_file(path)?;
        Ok(Self::new(source, document_name(path), options))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8], name: impl Into<String>) -> Result<Self> {
        Self::from_bytes_with_options(data, name, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(
        data: &[u8],
        name: impl Into<String>,
        options: ParseOptions,
    ) -> Result<Self> {
        let source = LopdfSource::load_bytes(data)?;
        Ok(Self::new(source, name, options))
    }
}

impl<S: PdfSource> PdfParser<S> {
    /// Wrap an already opened source.
    pub fn new(source: S, name: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            source,
            name: name.into(),
            options,
        }
    }

    /// Parse every page into a [`Document`].
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new(self.name.clone());
        for page_num in self.source.page_numbers() {
            document.add_page(self.parse_page(page_num)?);
        }
        Ok(document)
    }

    /// Parse a single page.
    fn parse_page(&self, page_num: u32) -> Result<Page> {
        let (width, height) = self.source.page_size(page_num)?;
        let mut page = Page::new(page_num, width, height);
        let mode = self.options.extract_mode;

        if mode.wants_layout() {
            let depth = self.options.max_form_depth;
            match self.source.page_images(page_num, depth) {
                Ok(images) => page.images = images,
                Err(e) => self.recover(page_num, "images", e)?,
            }

            match self.source.page_content(page_num, depth) {
                Ok(content) => {
                    for placement in &content.placements {
                        if let Some(image) = page
                            .images
                            .iter_mut()
                            .find(|img| img.object_id == placement.object_id)
                        {
                            image.rects.push(placement.rect);
                        }
                    }
                    page.blocks = LayoutAnalyzer::new(self.options.layout).blocks(content.spans);
                }
                Err(e) => self.recover(page_num, "content", e)?,
            }
        }

        if mode.wants_text() {
            match self.source.page_text(page_num) {
                Ok(text) => page.plain_text = text,
                Err(e) => self.recover(page_num, "text", e)?,
            }
        }

        Ok(page)
    }

    /// In strict mode propagate, in lenient mode log and carry on.
    fn recover(&self, page_num: u32, what: &str, err: Error) -> Result<()> {
        if self.options.error_mode == ErrorMode::Strict {
            return Err(err);
        }
        log::warn!(
            "Failed to extract {} from page {} of {}: {}",
            what,
            page_num,
            self.name,
            err
        );
        Ok(())
    }
}

/// Base name of a PDF path without its extension.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
