//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the handful of PDF capabilities the
//! card heuristics need, isolating the concrete PDF library (lopdf) from the
//! extraction logic.

use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::PageImage;

use super::content::{inherited, get_number, ContentInterpreter, PageContent};
use super::images::collect_page_images;

/// Abstract interface for PDF document access.
///
/// Page numbers are 1-based throughout.
pub trait PdfSource {
    /// Page numbers in document order.
    fn page_numbers(&self) -> Vec<u32>;

    /// Page width and height in points.
    fn page_size(&self, page: u32) -> Result<(f32, f32)>;

    /// Text spans and image placements from the page's content stream.
    fn page_content(&self, page: u32, max_form_depth: usize) -> Result<PageContent>;

    /// Image XObjects available to the page, with payload and hash but no
    /// placement rectangles.
    fn page_images(&self, page: u32, max_form_depth: usize) -> Result<Vec<PageImage>>;

    /// Line-wrapped plain text of the page.
    fn page_text(&self, page: u32) -> Result<String>;
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Concrete [`PdfSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Self::checked(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::checked(doc)
    }

    fn checked(doc: LopdfDocument) -> Result<Self> {
        // lopdf opens documents encrypted with an empty user password; anything
        // stronger fails in `load` with a decryption error.
        if doc.is_encrypted() {
            log::warn!("Document is encrypted, extracted content may be incomplete");
        }
        Ok(Self { doc })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        let pages = self.doc.get_pages();
        pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, pages.len() as u32))
    }
}

impl PdfSource for LopdfSource {
    fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    fn page_size(&self, page: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page)?;

        let page_box = inherited(&self.doc, page_id, b"CropBox")
            .or_else(|| inherited(&self.doc, page_id, b"MediaBox"))
            .and_then(|obj| match obj {
                Object::Reference(r) => self.doc.get_object(*r).ok(),
                other => Some(other),
            })
            .and_then(|obj| obj.as_array().ok());

        if let Some(array) = page_box {
            let coords: Vec<f32> = array.iter().filter_map(get_number).collect();
            if coords.len() >= 4 {
                return Ok(((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs()));
            }
        }

        log::debug!("Page {} has no usable page box, assuming Letter", page);
        Ok((612.0, 792.0))
    }

    fn page_content(&self, page: u32, max_form_depth: usize) -> Result<PageContent> {
        let page_id = self.page_id(page)?;
        ContentInterpreter::new(&self.doc, max_form_depth).interpret_page(page_id)
    }

    fn page_images(&self, page: u32, max_form_depth: usize) -> Result<Vec<PageImage>> {
        let page_id = self.page_id(page)?;
        Ok(collect_page_images(&self.doc, page_id, max_form_depth))
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.doc
            .extract_text(&[page])
            .map_err(|e| Error::PdfParse(format!("Page {}: {}", page, e)))
    }
}
