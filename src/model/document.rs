//! Parsed document, page, image and text block types.

/// An axis-aligned rectangle in PDF user space (points).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding box of a set of points.
    pub fn bounding(points: &[(f32, f32)]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(px, py) in points {
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Area in square points.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// An embedded image referenced by a page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// PDF object id of the image XObject
    pub object_id: (u32, u16),
    /// Bytes as they would be written to disk (encoded payload or decoded samples)
    pub data: Vec<u8>,
    /// Lowercase hex MD5 of `data`; `None` when the stream could not be read
    pub hash: Option<String>,
    /// Native file extension (e.g. "jpg")
    pub extension: String,
    /// Placement rectangles on the page, in drawing order
    pub rects: Vec<Rect>,
}

impl PageImage {
    /// First placement rectangle on the page, if the image is drawn at all.
    pub fn first_rect(&self) -> Option<&Rect> {
        self.rects.first()
    }
}

/// A block of text with its most salient font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Concatenated span text
    pub text: String,
    /// Largest font size among the block's spans
    pub max_font_size: f32,
}

impl TextBlock {
    /// Create a new text block.
    pub fn new(text: impl Into<String>, max_font_size: f32) -> Self {
        Self {
            text: text.into(),
            max_font_size,
        }
    }

    /// Check if the block has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A single page of a parsed document.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Images referenced by the page, in resource order
    pub images: Vec<PageImage>,
    /// Text blocks in reading order
    pub blocks: Vec<TextBlock>,
    /// Line-wrapped plain text of the page
    pub plain_text: String,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            images: Vec::new(),
            blocks: Vec::new(),
            plain_text: String::new(),
        }
    }

    /// Create an empty US Letter page.
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Zero-based page index, as used in output file names.
    pub fn index(&self) -> u32 {
        self.number.saturating_sub(1)
    }

    /// Page area in square points.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Builder-style image addition.
    pub fn with_image(mut self, image: PageImage) -> Self {
        self.images.push(image);
        self
    }

    /// Builder-style text block addition.
    pub fn with_block(mut self, block: TextBlock) -> Self {
        self.blocks.push(block);
        self
    }
}

/// A parsed source PDF.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// File stem of the source, used as id prefix and image namespace
    pub name: String,
    /// Pages in document order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create an empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: Vec::new(),
        }
    }

    /// Add a page.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// File-system safe variant of the document name.
    ///
    /// Every character that is not alphanumeric becomes `_`.
    pub fn safe_name(&self) -> String {
        safe_name(&self.name)
    }
}

/// Replace every non-alphanumeric character with `_`.
pub fn safe_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
