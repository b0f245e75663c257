//! Output records serialised into the site's data files.

use serde::{Deserialize, Serialize};

/// One flashcard, built from a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Run-wide unique, increasing id
    pub id: u64,

    /// Text of the largest-font block on the page
    pub title: String,

    /// Remaining blocks, newline-joined, largest font first
    pub description: String,

    /// Site-relative path of the extracted image, or empty
    pub image_path: String,

    /// Base name of the source PDF
    pub source: String,
}

impl Card {
    /// Check if the card carries an image.
    pub fn has_image(&self) -> bool {
        !self.image_path.is_empty()
    }
}

/// Full-text extraction of one source PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    /// Base name of the source PDF
    pub source: String,

    /// Extracted pages in document order
    pub pages: Vec<DictionaryPage>,
}

/// One page of a [`DictionaryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryPage {
    /// Page number (1-indexed)
    pub page: u32,

    /// First text line, or "Page N" when the page has no text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Trimmed, non-empty text lines
    pub content: Vec<String>,

    /// Site-relative path of the rendered page image
    #[serde(
        rename = "imagePath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_path: Option<String>,

    /// Text exactly as extracted
    pub raw_text: String,
}

impl DictionaryPage {
    /// Check if the page has neither text lines nor an image.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.image_path.is_none()
    }
}
