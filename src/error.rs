//! Error types for the pdfcards library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfcards operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while turning PDFs into cards.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// The input path is neither a PDF file nor a directory.
    #[error("Invalid input {}: expected a PDF file or a directory containing PDFs", .0.display())]
    InvalidInput(PathBuf),

    /// Error reading or writing an embedded image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error rasterising a page.
    #[error("Page render error: {0}")]
    Render(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
