//! PDF parsing module.

mod backend;
mod content;
mod images;
mod layout;
mod options;
mod pdf_parser;

pub use backend::{decode_text_simple, LopdfSource, PdfSource};
pub use content::{ImagePlacement, Matrix, PageContent, TextSpan};
pub use images::{content_hash, extract_payload, native_extension};
pub use layout::{LayoutAnalyzer, LayoutConfig, TextLine};
pub use options::{ErrorMode, ExtractMode, ParseOptions};
pub use pdf_parser::{document_name, PdfParser};
