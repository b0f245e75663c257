//! # pdfcards
//!
//! Turns PDF decks into flashcard and dictionary JSON for a static site.
//!
//! Every page of a card deck becomes a card: the largest non-background
//! image on the page is extracted to disk and the largest-font text block
//! becomes the title. Dictionary mode keeps each page's full text instead.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfcards::{ExtractConfig, Pipeline};
//!
//! fn main() -> pdfcards::Result<()> {
//!     let report = Pipeline::new(ExtractConfig::cards()).run("decks/".as_ref())?;
//!     println!("{} cards written to {}", report.records(), report.output_file.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: PDF reading on top of lopdf (text spans, image placements)
//! - [`extract`]: background detection, image and title selection
//! - [`pipeline`]: sequential batch run with a single final JSON write

pub mod config;
pub mod error;
pub mod extract;
pub mod input;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;

pub use config::{
    DictionaryOptions, ExtractConfig, HeuristicConfig, IdAssignment, Mode, OutputPaths,
};
pub use error::{Error, Result};
pub use extract::{
    select_image, select_title, BackgroundDetector, CardExtractor, DictionaryExtractor,
    IdAllocator, ImageWriter, PageRenderer, PdftoppmRenderer,
};
pub use input::{enumerate_inputs, is_pdf_path};
pub use model::{Card, DictionaryPage, DictionaryRecord, Document, Page, PageImage, Rect, TextBlock};
pub use parser::{ParseOptions, PdfParser};
pub use pipeline::{DocumentFailure, Pipeline, RunOutput, RunReport};

use std::path::Path;

/// Parse a PDF file into pages, images and text blocks.
///
/// # Example
///
/// ```no_run
/// let doc = pdfcards::parse_file("deck.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    PdfParser::open(path)?.parse()
}

/// Parse a PDF file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    PdfParser::open_with_options(path, options)?.parse()
}

/// Parse a PDF from bytes, naming the document `name`.
pub fn parse_bytes(data: &[u8], name: &str) -> Result<Document> {
    PdfParser::from_bytes(data, name)?.parse()
}

/// Extract the cards of a single PDF, writing images into `images_dir`.
///
/// Ids start at 0. Use a [`Pipeline`] to number cards across several files.
///
/// # Example
///
/// ```no_run
/// let cards = pdfcards::extract_cards("deck.pdf", "public/cards").unwrap();
/// for card in &cards {
///     println!("{}: {}", card.id, card.title);
/// }
/// ```
pub fn extract_cards<P: AsRef<Path>, D: AsRef<Path>>(path: P, images_dir: D) -> Result<Vec<Card>> {
    let doc = parse_file_with_options(path, ParseOptions::new().lenient().layout_only())?;
    let writer = ImageWriter::new(images_dir.as_ref(), "./cards/");
    let extractor = CardExtractor::new(HeuristicConfig::default(), writer);
    let mut ids = IdAllocator::new(IdAssignment::Sequential);
    Ok(extractor.extract(&doc, &mut ids))
}

/// Extract the full-text dictionary record of a single PDF.
pub fn extract_dictionary<P: AsRef<Path>>(path: P) -> Result<DictionaryRecord> {
    let path = path.as_ref();
    let doc = parse_file_with_options(path, ParseOptions::new().lenient().text_only())?;
    let config = ExtractConfig::dictionary();
    let writer = ImageWriter::new(&config.output.images_dir, config.output.image_url_prefix);
    Ok(DictionaryExtractor::new(config.dictionary, writer).extract(&doc, path))
}
