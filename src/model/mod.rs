//! Document model types.
//!
//! [`Document`] and its pages are the transient, parsed view of one PDF.
//! [`Card`] and [`DictionaryRecord`] are what ends up in the JSON files.

mod document;
mod output;

pub use document::{safe_name, Document, Page, PageImage, Rect, TextBlock};
pub use output::{Card, DictionaryPage, DictionaryRecord};
