//! Card and dictionary extraction from parsed documents.

mod background;
mod cards;
mod dictionary;
mod ids;
mod image;
mod render;
mod title;

pub use background::BackgroundDetector;
pub use cards::CardExtractor;
pub use dictionary::{content_lines, DictionaryExtractor};
pub use ids::IdAllocator;
pub use image::{image_file_name, select_image, ImageWriter};
pub use render::{PageRenderer, PdftoppmRenderer};
pub use title::select_title;
