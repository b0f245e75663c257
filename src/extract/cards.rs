//! Page-to-card extraction for one parsed document.

use std::collections::HashSet;

use crate::config::HeuristicConfig;
use crate::model::{Card, Document, Page};

use super::background::BackgroundDetector;
use super::ids::IdAllocator;
use super::image::{select_image, ImageWriter};
use super::title::select_title;

/// Turns the pages of a document into cards.
#[derive(Debug, Clone)]
pub struct CardExtractor {
    heuristics: HeuristicConfig,
    writer: ImageWriter,
}

impl CardExtractor {
    /// Create an extractor writing images through `writer`.
    pub fn new(heuristics: HeuristicConfig, writer: ImageWriter) -> Self {
        Self { heuristics, writer }
    }

    /// Extract the cards of one document, in page order.
    ///
    /// Background detection runs over the whole document first. Pages with
    /// neither a title nor an image are dropped.
    pub fn extract(&self, doc: &Document, ids: &mut IdAllocator) -> Vec<Card> {
        let ignore = BackgroundDetector::new(&self.heuristics).detect(doc);
        let safe_name = doc.safe_name();

        ids.begin_document();
        let mut cards = Vec::new();
        for page in &doc.pages {
            let image_path = self.page_image(page, &safe_name, &ignore);
            let (title, description) = select_title(&page.blocks);

            if title.is_empty() && image_path.is_empty() {
                log::debug!("Page {} of {} has no card content", page.number, doc.name);
                continue;
            }

            cards.push(Card {
                id: ids.next(page.index()),
                title,
                description,
                image_path,
                source: doc.name.clone(),
            });
        }
        ids.end_document(doc.page_count());

        cards
    }

    fn page_image(
        &self,
        page: &Page,
        safe_name: &str,
        ignore: &HashSet<String>,
    ) -> String {
        match select_image(page, ignore, self.heuristics.max_area_ratio) {
            Some(image) => self.writer.write_or_skip(safe_name, page.index(), image),
            None => String::new(),
        }
    }
}
