//! Detection of repeated decorative images (logos, slide backgrounds).

use std::collections::{HashMap, HashSet};

use crate::config::HeuristicConfig;
use crate::model::Document;

/// Flags image hashes that recur on too many pages of one document.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundDetector {
    min_pages: f64,
    page_fraction: f64,
}

impl BackgroundDetector {
    /// Create a detector from the heuristic thresholds.
    pub fn new(config: &HeuristicConfig) -> Self {
        Self {
            min_pages: config.background_min_pages,
            page_fraction: config.background_page_fraction,
        }
    }

    /// Occurrence count above which a hash is treated as background.
    pub fn threshold(&self, page_count: usize) -> f64 {
        self.min_pages.max(page_count as f64 * self.page_fraction)
    }

    /// Hashes occurring strictly more often than [`threshold`](Self::threshold).
    ///
    /// Every image instance on every page counts once. Images without a hash
    /// are not counted.
    pub fn detect(&self, doc: &Document) -> HashSet<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for page in &doc.pages {
            for hash in page.images.iter().filter_map(|img| img.hash.as_deref()) {
                *counts.entry(hash).or_insert(0) += 1;
            }
        }

        let threshold = self.threshold(doc.page_count());
        let ignored: HashSet<String> = counts
            .into_iter()
            .filter(|&(_, count)| count as f64 > threshold)
            .map(|(hash, _)| hash.to_string())
            .collect();

        if !ignored.is_empty() {
            log::info!(
                "Found {} background/repeated images to ignore in {}",
                ignored.len(),
                doc.name
            );
        }
        ignored
    }
}

impl Default for BackgroundDetector {
    fn default() -> Self {
        Self::new(&HeuristicConfig::default())
    }
}
