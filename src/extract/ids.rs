//! Run-wide card id allocation.

use crate::config::IdAssignment;

/// Hands out card ids across every document of a run.
///
/// Call [`begin_document`](Self::begin_document) before a document's cards,
/// [`next`](Self::next) once per emitted card and
/// [`end_document`](Self::end_document) after the document parsed
/// successfully. Failed documents never reach `end_document` and consume
/// no ids.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    strategy: IdAssignment,
    next_id: u64,
    base: u64,
}

impl IdAllocator {
    /// Start at id 0.
    pub fn new(strategy: IdAssignment) -> Self {
        Self::starting_at(strategy, 0)
    }

    /// Start at an arbitrary id.
    pub fn starting_at(strategy: IdAssignment, start: u64) -> Self {
        Self {
            strategy,
            next_id: start,
            base: start,
        }
    }

    /// The strategy in use.
    pub fn strategy(&self) -> IdAssignment {
        self.strategy
    }

    /// Prepare for a new document.
    pub fn begin_document(&mut self) {
        self.base = self.next_id;
    }

    /// Id for a card built from the page with zero-based `page_index`.
    pub fn next(&mut self, page_index: u32) -> u64 {
        match self.strategy {
            IdAssignment::Sequential => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
            IdAssignment::PageOffset => self.base + u64::from(page_index),
        }
    }

    /// Close a document that had `page_count` pages.
    pub fn end_document(&mut self, page_count: usize) {
        if self.strategy == IdAssignment::PageOffset {
            self.next_id = self.base + page_count as u64;
        }
    }

    /// Id the next document would start from.
    pub fn peek(&self) -> u64 {
        self.next_id
    }
}
