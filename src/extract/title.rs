//! Title and description selection by font size.

use crate::model::TextBlock;

/// Split a page's text blocks into a title and a description.
///
/// Blank blocks are dropped and the rest ordered by font size, largest
/// first; equal sizes keep page order. The first block's trimmed text is the
/// title, the others are newline-joined into the description. Both are empty
/// when the page has no text.
pub fn select_title(blocks: &[TextBlock]) -> (String, String) {
    let mut candidates: Vec<&TextBlock> = blocks.iter().filter(|b| !b.is_blank()).collect();
    // sort_by is stable
    candidates.sort_by(|a, b| b.max_font_size.total_cmp(&a.max_font_size));

    let mut texts = candidates.into_iter().map(|b| b.text.trim());
    let title = texts.next().unwrap_or_default().to_string();
    let description = texts.collect::<Vec<_>>().join("\n");
    (title, description)
}
