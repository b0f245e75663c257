//! Grouping of text spans into lines and blocks.
//!
//! Spans are grouped into lines by baseline, and lines into blocks by
//! vertical spacing, font size changes and indentation. Each block keeps the
//! largest font size among its spans, which is the only salience signal the
//! card heuristics use.

use std::cmp::Ordering;

use crate::model::TextBlock;

use super::content::{is_spaceless_script_char, TextSpan};

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line (weighted by text length)
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans,
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        Self {
            y: spans[0].y,
            x: spans[0].x,
            font_size,
            spans,
        }
    }

    /// Combined text of the spans.
    ///
    /// A space goes between two spans only when the horizontal gap between
    /// them is wider than a fifth of the average character width, and never
    /// between two characters of a spaceless script.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i == 0 {
                result.push_str(&span.text);
                continue;
            }

            let prev = &self.spans[i - 1];
            let gap = span.x - (prev.x + prev.width);

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * 0.5
            };

            let spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                && span.text.chars().next().is_some_and(is_spaceless_script_char);
            let has_space = prev.text.ends_with([' ', '\u{00A0}'])
                || span.text.starts_with([' ', '\u{00A0}']);

            if gap > avg_char_width * 0.2 && !spaceless && !has_space {
                result.push(' ');
            }
            result.push_str(&span.text);
        }

        result.trim().to_string()
    }

    /// Largest font size among the line's spans.
    pub fn max_font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.font_size).fold(0.0, f32::max)
    }
}

/// Tunables for line and block grouping.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// Baseline tolerance, as a fraction of the font size
    pub line_tolerance: f32,
    /// A gap larger than this multiple of the average line spacing starts a block
    pub paragraph_gap: f32,
    /// A font size change larger than this (points) starts a block
    pub font_size_jump: f32,
    /// A left-margin shift larger than this (points) starts a block
    pub indent_jump: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 0.3,
            paragraph_gap: 1.5,
            font_size_jump: 1.0,
            indent_jump: 20.0,
        }
    }
}

/// Groups spans into [`TextBlock`]s.
#[derive(Debug, Clone, Default)]
pub struct LayoutAnalyzer {
    config: LayoutConfig,
}

impl LayoutAnalyzer {
    /// Create an analyzer with custom tunables.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Build text blocks, top to bottom.
    pub fn blocks(&self, spans: Vec<TextSpan>) -> Vec<TextBlock> {
        let lines = self.group_spans_into_lines(spans);
        self.group_lines_into_blocks(lines)
            .into_iter()
            .map(|lines| {
                let text = lines
                    .iter()
                    .map(TextLine::text)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                let max_font_size = lines
                    .iter()
                    .map(TextLine::max_font_size)
                    .fold(0.0, f32::max);
                TextBlock::new(text, max_font_size)
            })
            .collect()
    }

    /// Y-based line grouping. PDF Y grows upwards, so lines come out top first.
    pub fn group_spans_into_lines(&self, mut spans: Vec<TextSpan>) -> Vec<TextLine> {
        spans.sort_by(|a, b| match b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
            other => other,
        });

        let mut lines: Vec<TextLine> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in spans {
            let tolerance = span.font_size * self.config.line_tolerance;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }

        if !current.is_empty() {
            lines.push(TextLine::from_spans(current));
        }

        lines
    }

    /// Group lines into blocks based on spacing, size and indentation.
    fn group_lines_into_blocks(&self, lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
        let avg_spacing = average_line_spacing(&lines);
        let mut blocks: Vec<Vec<TextLine>> = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();

        for line in lines {
            if let Some(prev) = current.last() {
                if self.should_break_block(prev, &line, avg_spacing) {
                    blocks.push(std::mem::take(&mut current));
                }
            }
            current.push(line);
        }

        if !current.is_empty() {
            blocks.push(current);
        }

        blocks
    }

    fn should_break_block(&self, prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
        let spacing = (prev.y - curr.y).abs();
        spacing > avg_spacing * self.config.paragraph_gap
            || (prev.font_size - curr.font_size).abs() > self.config.font_size_jump
            || (prev.x - curr.x).abs() > self.config.indent_jump
    }
}

/// Average baseline distance between consecutive lines (12pt fallback).
fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}
