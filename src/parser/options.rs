//! Parsing options and configuration.

use super::layout::LayoutConfig;

/// Options for parsing PDF documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode for page-level failures
    pub error_mode: ErrorMode,

    /// What to extract from each page
    pub extract_mode: ExtractMode,

    /// How deep to follow nested Form XObjects
    pub max_form_depth: usize,

    /// Line and block grouping tunables
    pub layout: LayoutConfig,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable page content).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set extract mode.
    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    /// Extract plain text only.
    pub fn text_only(mut self) -> Self {
        self.extract_mode = ExtractMode::TextOnly;
        self
    }

    /// Extract images and text blocks only.
    pub fn layout_only(mut self) -> Self {
        self.extract_mode = ExtractMode::Layout;
        self
    }

    /// Set the Form XObject nesting limit.
    pub fn with_max_form_depth(mut self, depth: usize) -> Self {
        self.max_form_depth = depth;
        self
    }

    /// Set layout grouping tunables.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            extract_mode: ExtractMode::Full,
            max_form_depth: 8,
            layout: LayoutConfig::default(),
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// A page that cannot be read fails the whole document
    #[default]
    Strict,
    /// Log the failure and keep whatever the page yielded
    Lenient,
}

/// What content to extract from each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Images, text blocks and plain text
    #[default]
    Full,
    /// Images and text blocks (card extraction)
    Layout,
    /// Plain text only (dictionary extraction)
    TextOnly,
}

impl ExtractMode {
    pub(crate) fn wants_layout(self) -> bool {
        matches!(self, ExtractMode::Full | ExtractMode::Layout)
    }

    pub(crate) fn wants_text(self) -> bool {
        matches!(self, ExtractMode::Full | ExtractMode::TextOnly)
    }
}
