//! Run configuration.
//!
//! Everything the pipeline needs is passed in through [`ExtractConfig`];
//! the defaults reproduce the layout of the flashcard site
//! (`docs/src/data`, `docs/public/...`).

use std::path::{Path, PathBuf};

use crate::parser::ParseOptions;

/// What kind of records to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One card per page: title, description and a representative image
    #[default]
    Cards,
    /// One record per document with every page's text
    Dictionary,
}

impl Mode {
    /// Name of the JSON file written into the data directory.
    pub fn output_file_name(self) -> &'static str {
        match self {
            Mode::Cards => "cards.json",
            Mode::Dictionary => "dictionary.json",
        }
    }

    fn default_images_dir(self) -> &'static str {
        match self {
            Mode::Cards => "cards",
            Mode::Dictionary => "dictionary_images",
        }
    }
}

/// How card ids are assigned across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdAssignment {
    /// 0, 1, 2, ... for every emitted card, with no gaps
    #[default]
    Sequential,
    /// Document base plus zero-based page index; the base advances by each
    /// parsed document's page count, so dropped pages leave gaps
    PageOffset,
}

/// Tunable thresholds of the card heuristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicConfig {
    /// Minimum background threshold, in pages
    pub background_min_pages: f64,
    /// Background threshold as a fraction of the document's page count
    pub background_page_fraction: f64,
    /// Images covering more than this fraction of the page are ignored
    pub max_area_ratio: f32,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            background_min_pages: 3.0,
            background_page_fraction: 0.1,
            max_area_ratio: 0.95,
        }
    }
}

/// Where output files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Directory receiving the JSON file
    pub data_dir: PathBuf,
    /// Directory receiving extracted or rendered images
    pub images_dir: PathBuf,
    /// Prefix joined with an image file name to form the JSON `imagePath`
    pub image_url_prefix: String,
}

impl OutputPaths {
    /// Site defaults for a mode, relative to `root` (usually the working directory).
    pub fn site_defaults(root: impl AsRef<Path>, mode: Mode) -> Self {
        let root = root.as_ref();
        let images = mode.default_images_dir();
        Self {
            data_dir: root.join("docs").join("src").join("data"),
            images_dir: root.join("docs").join("public").join(images),
            image_url_prefix: format!("./{}/", images),
        }
    }
}

/// Options of the dictionary extraction mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DictionaryOptions {
    /// Fill `title` with the first text line, or "Page N" when there is none
    pub title_heuristic: bool,
    /// Keep pages that have neither text nor a rendered image
    pub keep_empty_pages: bool,
    /// Rasterise every page into the images directory
    pub render_pages: bool,
    /// Rasterisation scale (1.0 = 72 dpi)
    pub scale: f32,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            title_heuristic: true,
            keep_empty_pages: true,
            render_pages: false,
            scale: 1.5,
        }
    }
}

/// Complete configuration of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Card or dictionary extraction
    pub mode: Mode,
    /// Output locations
    pub output: OutputPaths,
    /// Card heuristic thresholds
    pub heuristics: HeuristicConfig,
    /// Card id strategy
    pub ids: IdAssignment,
    /// Dictionary mode options
    pub dictionary: DictionaryOptions,
    /// Descend into subdirectories when the input is a directory
    pub recursive: bool,
    /// PDF parsing options; the extract mode is derived from `mode`
    pub parse: ParseOptions,
}

impl ExtractConfig {
    /// Configuration for `mode` with site-default paths under the working directory.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            output: OutputPaths::site_defaults(".", mode),
            heuristics: HeuristicConfig::default(),
            ids: IdAssignment::default(),
            dictionary: DictionaryOptions::default(),
            recursive: false,
            parse: ParseOptions::new().lenient(),
        }
    }

    /// Card extraction with defaults.
    pub fn cards() -> Self {
        Self::new(Mode::Cards)
    }

    /// Dictionary extraction with defaults.
    pub fn dictionary() -> Self {
        Self::new(Mode::Dictionary)
    }

    /// Put all outputs under `root` instead of the working directory.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.output = OutputPaths::site_defaults(root, self.mode);
        self
    }

    /// Set the JSON output directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.data_dir = dir.into();
        self
    }

    /// Set the images directory.
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.images_dir = dir.into();
        self
    }

    /// Set the `imagePath` prefix.
    pub fn with_image_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output.image_url_prefix = prefix.into();
        self
    }

    /// Set heuristic thresholds.
    pub fn with_heuristics(mut self, heuristics: HeuristicConfig) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Set the id strategy.
    pub fn with_ids(mut self, ids: IdAssignment) -> Self {
        self.ids = ids;
        self
    }

    /// Set dictionary options.
    pub fn with_dictionary(mut self, options: DictionaryOptions) -> Self {
        self.dictionary = options;
        self
    }

    /// Enable or disable recursive directory enumeration.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set PDF parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Full path of the JSON file this run writes.
    pub fn output_file(&self) -> PathBuf {
        self.output.data_dir.join(self.mode.output_file_name())
    }

    /// Parse options with the extract mode matching `mode`.
    pub(crate) fn effective_parse_options(&self) -> ParseOptions {
        match self.mode {
            Mode::Cards => self.parse.clone().layout_only(),
            Mode::Dictionary => self.parse.clone().text_only(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::cards()
    }
}
