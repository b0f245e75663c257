//! Batch run over every input document.
//!
//! Documents are processed one after another in enumeration order. A
//! document that cannot be opened or parsed is logged, recorded in the
//! [`RunReport`] and skipped. The JSON file is written once, after the last
//! document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ExtractConfig, Mode};
use crate::error::{Error, Result};
use crate::extract::{
    CardExtractor, DictionaryExtractor, IdAllocator, ImageWriter, PageRenderer, PdftoppmRenderer,
};
use crate::input::enumerate_inputs;
use crate::model::{Card, DictionaryRecord, Document};
use crate::parser::PdfParser;
use crate::render::write_json;

/// Records produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutput {
    /// Card mode output
    Cards(Vec<Card>),
    /// Dictionary mode output
    Dictionary(Vec<DictionaryRecord>),
}

impl RunOutput {
    fn empty(mode: Mode) -> Self {
        match mode {
            Mode::Cards => RunOutput::Cards(Vec::new()),
            Mode::Dictionary => RunOutput::Dictionary(Vec::new()),
        }
    }

    /// Number of top-level records (cards or documents).
    pub fn len(&self) -> usize {
        match self {
            RunOutput::Cards(cards) => cards.len(),
            RunOutput::Dictionary(records) => records.len(),
        }
    }

    /// Check if nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cards, when this is card output.
    pub fn cards(&self) -> Option<&[Card]> {
        match self {
            RunOutput::Cards(cards) => Some(cards),
            RunOutput::Dictionary(_) => None,
        }
    }

    /// Dictionary records, when this is dictionary output.
    pub fn dictionary(&self) -> Option<&[DictionaryRecord]> {
        match self {
            RunOutput::Cards(_) => None,
            RunOutput::Dictionary(records) => Some(records),
        }
    }

    fn write(&self, path: &Path) -> Result<()> {
        match self {
            RunOutput::Cards(cards) => write_json(path, cards),
            RunOutput::Dictionary(records) => write_json(path, records),
        }
    }
}

/// A document that was skipped.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Source file
    pub path: PathBuf,
    /// Why it was skipped
    pub error: Error,
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct RunReport {
    /// JSON file that was written
    pub output_file: PathBuf,
    /// Number of input files considered
    pub inputs: usize,
    /// Number of documents processed successfully
    pub documents: usize,
    /// Everything that was written
    pub output: RunOutput,
    /// Documents that could not be processed
    pub failures: Vec<DocumentFailure>,
}

impl RunReport {
    /// Number of top-level records written.
    pub fn records(&self) -> usize {
        self.output.len()
    }
}

/// Sequential extraction pipeline.
pub struct Pipeline {
    config: ExtractConfig,
    renderer: Option<Box<dyn PageRenderer>>,
}

impl Pipeline {
    /// Create a pipeline. Page rendering, when enabled, uses `pdftoppm`.
    pub fn new(config: ExtractConfig) -> Self {
        let renderer: Option<Box<dyn PageRenderer>> = if config.dictionary.render_pages {
            Some(Box::new(PdftoppmRenderer::new()))
        } else {
            None
        };
        Self { config, renderer }
    }

    /// Replace the page renderer.
    pub fn with_renderer(mut self, renderer: Box<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Enumerate `input` and process every PDF found.
    pub fn run(&self, input: &Path) -> Result<RunReport> {
        let files = enumerate_inputs(input, self.config.recursive)?;
        self.run_files(&files)
    }

    /// Process an explicit list of PDF files.
    pub fn run_files(&self, files: &[PathBuf]) -> Result<RunReport> {
        self.run_files_with_progress(files, |_, _| {})
    }

    /// Process files, calling `progress` with the index and path of each
    /// document before it is processed.
    pub fn run_files_with_progress<F>(&self, files: &[PathBuf], mut progress: F) -> Result<RunReport>
    where
        F: FnMut(usize, &Path),
    {
        let output_file = self.config.output_file();
        fs::create_dir_all(&self.config.output.data_dir)?;
        fs::create_dir_all(&self.config.output.images_dir)?;

        let writer = ImageWriter::new(
            &self.config.output.images_dir,
            self.config.output.image_url_prefix.clone(),
        );
        let cards = CardExtractor::new(self.config.heuristics, writer.clone());
        let mut dictionary = DictionaryExtractor::new(self.config.dictionary, writer);
        if let Some(renderer) = self.renderer.as_deref() {
            dictionary = dictionary.with_renderer(renderer);
        }

        let mut ids = IdAllocator::new(self.config.ids);
        let mut output = RunOutput::empty(self.config.mode);
        let mut failures = Vec::new();
        let mut documents = 0;

        for (index, path) in files.iter().enumerate() {
            progress(index, path);
            log::info!("Processing {}...", path.display());

            let doc = match self.parse(path) {
                Ok(doc) => doc,
                Err(error) => {
                    log::error!("Failed to process {}: {}", path.display(), error);
                    failures.push(DocumentFailure {
                        path: path.clone(),
                        error,
                    });
                    continue;
                }
            };

            match &mut output {
                RunOutput::Cards(all) => all.extend(cards.extract(&doc, &mut ids)),
                RunOutput::Dictionary(all) => all.push(dictionary.extract(&doc, path)),
            }
            documents += 1;
        }

        output.write(&output_file)?;
        log::info!(
            "Total processed: {} records from {} documents",
            output.len(),
            documents
        );
        log::info!("Data saved to {}", output_file.display());

        Ok(RunReport {
            output_file,
            inputs: files.len(),
            documents,
            output,
            failures,
        })
    }

    fn parse(&self, path: &Path) -> Result<Document> {
        let parser = PdfParser::open_with_options(path, self.config.effective_parse_options())?;
        parser.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_list_writes_empty_array() {
        let dir = TempDir::new().unwrap();
        let config = ExtractConfig::cards().with_root(dir.path());
        let report = Pipeline::new(config).run_files(&[]).unwrap();

        assert_eq!(report.records(), 0);
        assert_eq!(fs::read_to_string(&report.output_file).unwrap(), "[]");
        assert!(dir.path().join("docs/public/cards").is_dir());
    }

    #[test]
    fn test_unreadable_document_is_reported() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("bogus.pdf");
        fs::write(&bogus, b"not a pdf at all").unwrap();

        let config = ExtractConfig::dictionary().with_root(dir.path());
        let report = Pipeline::new(config).run_files(&[bogus.clone()]).unwrap();

        assert_eq!(report.documents, 0);
        assert_eq!(report.inputs, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, bogus);
        assert_eq!(report.output, RunOutput::Dictionary(Vec::new()));
    }

    #[test]
    fn test_progress_sees_every_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![dir.path().join("a.pdf"), dir.path().join("b.pdf")];
        let config = ExtractConfig::cards().with_root(dir.path());

        let mut seen = Vec::new();
        Pipeline::new(config)
            .run_files_with_progress(&files, |i, p| seen.push((i, p.to_path_buf())))
            .unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], (1, files[1].clone()));
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = ExtractConfig::cards().with_root(dir.path());
        let err = Pipeline::new(config)
            .run(&dir.path().join("missing.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
