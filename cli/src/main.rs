//! pdfcards CLI - turn PDF decks into flashcard and dictionary JSON

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfcards::{
    enumerate_inputs, DictionaryOptions, ExtractConfig, HeuristicConfig, IdAssignment, Mode,
    Pipeline, RunReport,
};

#[derive(Parser)]
#[command(name = "pdfcards")]
#[command(version)]
#[command(about = "Extract flashcards and dictionary pages from PDFs", long_about = None)]
struct Cli {
    /// PDF file or directory of PDFs
    #[arg(value_name = "INPUT", env = "PDFCARDS_INPUT")]
    input: Option<PathBuf>,

    /// What to extract
    #[arg(long, value_enum, default_value = "cards", env = "PDFCARDS_MODE")]
    mode: ModeArg,

    /// Directory for the JSON output [default: docs/src/data]
    #[arg(long, value_name = "DIR", env = "PDFCARDS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory for extracted images [default: docs/public/cards or docs/public/dictionary_images]
    #[arg(long, value_name = "DIR", env = "PDFCARDS_IMAGES_DIR")]
    images_dir: Option<PathBuf>,

    /// Prefix of the imagePath written into the JSON [default: ./cards/ or ./dictionary_images/]
    #[arg(long, value_name = "PREFIX", env = "PDFCARDS_IMAGE_PREFIX")]
    image_prefix: Option<String>,

    /// Also look for PDFs in subdirectories
    #[arg(short, long, env = "PDFCARDS_RECURSIVE")]
    recursive: bool,

    /// Card id numbering
    #[arg(long, value_enum, default_value = "sequential", env = "PDFCARDS_IDS")]
    ids: IdsArg,

    /// Minimum page count above which a repeated image counts as background
    #[arg(long, default_value = "3", env = "PDFCARDS_BACKGROUND_MIN_PAGES")]
    background_min_pages: f64,

    /// Fraction of pages above which a repeated image counts as background
    #[arg(long, default_value = "0.1", env = "PDFCARDS_BACKGROUND_FRACTION")]
    background_fraction: f64,

    /// Ignore images covering more than this fraction of the page
    #[arg(long, default_value = "0.95", env = "PDFCARDS_MAX_AREA_RATIO")]
    max_area_ratio: f32,

    /// Dictionary mode: render every page to PNG with pdftoppm
    #[arg(long, env = "PDFCARDS_RENDER_PAGES")]
    render_pages: bool,

    /// Dictionary mode: render scale (1.0 = 72 dpi)
    #[arg(long, default_value = "1.5", env = "PDFCARDS_SCALE")]
    scale: f32,

    /// Dictionary mode: leave page titles out
    #[arg(long, env = "PDFCARDS_NO_TITLE")]
    no_title: bool,

    /// Dictionary mode: keep pages without text or image
    #[arg(
        long,
        default_value = "true",
        action = clap::ArgAction::Set,
        env = "PDFCARDS_KEEP_EMPTY_PAGES"
    )]
    keep_empty_pages: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// One card per page
    Cards,
    /// Full text of every page
    Dictionary,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Cards => Mode::Cards,
            ModeArg::Dictionary => Mode::Dictionary,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum IdsArg {
    /// 0, 1, 2, ... with no gaps
    Sequential,
    /// Document offset plus page index
    PageOffset,
}

impl From<IdsArg> for IdAssignment {
    fn from(ids: IdsArg) -> Self {
        match ids {
            IdsArg::Sequential => IdAssignment::Sequential,
            IdsArg::PageOffset => IdAssignment::PageOffset,
        }
    }
}

impl Cli {
    fn config(&self) -> ExtractConfig {
        let mut config = ExtractConfig::new(self.mode.into())
            .with_recursive(self.recursive)
            .with_ids(self.ids.into())
            .with_heuristics(HeuristicConfig {
                background_min_pages: self.background_min_pages,
                background_page_fraction: self.background_fraction,
                max_area_ratio: self.max_area_ratio,
            })
            .with_dictionary(DictionaryOptions {
                title_heuristic: !self.no_title,
                keep_empty_pages: self.keep_empty_pages,
                render_pages: self.render_pages,
                scale: self.scale,
            });

        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(dir) = &self.images_dir {
            config = config.with_images_dir(dir);
        }
        if let Some(prefix) = &self.image_prefix {
            config = config.with_image_url_prefix(prefix);
        }
        config
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let Some(input) = cli.input.clone() else {
        eprintln!("{}", "Usage: pdfcards <PDF_FILE_OR_DIRECTORY>".yellow());
        eprintln!("       pdfcards --help for more information");
        std::process::exit(1);
    };

    if let Err(e) = cmd_extract(&cli, &input) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(cli: &Cli, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config();
    log::debug!("Run configuration: {:?}", config);
    let files = enumerate_inputs(input, config.recursive)?;
    println!(
        "{} {} PDF file(s) in {}",
        "Found".cyan(),
        files.len(),
        input.display()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let pipeline = Pipeline::new(config);
    let report = pipeline.run_files_with_progress(&files, |index, path| {
        pb.set_position(index as u64);
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(name.into_owned());
    })?;
    pb.set_position(files.len() as u64);
    pb.finish_with_message("Done!");

    print_summary(pipeline.config().mode, &report);
    Ok(())
}

fn print_summary(mode: Mode, report: &RunReport) {
    let unit = match mode {
        Mode::Cards => "cards",
        Mode::Dictionary => "documents",
    };

    println!();
    println!(
        "{} {} {}",
        "Total processed:".green().bold(),
        report.records(),
        unit
    );
    println!("  {} {}", "├─".dimmed(), report.output_file.display());
    println!(
        "  {} {} of {} document(s) parsed",
        "└─".dimmed(),
        report.documents,
        report.inputs
    );

    if !report.failures.is_empty() {
        println!();
        println!("{}", "Skipped:".yellow().bold());
        for failure in &report.failures {
            println!("  {} {}: {}", "-".dimmed(), failure.path.display(), failure.error);
        }
    }
}
