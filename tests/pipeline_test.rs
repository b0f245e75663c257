//! End-to-end runs of the card and dictionary pipelines on generated PDFs.

mod common;

use std::fs;
use std::path::Path;

use common::{card_page, simple_deck, PageSpec, PdfBuilder};
use pdfcards::{
    Card, DictionaryOptions, DictionaryRecord, ExtractConfig, IdAssignment, Pipeline,
    PageRenderer, Result,
};
use tempfile::TempDir;

fn read_cards(path: &Path) -> Vec<Card> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn card_config(root: &Path) -> ExtractConfig {
    ExtractConfig::cards().with_root(root.join("site"))
}

#[test]
fn test_single_deck_produces_cards_and_images() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("Fruit Deck.pdf");
    simple_deck(&pdf, "Fruit", 2);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    assert!(report.failures.is_empty());
    let cards = read_cards(&report.output_file);

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].id, 0);
    assert_eq!(cards[0].title, "Fruit 1");
    assert_eq!(cards[0].description, "about Fruit 1");
    assert_eq!(cards[0].source, "Fruit Deck");
    assert_eq!(cards[0].image_path, "./cards/Fruit_Deck_p0.jpg");
    assert_eq!(cards[1].image_path, "./cards/Fruit_Deck_p1.jpg");

    let images = dir.path().join("site/docs/public/cards");
    let written = fs::read(images.join("Fruit_Deck_p0.jpg")).unwrap();
    assert_eq!(&written[..2], &[0xFF, 0xD8]);
    assert!(images.join("Fruit_Deck_p1.jpg").exists());
}

#[test]
fn test_flate_image_is_written_as_png() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("deck.pdf");
    let mut builder = PdfBuilder::new();
    let photo = builder.flate_rgb(16, 16, [200, 40, 10]);
    builder
        .page(
            PageSpec::new()
                .text("Poppy", 24.0, 700.0)
                .image(photo, 100.0, 200.0, 200.0, 200.0),
        )
        .save(&pdf);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    let cards = read_cards(&report.output_file);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].image_path, "./cards/deck_p0.png");

    let written = fs::read(dir.path().join("site/docs/public/cards/deck_p0.png")).unwrap();
    assert!(written.starts_with(b"\x89PNG\r\n\x1a\n"));
    let image = image::load_from_memory(&written).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (16, 16));
    assert_eq!(image.get_pixel(3, 7).0, [200, 40, 10]);
}

#[test]
fn test_word_split_across_show_operators_stays_whole() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("deck.pdf");
    PdfBuilder::new()
        .page(
            PageSpec::new()
                .split_text(&["Vocab", "ulary"], 24.0, 700.0)
                .text("a list of words", 12.0, 620.0),
        )
        .save(&pdf);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    let cards = read_cards(&report.output_file);
    assert_eq!(cards[0].title, "Vocabulary");
    assert_eq!(cards[0].description, "a list of words");
}

#[test]
fn test_ids_are_contiguous_across_documents() {
    let dir = TempDir::new().unwrap();
    let decks = dir.path().join("decks");
    fs::create_dir(&decks).unwrap();
    simple_deck(&decks.join("a.pdf"), "A", 3);
    simple_deck(&decks.join("b.pdf"), "B", 1);
    simple_deck(&decks.join("c.pdf"), "C", 2);

    let report = Pipeline::new(card_config(dir.path())).run(&decks).unwrap();
    let cards = read_cards(&report.output_file);

    let ids: Vec<u64> = cards.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    let sources: Vec<&str> = cards.iter().map(|c| c.source.as_str()).collect();
    assert_eq!(sources, vec!["a", "a", "a", "b", "c", "c"]);
}

#[test]
fn test_ids_stay_contiguous_when_pages_are_dropped() {
    let dir = TempDir::new().unwrap();
    let decks = dir.path().join("decks");
    fs::create_dir(&decks).unwrap();

    let mut builder = PdfBuilder::new();
    let first = card_page(&mut builder, "One", "first", b"one");
    builder
        .page(first)
        .page(PageSpec::new())
        .page(PageSpec::new().text("Three", 20.0, 700.0))
        .save(&decks.join("a.pdf"));
    simple_deck(&decks.join("b.pdf"), "B", 1);

    let report = Pipeline::new(card_config(dir.path())).run(&decks).unwrap();
    let ids: Vec<u64> = read_cards(&report.output_file).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_page_offset_ids() {
    let dir = TempDir::new().unwrap();
    let decks = dir.path().join("decks");
    fs::create_dir(&decks).unwrap();

    let mut builder = PdfBuilder::new();
    let first = card_page(&mut builder, "One", "first", b"one");
    builder
        .page(first)
        .page(PageSpec::new())
        .page(PageSpec::new().text("Three", 20.0, 700.0))
        .save(&decks.join("a.pdf"));
    simple_deck(&decks.join("b.pdf"), "B", 1);

    let config = card_config(dir.path()).with_ids(IdAssignment::PageOffset);
    let report = Pipeline::new(config).run(&decks).unwrap();
    let ids: Vec<u64> = read_cards(&report.output_file).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 2, 3]);
}

#[test]
fn test_repeated_logo_is_never_selected() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("slides.pdf");

    let mut builder = PdfBuilder::new();
    let logo = builder.jpeg(b"logo");
    let photo = builder.jpeg(b"photo");
    let mut pages = Vec::new();
    for i in 0..4 {
        let mut page = PageSpec::new()
            .text(&format!("Slide {}", i + 1), 24.0, 700.0)
            .image(logo, 20.0, 20.0, 400.0, 400.0);
        if i == 2 {
            page = page.image(photo, 300.0, 500.0, 100.0, 100.0);
        }
        pages.push(page);
    }
    pages
        .into_iter()
        .fold(builder, PdfBuilder::page)
        .save(&pdf);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    let cards = read_cards(&report.output_file);

    assert_eq!(cards.len(), 4);
    let with_image: Vec<&Card> = cards.iter().filter(|c| c.has_image()).collect();
    assert_eq!(with_image.len(), 1);
    assert_eq!(with_image[0].title, "Slide 3");

    let saved = fs::read(dir.path().join("site/docs/public/cards/slides_p2.jpg")).unwrap();
    assert!(saved.ends_with(b"photo"));
}

#[test]
fn test_full_page_image_is_never_selected() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("bleed.pdf");

    let mut builder = PdfBuilder::new();
    let backdrop = builder.jpeg(b"backdrop");
    builder
        .page(
            PageSpec::new()
                .text("Only Title", 24.0, 700.0)
                .image(backdrop, 0.0, 0.0, 612.0, 792.0),
        )
        .save(&pdf);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    let cards = read_cards(&report.output_file);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Only Title");
    assert_eq!(cards[0].image_path, "");
}

#[test]
fn test_title_is_largest_font_block() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("sizes.pdf");
    PdfBuilder::new()
        .page(
            PageSpec::new()
                .text("footnote", 10.0, 700.0)
                .text("Headline", 24.0, 600.0)
                .text("subtitle", 14.0, 500.0),
        )
        .save(&pdf);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    let cards = read_cards(&report.output_file);
    assert_eq!(cards[0].title, "Headline");
    assert_eq!(cards[0].description, "subtitle\nfootnote");
}

#[test]
fn test_blank_page_produces_no_card() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("blank.pdf");
    PdfBuilder::new().page(PageSpec::new()).save(&pdf);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    assert_eq!(report.documents, 1);
    assert!(read_cards(&report.output_file).is_empty());
}

#[test]
fn test_empty_directory_writes_empty_output() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty");
    fs::create_dir(&empty).unwrap();

    let report = Pipeline::new(card_config(dir.path())).run(&empty).unwrap();
    assert_eq!(report.inputs, 0);
    assert!(read_cards(&report.output_file).is_empty());
}

#[test]
fn test_corrupt_document_is_skipped() {
    let dir = TempDir::new().unwrap();
    let decks = dir.path().join("decks");
    fs::create_dir(&decks).unwrap();
    simple_deck(&decks.join("a.pdf"), "A", 2);
    fs::write(decks.join("b.pdf"), b"this is not a pdf").unwrap();
    simple_deck(&decks.join("c.pdf"), "C", 2);

    let report = Pipeline::new(card_config(dir.path())).run(&decks).unwrap();
    assert_eq!(report.inputs, 3);
    assert_eq!(report.documents, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("b.pdf"));

    let cards = read_cards(&report.output_file);
    let ids: Vec<u64> = cards.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert!(cards.iter().all(|c| c.source == "a" || c.source == "c"));
}

#[test]
fn test_written_json_round_trips() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("deck.pdf");
    simple_deck(&pdf, "Deck", 3);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    let in_memory = report.output.cards().unwrap();
    assert_eq!(read_cards(&report.output_file), in_memory);
}

#[test]
fn test_non_ascii_source_is_written_literally() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("단어장.pdf");
    simple_deck(&pdf, "Word", 1);

    let report = Pipeline::new(card_config(dir.path())).run(&pdf).unwrap();
    let json = fs::read_to_string(&report.output_file).unwrap();
    assert!(json.contains("\"source\": \"단어장\""));
    assert!(json.contains("./cards/단어장_p0.jpg"));
    assert!(!json.contains("\\u"));
}

#[test]
fn test_custom_output_locations() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("deck.pdf");
    simple_deck(&pdf, "Deck", 1);

    let config = ExtractConfig::cards()
        .with_data_dir(dir.path().join("out"))
        .with_images_dir(dir.path().join("img"))
        .with_image_url_prefix("/static/");
    let report = Pipeline::new(config).run(&pdf).unwrap();

    assert_eq!(report.output_file, dir.path().join("out/cards.json"));
    let cards = read_cards(&report.output_file);
    assert_eq!(cards[0].image_path, "/static/deck_p0.jpg");
    assert!(dir.path().join("img/deck_p0.jpg").exists());
}

struct TouchRenderer;

impl PageRenderer for TouchRenderer {
    fn render_page(&self, _pdf: &Path, _page: u32, _scale: f32, output: &Path) -> Result<()> {
        fs::write(output, b"\x89PNG")?;
        Ok(())
    }
}

fn dictionary_fixture(path: &Path) {
    PdfBuilder::new()
        .page(
            PageSpec::new()
                .text("Apple", 18.0, 700.0)
                .text("a round fruit", 12.0, 650.0),
        )
        .page(PageSpec::new())
        .save(path);
}

fn read_dictionary(path: &Path) -> Vec<DictionaryRecord> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_dictionary_mode_extracts_text() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("fruit.pdf");
    dictionary_fixture(&pdf);

    let config = ExtractConfig::dictionary().with_root(dir.path().join("site"));
    let report = Pipeline::new(config).run(&pdf).unwrap();
    assert!(report.output_file.ends_with("dictionary.json"));

    let records = read_dictionary(&report.output_file);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "fruit");

    let pages = &records[0].pages;
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page, 1);
    assert!(pages[0].content.iter().any(|l| l.contains("Apple")));
    assert!(pages[0].raw_text.contains("a round fruit"));
    assert_eq!(pages[0].title.as_ref(), pages[0].content.first());
    assert_eq!(pages[1].title.as_deref(), Some("Page 2"));
    assert!(pages[1].content.is_empty());
    assert!(pages.iter().all(|p| p.image_path.is_none()));
}

#[test]
fn test_dictionary_mode_can_drop_empty_pages() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("fruit.pdf");
    dictionary_fixture(&pdf);

    let config = ExtractConfig::dictionary()
        .with_root(dir.path().join("site"))
        .with_dictionary(DictionaryOptions {
            keep_empty_pages: false,
            ..DictionaryOptions::default()
        });
    let report = Pipeline::new(config).run(&pdf).unwrap();
    let records = read_dictionary(&report.output_file);
    assert_eq!(records[0].pages.len(), 1);
    assert_eq!(records[0].pages[0].page, 1);
}

#[test]
fn test_dictionary_mode_with_rendered_pages() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("fruit.pdf");
    dictionary_fixture(&pdf);

    let config = ExtractConfig::dictionary()
        .with_root(dir.path().join("site"))
        .with_dictionary(DictionaryOptions {
            render_pages: true,
            title_heuristic: false,
            ..DictionaryOptions::default()
        });
    let report = Pipeline::new(config)
        .with_renderer(Box::new(TouchRenderer))
        .run(&pdf)
        .unwrap();

    let records = read_dictionary(&report.output_file);
    let pages = &records[0].pages;
    assert_eq!(
        pages[1].image_path.as_deref(),
        Some("./dictionary_images/fruit_p1.png")
    );
    assert!(pages.iter().all(|p| p.title.is_none()));
    assert!(dir
        .path()
        .join("site/docs/public/dictionary_images/fruit_p0.png")
        .exists());

    let json = fs::read_to_string(&report.output_file).unwrap();
    assert!(json.contains("\"imagePath\""));
    assert!(!json.contains("\"title\""));
}
