//! Small PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Text drawn at a position with a font size, one `Tj` per piece.
pub struct Text {
    pub pieces: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// An image drawn into a rectangle.
pub struct Placement {
    pub image: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Default)]
pub struct PageSpec {
    pub texts: Vec<Text>,
    pub placements: Vec<Placement>,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, text: &str, size: f32, y: f32) -> Self {
        self.split_text(&[text], size, y)
    }

    /// Show consecutive pieces with separate `Tj` operators in one text object.
    pub fn split_text(mut self, pieces: &[&str], size: f32, y: f32) -> Self {
        self.texts.push(Text {
            pieces: pieces.iter().map(|p| p.to_string()).collect(),
            x: 72.0,
            y,
            size,
        });
        self
    }

    pub fn image(mut self, image: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.placements.push(Placement {
            image,
            x,
            y,
            width,
            height,
        });
        self
    }
}

/// Builds a Letter-sized PDF whose image XObjects are shared between pages.
pub struct PdfBuilder {
    images: Vec<Stream>,
    pages: Vec<PageSpec>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Register a JPEG payload; returns its index for [`PageSpec::image`].
    pub fn jpeg(&mut self, payload: &[u8]) -> usize {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
        data.extend_from_slice(payload);
        self.images.push(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(1),
                "Height" => Object::Integer(1),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            data,
        ));
        self.images.len() - 1
    }

    /// Register a Flate-compressed RGB image filled with one colour.
    pub fn flate_rgb(&mut self, width: u32, height: u32, rgb: [u8; 3]) -> usize {
        let samples: Vec<u8> = (0..width * height).flat_map(|_| rgb).collect();
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(width as i64),
                "Height" => Object::Integer(height as i64),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
            },
            samples,
        );
        stream.compress().expect("compress image");
        assert!(stream.dict.get(b"Filter").is_ok(), "image too small to compress");
        self.images.push(stream);
        self.images.len() - 1
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.pages.push(page);
        self
    }

    pub fn build(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let image_ids: Vec<ObjectId> = self
            .images
            .iter()
            .map(|stream| doc.add_object(stream.clone()))
            .collect();

        let mut kids = Vec::new();
        for spec in &self.pages {
            let mut xobjects = Dictionary::new();
            let mut operations = Vec::new();

            for placement in &spec.placements {
                let name = format!("Im{}", placement.image);
                xobjects.set(name.clone(), Object::Reference(image_ids[placement.image]));
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        Object::Real(placement.width),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(placement.height),
                        Object::Real(placement.x),
                        Object::Real(placement.y),
                    ],
                ));
                operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                operations.push(Operation::new("Q", vec![]));
            }

            for text in &spec.texts {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Real(text.size)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(text.x), Object::Real(text.y)],
                ));
                for piece in &text.pieces {
                    operations.push(Operation::new(
                        "Tj",
                        vec![Object::string_literal(piece.as_str())],
                    ));
                }
                operations.push(Operation::new("ET", vec![]));
            }

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let resources = dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            };
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    pub fn save(&self, path: &Path) {
        self.build().save(path).expect("save fixture pdf");
    }
}

/// A page with a large title, a body line and one photo.
pub fn card_page(builder: &mut PdfBuilder, title: &str, body: &str, photo: &[u8]) -> PageSpec {
    let image = builder.jpeg(photo);
    PageSpec::new()
        .text(title, 28.0, 700.0)
        .text(body, 12.0, 620.0)
        .image(image, 100.0, 200.0, 300.0, 200.0)
}

/// A PDF with `pages` titled pages, each with its own photo.
pub fn simple_deck(path: &Path, label: &str, pages: usize) {
    let mut builder = PdfBuilder::new();
    let specs: Vec<PageSpec> = (0..pages)
        .map(|i| {
            card_page(
                &mut builder,
                &format!("{} {}", label, i + 1),
                &format!("about {} {}", label, i + 1),
                format!("{}-{}", label, i).as_bytes(),
            )
        })
        .collect();
    let builder = specs.into_iter().fold(builder, PdfBuilder::page);
    builder.save(path);
}
