//! Content stream interpretation.
//!
//! Walks a page's content stream (and any Form XObjects it draws) and
//! records two things: text spans with their effective font size, and the
//! rectangles where image XObjects are painted.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::Rect;

use super::backend::decode_text_simple;

/// A text span with position and size information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position of the origin in user space
    pub x: f32,
    /// Y position (baseline) in user space
    pub y: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Advance width in user space (0 when unknown)
    pub width: f32,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size,
            width: 0.0,
        }
    }

    /// Set the advance width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}

/// An image XObject painted on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Object id of the image stream
    pub object_id: ObjectId,
    /// Bounding box of the painted unit square
    pub rect: Rect,
}

/// Everything the interpreter collected from one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Text spans in content-stream order
    pub spans: Vec<TextSpan>,
    /// Image placements in painting order
    pub placements: Vec<ImagePlacement>,
}

/// Affine transform `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Length of the transformed vertical unit vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Bounding box of the transformed unit square, i.e. where an image lands.
    pub fn unit_square_bounds(&self) -> Rect {
        Rect::bounding(&[
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ])
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let mut v = [0.0f32; 6];
        for (slot, operand) in v.iter_mut().zip(operands) {
            *slot = get_number(operand)?;
        }
        Some(Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5]))
    }
}

/// Text object state between `BT` and `ET`.
#[derive(Debug, Clone, Default)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn set(&mut self, m: Matrix) {
        self.matrix = m;
        self.line_matrix = m;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    /// Move past shown text; `tx` is in unscaled text space units.
    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

/// Graphics state entries the interpreter cares about, saved by `q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_name: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    /// `Tz / 100`
    horizontal_scale: f32,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            font_name: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
        }
    }

    /// Horizontal displacement of shown glyphs, in text space.
    fn displacement(&self, glyphs: &GlyphRun) -> f32 {
        (glyphs.em * self.font_size
            + glyphs.codes as f32 * self.char_spacing
            + glyphs.spaces as f32 * self.word_spacing)
            * self.horizontal_scale
    }
}

/// Measured glyphs of one string operand.
#[derive(Debug, Clone, Copy, Default)]
struct GlyphRun {
    /// Sum of glyph widths in em
    em: f32,
    codes: usize,
    spaces: usize,
}

/// `/Widths` of a simple font.
struct FontWidths {
    first_char: i64,
    widths: Vec<f32>,
    missing: Option<f32>,
}

impl FontWidths {
    fn from_font(doc: &LopdfDocument, font: &Dictionary) -> Option<Self> {
        let widths = font.get(b"Widths").ok().and_then(|w| match w {
            Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok(),
            other => other.as_array().ok(),
        })?;
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        let missing = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|d| resolve_dict(doc, d))
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(get_number);
        Some(Self {
            first_char,
            widths: widths.iter().map(|w| get_number(w).unwrap_or(0.0)).collect(),
            missing,
        })
    }

    /// Width of a character code in em, if the font knows it.
    fn get(&self, code: u8) -> Option<f32> {
        let index = code as i64 - self.first_char;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.widths.get(i).copied())
            .or(self.missing)
            .map(|w| w / 1000.0)
    }
}

/// Resources in scope for the stream currently being interpreted.
struct Frame<'a> {
    resources: Option<&'a Dictionary>,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

/// Interprets content streams of a single document.
pub struct ContentInterpreter<'a> {
    doc: &'a LopdfDocument,
    max_form_depth: usize,
    out: PageContent,
}

impl<'a> ContentInterpreter<'a> {
    /// Create an interpreter; Form XObjects nested deeper than
    /// `max_form_depth` are not entered.
    pub fn new(doc: &'a LopdfDocument, max_form_depth: usize) -> Self {
        Self {
            doc,
            max_form_depth,
            out: PageContent::default(),
        }
    }

    /// Interpret a page's content stream.
    pub fn interpret_page(mut self, page_id: ObjectId) -> Result<PageContent> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let frame = Frame {
            resources: page_resources(self.doc, page_id),
            fonts,
        };
        let content = page_content(self.doc, page_id)?;
        self.run(&content, &frame, Matrix::IDENTITY, 0)?;
        Ok(self.out)
    }

    fn run(&mut self, data: &[u8], frame: &Frame<'a>, base_ctm: Matrix, depth: usize) -> Result<()> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut gs = GraphicsState::new(base_ctm);
        let mut gs_stack: Vec<GraphicsState> = Vec::new();
        let mut text = TextState::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "q" => gs_stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = gs_stack.pop() {
                        gs = saved;
                    } else {
                        log::debug!("Unbalanced Q operator, keeping current state");
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        gs.ctm = m.then(&gs.ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    text.begin();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(name) = &op.operands[0] {
                            gs.font_name = name.clone();
                        }
                        gs.font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Tc" => {
                    if let Some(v) = op.operands.first().and_then(get_number) {
                        gs.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = op.operands.first().and_then(get_number) {
                        gs.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = op.operands.first().and_then(get_number) {
                        gs.horizontal_scale = v / 100.0;
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        text.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            text.leading = -ty;
                        }
                        text.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        text.set(m);
                    }
                }
                "T*" => text.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "\"" {
                        if let Some(v) = op.operands.first().and_then(get_number) {
                            gs.word_spacing = v;
                        }
                        if let Some(v) = op.operands.get(1).and_then(get_number) {
                            gs.char_spacing = v;
                        }
                    }
                    if op.operator == "'" || op.operator == "\"" {
                        text.next_line();
                    }
                    if !in_text_block {
                        continue;
                    }
                    let (decoded, advance) = match op.operator.as_str() {
                        "TJ" => match op.operands.first() {
                            Some(Object::Array(items)) => self.show_array(frame, &gs, items),
                            _ => (String::new(), 0.0),
                        },
                        "\"" => self.show_operand(frame, &gs, op.operands.get(2)),
                        _ => self.show_operand(frame, &gs, op.operands.first()),
                    };
                    let device = text.matrix.then(&gs.ctm);
                    if !decoded.trim().is_empty() {
                        let (x, y) = device.apply(0.0, 0.0);
                        let (end_x, end_y) = device.apply(advance, 0.0);
                        let width = (end_x - x).hypot(end_y - y);
                        let size = gs.font_size * device.vertical_scale();
                        self.out
                            .spans
                            .push(TextSpan::new(decoded, x, y, size).with_width(width));
                    }
                    text.advance(advance);
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        self.paint_xobject(frame, name, gs.ctm, depth);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Handle `Do`: record image placements, descend into forms.
    fn paint_xobject(&mut self, frame: &Frame<'a>, name: &[u8], ctm: Matrix, depth: usize) {
        let doc = self.doc;
        let Some(object_id) = frame
            .resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|x| resolve_dict(doc, x))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| obj.as_reference().ok())
        else {
            log::debug!("XObject /{} not found", String::from_utf8_lossy(name));
            return;
        };

        let Ok(Object::Stream(stream)) = doc.get_object(object_id) else {
            return;
        };

        match subtype(&stream.dict) {
            Some("Image") => self.out.placements.push(ImagePlacement {
                object_id,
                rect: ctm.unit_square_bounds(),
            }),
            Some("Form") => {
                if depth >= self.max_form_depth {
                    log::debug!("Form XObject nesting limit reached at {:?}", object_id);
                    return;
                }
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|m| m.as_array().ok())
                    .and_then(|arr| Matrix::from_operands(arr))
                    .unwrap_or_default();
                let resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| resolve_dict(doc, r))
                    .or(frame.resources);
                let inner = Frame {
                    resources,
                    fonts: resource_fonts(doc, resources),
                };
                let data = stream_bytes(stream);
                if let Err(e) = self.run(&data, &inner, form_matrix.then(&ctm), depth + 1) {
                    log::warn!("Skipping unreadable form XObject {:?}: {}", object_id, e);
                }
            }
            _ => {}
        }
    }

    fn show_operand(
        &self,
        frame: &Frame<'a>,
        gs: &GraphicsState,
        operand: Option<&Object>,
    ) -> (String, f32) {
        match operand {
            Some(Object::String(bytes, _)) => {
                let text = self.decode(frame, &gs.font_name, bytes);
                let glyphs = self.measure(frame, &gs.font_name, bytes, &text);
                (text, gs.displacement(&glyphs))
            }
            _ => (String::new(), 0.0),
        }
    }

    /// Decode a `TJ` array and its total displacement. Large negative
    /// kerning (more than 200/1000 em) is treated as a word space.
    fn show_array(&self, frame: &Frame<'a>, gs: &GraphicsState, items: &[Object]) -> (String, f32) {
        const SPACE_THRESHOLD: f32 = 200.0;
        let mut combined = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let text = self.decode(frame, &gs.font_name, bytes);
                    let glyphs = self.measure(frame, &gs.font_name, bytes, &text);
                    advance += gs.displacement(&glyphs);
                    combined.push_str(&text);
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    advance += adjustment / 1000.0 * gs.font_size * gs.horizontal_scale;
                    if adjustment > SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}')
                        && !combined.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        (combined, advance)
    }

    /// Glyph widths of a string operand. Simple fonts use `/Widths`; other
    /// fonts fall back to an estimate from the decoded characters.
    fn measure(&self, frame: &Frame<'a>, font: &[u8], bytes: &[u8], decoded: &str) -> GlyphRun {
        let widths = frame
            .fonts
            .get(font)
            .and_then(|dict| FontWidths::from_font(self.doc, dict));

        let mut run = GlyphRun::default();
        match widths {
            Some(widths) => {
                let mut chars = decoded.chars();
                for &code in bytes {
                    let c = chars.next();
                    run.em += widths
                        .get(code)
                        .unwrap_or_else(|| estimated_width(c.unwrap_or(' ')));
                    run.codes += 1;
                    if code == b' ' {
                        run.spaces += 1;
                    }
                }
            }
            None => {
                for c in decoded.chars() {
                    run.em += estimated_width(c);
                    run.codes += 1;
                    if c == ' ' {
                        run.spaces += 1;
                    }
                }
            }
        }
        run
    }

    fn decode(&self, frame: &Frame<'a>, font: &[u8], bytes: &[u8]) -> String {
        if let Some(font_dict) = frame.fonts.get(font) {
            if let Ok(encoding) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

/// Resolve a dictionary that may be stored inline or behind a reference.
pub(crate) fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(r) => doc.get_dictionary(*r).ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

/// Look up a page attribute, following the `Parent` chain for inherited keys.
pub(crate) fn inherited<'a>(
    doc: &'a LopdfDocument,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok();
    // Page trees are shallow; the bound only guards against cycles.
    for _ in 0..32 {
        let dict = current?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    None
}

/// The resource dictionary in effect for a page.
pub(crate) fn page_resources(doc: &LopdfDocument, page_id: ObjectId) -> Option<&Dictionary> {
    inherited(doc, page_id, b"Resources").and_then(|r| resolve_dict(doc, r))
}

/// Fonts declared in a resource dictionary.
fn resource_fonts<'a>(
    doc: &'a LopdfDocument,
    resources: Option<&'a Dictionary>,
) -> BTreeMap<Vec<u8>, &'a Dictionary> {
    let mut fonts = BTreeMap::new();
    if let Some(font_dict) = resources
        .and_then(|res| res.get(b"Font").ok())
        .and_then(|f| resolve_dict(doc, f))
    {
        for (name, obj) in font_dict.iter() {
            if let Some(dict) = resolve_dict(doc, obj) {
                fonts.insert(name.clone(), dict);
            }
        }
    }
    fonts
}

/// Concatenated, decoded content streams of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    // A page without Contents is blank.
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    let refs: Vec<ObjectId> = match contents {
        Object::Reference(r) => vec![*r],
        Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
    };

    let mut content = Vec::new();
    for r in refs {
        match doc.get_object(r) {
            Ok(Object::Stream(s)) => {
                content.extend_from_slice(&stream_bytes(s));
                content.push(b' ');
            }
            _ => log::debug!("Content stream {:?} is not a stream", r),
        }
    }
    Ok(content)
}

/// Stream payload, decompressed when a filter is present and decodable.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// `/Subtype` of an XObject dictionary.
pub(crate) fn subtype(dict: &Dictionary) -> Option<&str> {
    dict.get(b"Subtype")
        .ok()
        .and_then(|s| s.as_name().ok())
        .and_then(|n| std::str::from_utf8(n).ok())
}

/// Helper to extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Rough glyph width in em for fonts without metrics: full width for
/// CJK and Hangul, half width otherwise.
fn estimated_width(c: char) -> f32 {
    let code = c as u32;
    let wide = is_spaceless_script_char(c)
        || (0x1100..=0x11FF).contains(&code)
        || (0x3130..=0x318F).contains(&code)
        || (0xAC00..=0xD7AF).contains(&code)
        || (0xFF00..=0xFF60).contains(&code);
    if wide {
        1.0
    } else {
        0.5
    }
}

/// Check if a character belongs to a script written without word spaces
/// (Chinese ideographs, kana, CJK punctuation). Hangul is excluded.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}
