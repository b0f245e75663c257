//! Image XObject enumeration, payload extraction and content hashing.

use std::collections::HashSet;
use std::io::Cursor;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};
use md5::{Digest, Md5};

use crate::error::{Error, Result};
use crate::model::PageImage;

use super::content::{page_resources, resolve_dict, subtype};

/// Lowercase hex MD5 of an image payload.
pub fn content_hash(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

/// File extension for image payloads that are kept byte for byte.
///
/// Returns `None` for filters whose output is plain samples; those images
/// are re-wrapped as PNG.
pub fn native_extension(filter: Option<&str>) -> Option<&'static str> {
    match filter {
        Some("DCTDecode") => Some("jpg"),
        Some("JPXDecode") => Some("jp2"),
        _ => None,
    }
}

/// Payload bytes and extension of an image stream, as they should be
/// written to disk.
///
/// JPEG and JPEG 2000 streams pass through unchanged. Everything else is
/// decoded to samples and encoded as PNG.
pub fn extract_payload(doc: &LopdfDocument, stream: &Stream) -> Result<(Vec<u8>, &'static str)> {
    let filters = stream_filters(&stream.dict);

    if let [single] = filters.as_slice() {
        if let Some(ext) = native_extension(Some(single.as_str())) {
            return Ok((stream.content.clone(), ext));
        }
    }

    let samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        decode_samples(stream)
            .map_err(|e| Error::ImageExtract(format!("{:?}: {}", filters, e)))?
    };
    let png = encode_png(doc, &stream.dict, &samples)?;
    Ok((png, "png"))
}

/// Run the stream's filters over its payload.
///
/// lopdf refuses to decode streams whose `/Subtype` is `Image`, so the
/// filters run on a copy without it.
fn decode_samples(stream: &Stream) -> lopdf::Result<Vec<u8>> {
    let mut dict = stream.dict.clone();
    dict.remove(b"Subtype");
    Stream::new(dict, stream.content.clone()).decompressed_content()
}

/// Colour model of an image's samples.
#[derive(Debug, Clone, PartialEq)]
enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    /// Palette lookup into a base model; `palette` holds packed base colours.
    Indexed {
        base: Box<ColorModel>,
        palette: Vec<u8>,
    },
}

impl ColorModel {
    fn components(&self) -> usize {
        match self {
            ColorModel::Gray | ColorModel::Indexed { .. } => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }

    /// Parse a `/ColorSpace` value (name, array or reference).
    fn from_object(doc: &LopdfDocument, obj: &Object) -> Result<Self> {
        match deref(doc, obj) {
            Object::Name(name) => Self::from_name(name),
            Object::Array(arr) => {
                let family = arr
                    .first()
                    .map(|o| deref(doc, o))
                    .and_then(|o| o.as_name().ok())
                    .unwrap_or_default();
                match family {
                    b"ICCBased" => {
                        let n = arr
                            .get(1)
                            .map(|o| deref(doc, o))
                            .and_then(|o| o.as_stream().ok())
                            .and_then(|s| s.dict.get(b"N").ok())
                            .and_then(|n| n.as_i64().ok())
                            .unwrap_or(3);
                        match n {
                            1 => Ok(ColorModel::Gray),
                            4 => Ok(ColorModel::Cmyk),
                            _ => Ok(ColorModel::Rgb),
                        }
                    }
                    b"Indexed" if arr.len() >= 4 => {
                        let base = Self::from_object(doc, &arr[1])?;
                        let palette = match deref(doc, &arr[3]) {
                            Object::String(bytes, _) => bytes.clone(),
                            Object::Stream(s) => super::content::stream_bytes(s),
                            _ => {
                                return Err(Error::ImageExtract(
                                    "Indexed colour space without lookup table".to_string(),
                                ))
                            }
                        };
                        Ok(ColorModel::Indexed {
                            base: Box::new(base),
                            palette,
                        })
                    }
                    b"CalGray" => Ok(ColorModel::Gray),
                    b"CalRGB" | b"Lab" => Ok(ColorModel::Rgb),
                    other => Err(Error::ImageExtract(format!(
                        "Unsupported colour space /{}",
                        String::from_utf8_lossy(other)
                    ))),
                }
            }
            _ => Err(Error::ImageExtract("Invalid colour space".to_string())),
        }
    }

    fn from_name(name: &[u8]) -> Result<Self> {
        match name {
            b"DeviceGray" | b"CalGray" | b"G" => Ok(ColorModel::Gray),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ColorModel::Rgb),
            b"DeviceCMYK" | b"CMYK" => Ok(ColorModel::Cmyk),
            other => Err(Error::ImageExtract(format!(
                "Unsupported colour space /{}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    /// Convert one pixel's 8-bit components to RGB.
    fn to_rgb(&self, px: &[u8]) -> [u8; 3] {
        match self {
            ColorModel::Gray => [px[0]; 3],
            ColorModel::Rgb => [px[0], px[1], px[2]],
            ColorModel::Cmyk => cmyk_to_rgb(px[0], px[1], px[2], px[3]),
            ColorModel::Indexed { base, palette } => {
                let n = base.components();
                let start = px[0] as usize * n;
                match palette.get(start..start + n) {
                    Some(entry) => base.to_rgb(entry),
                    None => [0; 3],
                }
            }
        }
    }
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let k = 255 - k as u16;
    let channel = |v: u8| ((255 - v as u16) * k / 255) as u8;
    [channel(c), channel(m), channel(y)]
}

fn deref<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn dict_int(doc: &LopdfDocument, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|o| deref(doc, o).as_i64().ok())
}

/// Encode decoded image samples as PNG, using the stream's `Width`,
/// `Height`, `ColorSpace` and `BitsPerComponent`.
fn encode_png(doc: &LopdfDocument, dict: &Dictionary, samples: &[u8]) -> Result<Vec<u8>> {
    let width = dict_int(doc, dict, b"Width").unwrap_or(0);
    let height = dict_int(doc, dict, b"Height").unwrap_or(0);
    if width <= 0 || height <= 0 {
        return Err(Error::ImageExtract(format!(
            "Invalid image size {}x{}",
            width, height
        )));
    }
    let (width, height) = (width as u32, height as u32);

    let is_mask = dict
        .get(b"ImageMask")
        .ok()
        .and_then(|o| o.as_bool().ok())
        .unwrap_or(false);
    let (model, bits) = if is_mask {
        (ColorModel::Gray, 1)
    } else {
        let space = dict
            .get(b"ColorSpace")
            .map_err(|_| Error::ImageExtract("Image without colour space".to_string()))?;
        let bits = dict_int(doc, dict, b"BitsPerComponent").unwrap_or(8);
        (ColorModel::from_object(doc, space)?, bits)
    };

    let indexed = matches!(model, ColorModel::Indexed { .. });
    let components = unpack_samples(samples, width, height, model.components(), bits, !indexed)?;
    let components = if is_mask {
        // Stencil masks paint where the sample is 0.
        components.into_iter().map(|v| 255 - v).collect()
    } else {
        components
    };

    let image = match model {
        ColorModel::Gray => image::GrayImage::from_raw(width, height, components)
            .map(image::DynamicImage::ImageLuma8),
        ColorModel::Rgb => image::RgbImage::from_raw(width, height, components)
            .map(image::DynamicImage::ImageRgb8),
        ref other => {
            let n = other.components();
            let rgb: Vec<u8> = components
                .chunks_exact(n)
                .flat_map(|px| other.to_rgb(px))
                .collect();
            image::RgbImage::from_raw(width, height, rgb).map(image::DynamicImage::ImageRgb8)
        }
    }
    .ok_or_else(|| Error::ImageExtract("Sample buffer does not match image size".to_string()))?;

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| Error::ImageExtract(format!("PNG encoding failed: {}", e)))?;
    Ok(out.into_inner())
}

/// Expand packed samples to one byte per component.
///
/// Rows are padded to whole bytes. With `scale` set, sub-byte samples are
/// stretched to the 0..=255 range; palette indices are kept as they are.
fn unpack_samples(
    samples: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bits: i64,
    scale: bool,
) -> Result<Vec<u8>> {
    let per_row = width as usize * components;
    let count = per_row * height as usize;

    match bits {
        8 => samples
            .get(..count)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::ImageExtract("Image data is truncated".to_string())),
        16 => {
            let bytes = samples
                .get(..count * 2)
                .ok_or_else(|| Error::ImageExtract("Image data is truncated".to_string()))?;
            Ok(bytes.chunks_exact(2).map(|pair| pair[0]).collect())
        }
        1 | 2 | 4 => {
            let bits = bits as usize;
            let row_bytes = (per_row * bits).div_ceil(8);
            if samples.len() < row_bytes * height as usize {
                return Err(Error::ImageExtract("Image data is truncated".to_string()));
            }
            let max = (1u16 << bits) - 1;
            let mut out = Vec::with_capacity(count);
            for row in samples.chunks_exact(row_bytes).take(height as usize) {
                for i in 0..per_row {
                    let bit = i * bits;
                    let byte = row[bit / 8];
                    let shift = 8 - bits - bit % 8;
                    let value = (byte >> shift) as u16 & max;
                    out.push(if scale { value * 255 / max } else { value } as u8);
                }
            }
            Ok(out)
        }
        other => Err(Error::ImageExtract(format!(
            "Unsupported bits per component: {}",
            other
        ))),
    }
}

/// Names in the stream's `/Filter` entry (a name or an array of names).
fn stream_filters(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Enumerate the image XObjects reachable from a page's resources,
/// descending into Form XObjects up to `max_form_depth` levels.
///
/// Each image appears once, in resource-dictionary order. Images whose
/// payload cannot be read are kept with `hash: None`.
pub fn collect_page_images(
    doc: &LopdfDocument,
    page_id: ObjectId,
    max_form_depth: usize,
) -> Vec<PageImage> {
    let mut images = Vec::new();
    let mut seen = HashSet::new();
    if let Some(resources) = page_resources(doc, page_id) {
        walk_xobjects(doc, resources, 0, max_form_depth, &mut seen, &mut images);
    }
    images
}

fn walk_xobjects(
    doc: &LopdfDocument,
    resources: &Dictionary,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<ObjectId>,
    images: &mut Vec<PageImage>,
) {
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|x| resolve_dict(doc, x))
    else {
        return;
    };

    for (name, obj) in xobjects.iter() {
        let Ok(object_id) = obj.as_reference() else {
            continue;
        };
        if !seen.insert(object_id) {
            continue;
        }

        let stream = match doc.get_object(object_id) {
            Ok(Object::Stream(stream)) => stream,
            Ok(_) => continue,
            Err(e) => {
                log::warn!(
                    "Skipping XObject /{}: {}",
                    String::from_utf8_lossy(name),
                    e
                );
                continue;
            }
        };

        match subtype(&stream.dict) {
            Some("Image") => images.push(read_image(doc, object_id, stream)),
            Some("Form") if depth < max_depth => {
                if let Some(inner) = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| resolve_dict(doc, r))
                {
                    walk_xobjects(doc, inner, depth + 1, max_depth, seen, images);
                }
            }
            _ => {}
        }
    }
}

fn read_image(doc: &LopdfDocument, object_id: ObjectId, stream: &Stream) -> PageImage {
    match extract_payload(doc, stream) {
        Ok((data, extension)) => PageImage {
            object_id,
            hash: Some(content_hash(&data)),
            data,
            extension: extension.to_string(),
            rects: Vec::new(),
        },
        Err(e) => {
            log::warn!("Cannot read image {:?}: {}", object_id, e);
            PageImage {
                object_id,
                data: Vec::new(),
                hash: None,
                extension: "png".to_string(),
                rects: Vec::new(),
            }
        }
    }
}
