//! Embedded resolution (DPI) reader for JPEG, PNG, TIFF and BMP files.
//!
//! The format is sniffed from the leading bytes, not the extension. Only the
//! header part that carries a physical pixel density is read:
//! - JPEG: the JFIF APP0 density right after SOI, falling back to EXIF.
//! - PNG: the `pHYs` chunk via the `png` decoder (only when its unit is the metre).
//! - TIFF: X/YResolution with ResolutionUnit from IFD0, via `kamadak-exif`.
//! - BMP: `biXPelsPerMeter` / `biYPelsPerMeter` in the info header.
//!
//! Anything malformed, truncated or unit-less reads as `None`; the caller then
//! falls back to [`DEFAULT_DPI`](crate::units::DEFAULT_DPI).

use crate::units::Resolution;
use exif::{In, Tag, Value};
use image::ImageFormat;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

const METRES_PER_INCH: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

/// Read the embedded resolution of a file.
pub fn read_resolution(path: &Path) -> Option<Resolution> {
    let file = File::open(path).ok()?;
    read_resolution_from(BufReader::new(file))
}

fn read_resolution_from<R: BufRead + Seek>(mut reader: R) -> Option<Resolution> {
    let format = image::guess_format(reader.fill_buf().ok()?).ok()?;
    match format {
        ImageFormat::Jpeg => resolution_from_jpeg(reader),
        ImageFormat::Png => resolution_from_png(reader),
        ImageFormat::Tiff => resolution_from_exif(reader),
        ImageFormat::Bmp => resolution_from_bmp(reader),
        _ => None,
    }
}

fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn le_i32(data: &[u8], at: usize) -> Option<i32> {
    let bytes = data.get(at..at + 4)?;
    Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn to_dpi(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded >= 1.0 && rounded <= f64::from(u32::MAX)).then_some(rounded as u32)
}

fn from_density(x: f64, y: f64, scale: f64) -> Option<Resolution> {
    Some(Resolution {
        horizontal: to_dpi(x * scale)?,
        vertical: to_dpi(y * scale)?,
    })
}

// ---------------------------------------------------------------------------
// JPEG: JFIF APP0, then EXIF
// ---------------------------------------------------------------------------

const JFIF_ID: &[u8] = b"JFIF\0";

/// SOI (2) | APP0 marker (2) | length (2) | "JFIF\0" (5) | version (2) |
/// units (1) | Xdensity (2) | Ydensity (2)
const JFIF_HEADER_LEN: usize = 18;

fn resolution_from_jpeg<R: BufRead + Seek>(mut reader: R) -> Option<Resolution> {
    let mut header = [0u8; JFIF_HEADER_LEN];
    let jfif = reader
        .read_exact(&mut header)
        .ok()
        .and_then(|()| parse_jfif_header(&header));
    if jfif.is_some() {
        return jfif;
    }
    reader.rewind().ok()?;
    resolution_from_exif(reader)
}

fn parse_jfif_header(header: &[u8]) -> Option<Resolution> {
    if !header.starts_with(&[0xFF, 0xD8, 0xFF, 0xE0]) || header.get(6..11)? != JFIF_ID {
        return None;
    }
    parse_jfif_density(&header[11..])
}

/// JFIF body after the identifier:
///   version (2) | units (1) | Xdensity (2) | Ydensity (2)
///
/// Units: 0 = aspect ratio only, 1 = dots per inch, 2 = dots per cm.
fn parse_jfif_density(body: &[u8]) -> Option<Resolution> {
    let units = *body.get(2)?;
    let x = f64::from(be_u16(body, 3)?);
    let y = f64::from(be_u16(body, 5)?);
    match units {
        1 => from_density(x, y, 1.0),
        2 => from_density(x, y, CM_PER_INCH),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// EXIF / TIFF: IFD0 resolution tags
// ---------------------------------------------------------------------------

/// Only IFD0 is consulted; thumbnails in IFD1 carry their own resolution.
fn resolution_from_exif<R: BufRead + Seek>(mut reader: R) -> Option<Resolution> {
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    let x = rational_field(&exif, Tag::XResolution)?;
    let y = rational_field(&exif, Tag::YResolution).unwrap_or(x);
    // Inches when the tag is absent
    let unit = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(2);

    match unit {
        2 => from_density(x, y, 1.0),
        3 => from_density(x, y, CM_PER_INCH),
        _ => None,
    }
}

fn rational_field(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => values
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// PNG: pHYs chunk
// ---------------------------------------------------------------------------

/// `read_info` stops at the first IDAT, and pHYs must precede it.
fn resolution_from_png<R: BufRead>(reader: R) -> Option<Resolution> {
    let reader = png::Decoder::new(reader).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => from_density(
            f64::from(dims.xppu),
            f64::from(dims.yppu),
            METRES_PER_INCH,
        ),
        png::Unit::Unspecified => None,
    }
}

// ---------------------------------------------------------------------------
// BMP: BITMAPINFOHEADER pixels per metre
// ---------------------------------------------------------------------------

/// File header (14) plus the info header up to the vertical density field.
const BMP_HEADER_LEN: usize = 46;

/// The info header's size field follows the 14-byte file header. The density
/// fields sit at 38 and 42 and need an info header of at least 40.
fn resolution_from_bmp<R: Read>(mut reader: R) -> Option<Resolution> {
    let mut header = [0u8; BMP_HEADER_LEN];
    reader.read_exact(&mut header).ok()?;
    if !header.starts_with(b"BM") || le_i32(&header, 14)? < 40 {
        return None;
    }
    let x = le_i32(&header, 38)?;
    let y = le_i32(&header, 42)?;
    if x <= 0 || y <= 0 {
        return None;
    }
    from_density(f64::from(x), f64::from(y), METRES_PER_INCH)
}
