//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, BMP, GIF) | `image` crate (pure Rust decoders) |
//! | Identify | `image::image_dimensions` (header only) |
//! | Resize | [`transform::apply_resize`](super::transform::apply_resize) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality and JFIF density |
//! | Encode → PNG | `png::Encoder`, best compression, adaptive filtering, `pHYs` density |
//! | Encode → other | `DynamicImage::write_to` for the format matching the extension |
//! | Resolution | custom [`resolution`](super::resolution) header reader |
//!
//! The output format always follows the output file's extension.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, ResizeParams};
use super::{resolution, transform};
use crate::units::Resolution;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

const METRES_PER_INCH: f64 = 0.0254;

/// Extensions accepted as input, paired with the decoder they need.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("bmp", ImageFormat::Bmp),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Case-insensitive check of a path's extension against
/// [`supported_input_extensions`].
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, trusting content over extension.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("failed to decode {}: {}", path.display(), e))
        })
}

fn create_writer(path: &Path) -> Result<BufWriter<File>, BackendError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn encode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("failed to encode {}: {}", path.display(), err))
}

fn save_image(
    img: &DynamicImage,
    path: &Path,
    quality: Quality,
    dpi: u32,
) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => save_jpeg(img, path, quality, dpi),
        "png" => save_png(img, path, dpi),
        other => {
            let format = ImageFormat::from_extension(other)
                .filter(|f| f.writing_enabled())
                .ok_or_else(|| {
                    BackendError::ProcessingFailed(format!("unsupported output format: {other}"))
                })?;
            save_generic(img, path, format)
        }
    }
}

/// JPEG has no alpha channel; it is dropped. Greyscale stays greyscale.
fn save_jpeg(
    img: &DynamicImage,
    path: &Path,
    quality: Quality,
    dpi: u32,
) -> Result<(), BackendError> {
    let mut writer = create_writer(path)?;
    // Clamped by Quality::new, so this always fits
    let quality = u8::try_from(quality.value()).unwrap_or(100);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        encoder.set_pixel_density(PixelDensity::dpi(u16::try_from(dpi).unwrap_or(u16::MAX)));
        match img {
            DynamicImage::ImageLuma8(gray) => encoder.encode_image(gray),
            other => encoder.encode_image(&other.to_rgb8()),
        }
        .map_err(|e| encode_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

/// Written with the `png` crate directly so the `pHYs` chunk carries the DPI.
fn save_png(img: &DynamicImage, path: &Path, dpi: u32) -> Result<(), BackendError> {
    let (color, converted) = match img {
        DynamicImage::ImageLuma8(_) => (png::ColorType::Grayscale, img.clone()),
        DynamicImage::ImageLumaA8(_) => (png::ColorType::GrayscaleAlpha, img.clone()),
        DynamicImage::ImageRgb8(_) => (png::ColorType::Rgb, img.clone()),
        other if other.color().has_alpha() => {
            (png::ColorType::Rgba, DynamicImage::ImageRgba8(other.to_rgba8()))
        }
        other => (png::ColorType::Rgb, DynamicImage::ImageRgb8(other.to_rgb8())),
    };

    let mut writer = create_writer(path)?;
    let pixels_per_metre = (f64::from(dpi) / METRES_PER_INCH).round() as u32;

    let mut encoder = png::Encoder::new(&mut writer, converted.width(), converted.height());
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Best);
    encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: pixels_per_metre,
        yppu: pixels_per_metre,
        unit: png::Unit::Meter,
    }));

    let mut png_writer = encoder.write_header().map_err(|e| encode_error(path, e))?;
    png_writer
        .write_image_data(converted.as_bytes())
        .map_err(|e| encode_error(path, e))?;
    png_writer.finish().map_err(|e| encode_error(path, e))?;
    writer.flush()?;
    Ok(())
}

/// BMP, TIFF, WebP and GIF: 8-bit RGB or RGBA, no resolution metadata.
fn save_generic(img: &DynamicImage, path: &Path, format: ImageFormat) -> Result<(), BackendError> {
    let converted = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut writer = create_writer(path)?;
    converted
        .write_to(&mut writer, format)
        .map_err(|e| encode_error(path, e))?;
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        // Sniff the content like load_image does
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn read_resolution(&self, path: &Path) -> Result<Option<Resolution>, BackendError> {
        Ok(resolution::read_resolution(path))
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = transform::apply_resize(&img, &params.plan, params.filter, params.background);
        save_image(&resized, &params.output, params.quality, params.dpi)
    }
}
