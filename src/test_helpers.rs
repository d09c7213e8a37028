//! Shared test utilities: synthetic image fixtures written to disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let photo = tmp.path().join("photo.jpg");
//! create_test_jpeg(&photo, 400, 300);
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write an RGBA PNG whose left half is transparent.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([200, 40, 40, 255])
        }
    });
    img.save(path).unwrap();
}

/// Write `count` JPEGs named `photo_00.jpg`, `photo_01.jpg`, … into `dir`.
pub fn create_test_batch(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("photo_{i:02}.jpg"));
            create_test_jpeg(&path, width, height);
            path
        })
        .collect()
}

/// Create an empty placeholder file; enough for code paths that only
/// check existence and extension before handing off to a backend.
pub fn touch(path: &Path) -> PathBuf {
    std::fs::write(path, b"").unwrap();
    path.to_path_buf()
}
