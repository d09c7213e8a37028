//! Directory scanning for batch input.
//!
//! Finds files whose extension (case-insensitive) has a decoder compiled in,
//! see [`supported_input_extensions`](crate::imaging::supported_input_extensions).
//! Unreadable entries are skipped with a warning rather than failing the scan.
//!
//! Results are sorted by path so repeated scans produce the same batch order.

use crate::imaging::{Dimensions, ImageBackend, ImageProcessor, is_supported_extension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Error, Debug, PartialEq)]
pub enum ScanError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// List supported images directly in `dir`, or in its whole tree when
/// `recursive` is set.
pub fn scan_directory(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.exists() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let walker = WalkDir::new(dir).min_depth(1).follow_links(true);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_supported_extension(path))
        .collect();

    files.sort();
    Ok(files)
}

/// Header facts about one scanned file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedImage {
    pub path: PathBuf,
    /// `None` when the header could not be read; `error` says why.
    pub size: Option<Dimensions>,
    /// Embedded resolution, or the default when the file has none.
    pub dpi: u32,
    pub error: Option<String>,
}

/// Read pixel size and resolution for each file without decoding pixels.
pub fn inspect_images<B: ImageBackend>(
    processor: &ImageProcessor<B>,
    files: &[PathBuf],
) -> Vec<ScannedImage> {
    files
        .iter()
        .map(|path| {
            let (size, error) = match processor.identify(path) {
                Ok(size) => (Some(size), None),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "cannot read image header");
                    (None, Some(err.to_string()))
                }
            };
            ScannedImage {
                path: path.clone(),
                size,
                dpi: processor.source_dpi(path),
                error,
            }
        })
        .collect()
}
