//! Error taxonomy shared by the converter, the processor and the batch runner.
//!
//! Two tiers:
//!
//! - [`ValidationError`]: the caller asked for something impossible (negative
//!   size, unknown unit, zero DPI, missing file, unsupported extension, a size
//!   too large to allocate). Never
//!   retried, surfaced verbatim.
//! - [`ResizeError`]: everything a single resize can fail with. Validation
//!   errors pass through unchanged; codec and I/O failures are flattened into
//!   [`ResizeError::Processing`] with the original message kept.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid unit '{0}' (use one of: px, in, cm, mm)")]
    InvalidUnit(String),
    #[error("invalid numeric value: {0}")]
    InvalidValue(f64),
    #[error("DPI must be greater than zero")]
    InvalidDpi,
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("unsupported format: '{0}'")]
    UnsupportedFormat(String),
    #[error("at least one of width or height must be given")]
    MissingDimensions,
    #[error("dimensions must be greater than zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("requested size {width}x{height} is too large to allocate")]
    TooLarge { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("processing failed: {0}")]
    Processing(String),
    #[error("file system error: {0}")]
    FileSystem(String),
}

impl From<crate::imaging::BackendError> for ResizeError {
    fn from(err: crate::imaging::BackendError) -> Self {
        ResizeError::Processing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::BackendError;

    #[test]
    fn validation_passes_through_transparently() {
        let err: ResizeError = ValidationError::MissingDimensions.into();
        assert_eq!(
            err.to_string(),
            "at least one of width or height must be given"
        );
        assert!(matches!(
            err,
            ResizeError::Validation(ValidationError::MissingDimensions)
        ));
    }

    #[test]
    fn backend_error_becomes_processing_with_message() {
        let err: ResizeError = BackendError::ProcessingFailed("bad huffman table".into()).into();
        assert!(matches!(&err, ResizeError::Processing(msg) if msg.contains("bad huffman table")));
    }

    #[test]
    fn invalid_dimensions_message_names_both_sides() {
        let err = ValidationError::InvalidDimensions {
            width: 0,
            height: 12,
        };
        assert_eq!(
            err.to_string(),
            "dimensions must be greater than zero, got 0x12"
        );
    }
}
