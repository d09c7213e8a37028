//! Image processing: pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Embedded DPI** | custom header reader (JFIF, pHYs, TIFF IFD, BMP) |
//! | **Resize** | `resize_exact` with the chosen filter (Lanczos3 by default) |
//! | **Fill / Crop** | canvas composite / centred `crop_imm` |
//! | **Encode** | `image` codecs; `png` crate for PNG so `pHYs` can be written |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Transform**: Per-mode pixel placement on decoded images
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`ImageProcessor`], combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod resolution;
pub mod rust_backend;
mod transform;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{ImageProcessor, ProcessorSettings, ResizeOutcome, ResizeRequest};
pub use params::{Background, ParseNameError, Quality, ResampleFilter, ResizeMode, ResizeParams};
pub use rust_backend::{RustBackend, is_supported_extension, supported_input_extensions};
