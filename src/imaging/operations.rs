//! High-level image operations.
//!
//! [`ImageProcessor`] validates a [`ResizeRequest`], resolves the requested
//! physical size to pixels, plans the geometry, and hands the plan to an
//! [`ImageBackend`]. It holds only its [`ProcessorSettings`], so one instance
//! can be shared by every batch worker.

use super::backend::{Dimensions, ImageBackend};
use super::calculations::{plan_resize, resolve_dimensions};
use super::params::{Background, Quality, ResampleFilter, ResizeMode, ResizeParams};
use super::rust_backend::{RustBackend, is_supported_extension};
use crate::error::{ResizeError, ValidationError};
use crate::units::{DEFAULT_DPI, Unit, get_image_dpi};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings applied to every resize a processor performs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorSettings {
    /// Resolution for unit conversion and for the output file's metadata.
    pub dpi: u32,
    pub quality: Quality,
    pub filter: ResampleFilter,
    /// Canvas colour for [`ResizeMode::Fill`].
    pub background: Background,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            quality: Quality::default(),
            filter: ResampleFilter::default(),
            background: Background::default(),
        }
    }
}

/// One file to resize. At least one of `width`/`height` must be present and
/// non-zero; each is interpreted in its own unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub width_unit: Unit,
    pub height_unit: Unit,
    pub mode: ResizeMode,
}

impl ResizeRequest {
    /// A request with no dimensions yet, pixel units and Fit mode.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            width: None,
            height: None,
            width_unit: Unit::Px,
            height_unit: Unit::Px,
            mode: ResizeMode::default(),
        }
    }

    pub fn width(mut self, value: f64, unit: Unit) -> Self {
        self.width = Some(value);
        self.width_unit = unit;
        self
    }

    pub fn height(mut self, value: f64, unit: Unit) -> Self {
        self.height = Some(value);
        self.height_unit = unit;
        self
    }

    pub fn mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Source and written sizes of a successful resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub original: Dimensions,
    pub output: Dimensions,
}

pub struct ImageProcessor<B: ImageBackend = RustBackend> {
    settings: ProcessorSettings,
    backend: B,
}

impl ImageProcessor<RustBackend> {
    pub fn new(settings: ProcessorSettings) -> Self {
        Self::with_backend(settings, RustBackend::new())
    }
}

impl Default for ImageProcessor<RustBackend> {
    fn default() -> Self {
        Self::new(ProcessorSettings::default())
    }
}

impl<B: ImageBackend> ImageProcessor<B> {
    pub fn with_backend(settings: ProcessorSettings, backend: B) -> Self {
        Self { settings, backend }
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resize one image and return the dimensions of the written file.
    pub fn resize(&self, request: &ResizeRequest) -> Result<Dimensions, ResizeError> {
        self.resize_detailed(request).map(|outcome| outcome.output)
    }

    /// Like [`resize`](Self::resize), also reporting the source dimensions.
    ///
    /// Checks run in order: the file exists, its extension is supported, it can
    /// be identified, and the requested size resolves to a non-empty box small
    /// enough to allocate. Only then is the backend asked to decode and encode.
    pub fn resize_detailed(&self, request: &ResizeRequest) -> Result<ResizeOutcome, ResizeError> {
        let input = &request.input;
        check_input(input)?;

        let original = self.identify(input)?;
        let target = resolve_dimensions(
            original.as_tuple(),
            request.width,
            request.height,
            request.width_unit,
            request.height_unit,
            self.settings.dpi,
        )?;
        let plan = plan_resize(original.as_tuple(), target, request.mode);
        plan.check_size()?;

        debug!(
            input = %input.display(),
            output = %request.output.display(),
            mode = %request.mode,
            original = %original,
            target = ?plan.target,
            "resizing"
        );

        self.backend.resize(&ResizeParams {
            source: input.clone(),
            output: request.output.clone(),
            plan,
            filter: self.settings.filter,
            background: self.settings.background,
            quality: self.settings.quality,
            dpi: self.settings.dpi,
        })?;

        Ok(ResizeOutcome {
            original,
            output: plan.output_size().into(),
        })
    }

    /// Native pixel size of an image.
    pub fn identify(&self, path: &Path) -> Result<Dimensions, ResizeError> {
        Ok(self.backend.identify(path)?)
    }

    /// Resolution embedded in the file, or the default DPI when it has none.
    pub fn source_dpi(&self, path: &Path) -> u32 {
        get_image_dpi(self.backend.read_resolution(path).ok().flatten())
    }
}

fn check_input(path: &Path) -> Result<(), ValidationError> {
    if !path.is_file() {
        return Err(ValidationError::FileNotFound(path.to_path_buf()));
    }
    if !is_supported_extension(path) {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        return Err(ValidationError::UnsupportedFormat(ext));
    }
    Ok(())
}
