//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Integer divisions floor, matching what a user would measure on the output.

use super::params::ResizeMode;
use crate::error::ValidationError;
use crate::units::{Unit, to_pixels};

/// Turn the requested width/height (either may be absent) into a pixel box.
///
/// A value of `Some(0.0)` counts as absent. When only one side is given, the
/// other is derived from the source aspect ratio.
///
/// # Examples
/// ```
/// # use dpiresize::imaging::calculations::resolve_dimensions;
/// # use dpiresize::units::Unit;
/// // 10cm wide at 300 DPI, height follows a 4:3 source
/// let dims = resolve_dimensions((4000, 3000), Some(10.0), None, Unit::Cm, Unit::Cm, 300);
/// assert_eq!(dims.unwrap(), (1181, 885));
/// ```
pub fn resolve_dimensions(
    original: (u32, u32),
    width: Option<f64>,
    height: Option<f64>,
    width_unit: Unit,
    height_unit: Unit,
    dpi: u32,
) -> Result<(u32, u32), ValidationError> {
    let (orig_w, orig_h) = original;
    let width = width.filter(|v| *v != 0.0);
    let height = height.filter(|v| *v != 0.0);

    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => (to_pixels(w, width_unit, dpi)?, to_pixels(h, height_unit, dpi)?),
        (Some(w), None) => {
            let w = to_pixels(w, width_unit, dpi)?;
            (w, scale_side(w, orig_h, orig_w))
        }
        (None, Some(h)) => {
            let h = to_pixels(h, height_unit, dpi)?;
            (scale_side(h, orig_w, orig_h), h)
        }
        (None, None) => return Err(ValidationError::MissingDimensions),
    };

    if w == 0 || h == 0 {
        return Err(ValidationError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    Ok((w, h))
}

/// `value * numerator / denominator`, floored. Zero denominators yield zero.
fn scale_side(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let scaled = u64::from(value) * u64::from(numerator) / u64::from(denominator);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Size the source is scaled to before any padding or cropping.
///
/// - **Stretch** / **Fill**: the target box itself.
/// - **Fit**: the largest aspect-preserving size inside the box (at least 1×1).
/// - **Crop**: the smallest aspect-preserving size covering the box.
///
/// # Examples
/// ```
/// # use dpiresize::imaging::calculations::calculate_dimensions;
/// # use dpiresize::imaging::ResizeMode;
/// assert_eq!(calculate_dimensions((800, 600), (400, 400), ResizeMode::Fit), (400, 300));
/// assert_eq!(calculate_dimensions((3000, 4000), (377, 507), ResizeMode::Crop), (380, 507));
/// ```
pub fn calculate_dimensions(original: (u32, u32), target: (u32, u32), mode: ResizeMode) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let (tgt_w, tgt_h) = target;

    if orig_w == 0 || orig_h == 0 || tgt_w == 0 || tgt_h == 0 {
        return target;
    }

    let orig_ratio = orig_w as f64 / orig_h as f64;
    let tgt_ratio = tgt_w as f64 / tgt_h as f64;

    match mode {
        ResizeMode::Stretch | ResizeMode::Fill => target,
        ResizeMode::Fit => {
            let (w, h) = if tgt_ratio > orig_ratio {
                // Box is wider than the image: height is the limit
                let h = tgt_h.min(scale_side(tgt_w, orig_h, orig_w));
                (scale_side(h, orig_w, orig_h), h)
            } else {
                let w = tgt_w.min(scale_side(tgt_h, orig_w, orig_h));
                (w, scale_side(w, orig_h, orig_w))
            };
            (w.max(1), h.max(1))
        }
        ResizeMode::Crop => {
            if orig_ratio > tgt_ratio {
                // Image is wider: match height, overflow horizontally
                (scale_side(tgt_h, orig_w, orig_h).max(tgt_w), tgt_h)
            } else {
                (tgt_w, scale_side(tgt_w, orig_h, orig_w).max(tgt_h))
            }
        }
    }
}

/// Everything geometric about one resize, decided before any pixels move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub mode: ResizeMode,
    /// The resolved pixel box the caller asked for.
    pub target: (u32, u32),
    /// What [`calculate_dimensions`] returned for this mode.
    pub scaled: (u32, u32),
}

impl ResizePlan {
    /// Dimensions of the file that will be written.
    ///
    /// Only Fit deviates from the target box; Fill pads and Crop trims back to it.
    pub fn output_size(&self) -> (u32, u32) {
        match self.mode {
            ResizeMode::Fit => self.scaled,
            ResizeMode::Stretch | ResizeMode::Fill | ResizeMode::Crop => self.target,
        }
    }
}

/// Largest pixel buffer a plan may ask the backend to allocate (16384 × 16384).
pub const MAX_PIXELS: u64 = 1 << 28;

impl ResizePlan {
    /// Reject plans whose intermediate or output buffer would exceed [`MAX_PIXELS`].
    ///
    /// Crop scales past the target before trimming, so both sizes are checked.
    pub fn check_size(&self) -> Result<(), ValidationError> {
        for (width, height) in [self.scaled, self.target] {
            if u64::from(width) * u64::from(height) > MAX_PIXELS {
                return Err(ValidationError::TooLarge { width, height });
            }
        }
        Ok(())
    }
}

pub fn plan_resize(original: (u32, u32), target: (u32, u32), mode: ResizeMode) -> ResizePlan {
    ResizePlan {
        mode,
        target,
        scaled: calculate_dimensions(original, target, mode),
    }
}

/// Where a Fill image lands on its canvas.
///
/// Returns `(width, height, x, y)`: the source fitted inside `canvas` without
/// upscaling, and its top-left offset so it is centred.
pub fn fill_placement(source: (u32, u32), canvas: (u32, u32)) -> (u32, u32, u32, u32) {
    let (src_w, src_h) = source;
    let (can_w, can_h) = canvas;

    let (w, h) = if src_w <= can_w && src_h <= can_h {
        (src_w, src_h)
    } else {
        calculate_dimensions(source, canvas, ResizeMode::Fit)
    };
    let (w, h) = (w.min(can_w), h.min(can_h));
    (w, h, (can_w - w) / 2, (can_h - h) / 2)
}

/// Top-left corner of a centred `target` window inside `scaled`.
///
/// Odd remainders leave the extra pixel on the right/bottom side.
pub fn center_crop_offsets(scaled: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        scaled.0.saturating_sub(target.0) / 2,
        scaled.1.saturating_sub(target.1) / 2,
    )
}
