//! Parameter types for image operations.
//!
//! These describe *what* to do, not *how*. They sit between the
//! [`operations`](super::operations) layer (which validates a request and plans
//! the geometry) and the [`backend`](super::backend) (which does the pixel work),
//! so the processor can be driven against a mock backend in tests.
//!
//! ## Types
//!
//! - [`ResizeMode`]: stretch, fit, fill or crop.
//! - [`ResampleFilter`]: interpolation used when scaling (Lanczos by default).
//! - [`Background`]: RGBA canvas colour for [`ResizeMode::Fill`].
//! - [`Quality`]: lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`ResizeParams`]: everything the backend needs to produce one output file.

use super::calculations::ResizePlan;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// How a source image is mapped onto the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Exactly the requested size; aspect ratio is not preserved.
    Stretch,
    /// Largest size that fits inside the box with the source aspect ratio.
    #[default]
    Fit,
    /// Exactly the requested size; the image is fitted and centred on a background.
    Fill,
    /// Exactly the requested size; the image covers the box and the overflow is trimmed.
    Crop,
}

impl ResizeMode {
    pub const ALL: [ResizeMode; 4] = [
        ResizeMode::Stretch,
        ResizeMode::Fit,
        ResizeMode::Fill,
        ResizeMode::Crop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResizeMode::Stretch => "stretch",
            ResizeMode::Fit => "fit",
            ResizeMode::Fill => "fill",
            ResizeMode::Crop => "crop",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A mode, filter or colour name that did not match any known value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (use one of: {})", .expected.join(", "))]
pub struct ParseNameError {
    kind: &'static str,
    value: String,
    expected: Vec<&'static str>,
}

impl FromStr for ResizeMode {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ResizeMode::ALL
            .into_iter()
            .find(|mode| mode.name() == normalized)
            .ok_or_else(|| ParseNameError {
                kind: "resize mode",
                value: s.to_string(),
                expected: ResizeMode::ALL.iter().map(|m| m.name()).collect(),
            })
    }
}

/// Resampling filter, from fastest to highest quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
    Bicubic,
    #[default]
    Lanczos,
}

impl ResampleFilter {
    pub const ALL: [ResampleFilter; 4] = [
        ResampleFilter::Nearest,
        ResampleFilter::Bilinear,
        ResampleFilter::Bicubic,
        ResampleFilter::Lanczos,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResampleFilter::Nearest => "nearest",
            ResampleFilter::Bilinear => "bilinear",
            ResampleFilter::Bicubic => "bicubic",
            ResampleFilter::Lanczos => "lanczos",
        }
    }

    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::Bicubic => FilterType::CatmullRom,
            ResampleFilter::Lanczos => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ResampleFilter::ALL
            .into_iter()
            .find(|filter| filter.name() == normalized)
            .ok_or_else(|| ParseNameError {
                kind: "resample filter",
                value: s.to_string(),
                expected: ResampleFilter::ALL.iter().map(|f| f.name()).collect(),
            })
    }
}

/// RGBA background colour used to pad [`ResizeMode::Fill`] output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background(pub [u8; 4]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255, 255]);

    pub fn rgba(self) -> [u8; 4] {
        self.0
    }

    /// The colour with its alpha channel dropped.
    pub fn rgb(self) -> [u8; 3] {
        let [r, g, b, _] = self.0;
        [r, g, b]
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Parses `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
impl FromStr for Background {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ParseNameError {
            kind: "background colour",
            value: s.to_string(),
            expected: vec!["#RRGGBB", "#RRGGBBAA"],
        };
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }

        let mut channels = [255u8; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
            *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Background(channels))
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// One fully planned resize, ready for a backend to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub plan: ResizePlan,
    pub filter: ResampleFilter,
    pub background: Background,
    pub quality: Quality,
    /// Resolution written into the output file's metadata.
    pub dpi: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }

    #[test]
    fn resize_mode_parses_names() {
        assert_eq!("Crop".parse::<ResizeMode>().unwrap(), ResizeMode::Crop);
        assert_eq!(" fill ".parse::<ResizeMode>().unwrap(), ResizeMode::Fill);
        let err = "squash".parse::<ResizeMode>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown resize mode 'squash' (use one of: stretch, fit, fill, crop)"
        );
    }

    #[test]
    fn parse_error_boxes_as_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new("navy".parse::<Background>().unwrap_err());
        assert!(err.to_string().starts_with("unknown background colour 'navy'"));
    }

    #[test]
    fn resize_mode_default_is_fit() {
        assert_eq!(ResizeMode::default(), ResizeMode::Fit);
    }

    #[test]
    fn filter_maps_to_image_filters() {
        assert_eq!(ResampleFilter::default().filter_type(), FilterType::Lanczos3);
        assert_eq!(
            "bicubic".parse::<ResampleFilter>().unwrap().filter_type(),
            FilterType::CatmullRom
        );
        assert!("sinc".parse::<ResampleFilter>().is_err());
    }

    #[test]
    fn background_parses_hex() {
        assert_eq!(
            "#ff8000".parse::<Background>().unwrap(),
            Background([255, 128, 0, 255])
        );
        assert_eq!(
            "00000080".parse::<Background>().unwrap(),
            Background([0, 0, 0, 128])
        );
        assert!("#fff".parse::<Background>().is_err());
        assert!("#gg0000".parse::<Background>().is_err());
    }

    #[test]
    fn background_rgb_drops_alpha() {
        assert_eq!(Background([1, 2, 3, 4]).rgb(), [1, 2, 3]);
        assert_eq!(Background::default(), Background::WHITE);
    }
}
