//! Physical units to pixels and back.
//!
//! Every conversion scales through a resolution in dots per inch:
//!
//! | Unit | Pixels |
//! |------|--------|
//! | `px` | `value` (identity) |
//! | `in` | `value × dpi` |
//! | `cm` | `value / 2.54 × dpi` |
//! | `mm` | `value / 25.4 × dpi` |
//!
//! [`to_pixels`] truncates toward zero, so an A4 page (21 × 29.7 cm) at 300 DPI is
//! 2480 × 3507 px. [`from_pixels`] is the exact inverse scaling and does not round.
//!
//! All functions are pure and can be called from any worker thread.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resolution assumed when neither the caller nor the image says otherwise.
pub const DEFAULT_DPI: u32 = 300;

const CM_PER_INCH: f64 = 2.54;
const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Px,
    In,
    Cm,
    Mm,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Px, Unit::In, Unit::Cm, Unit::Mm];

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::In => "in",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Unit::ALL
            .into_iter()
            .find(|unit| unit.symbol() == normalized)
            .ok_or_else(|| ValidationError::InvalidUnit(s.trim().to_string()))
    }
}

/// A non-negative length in one of the supported units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    value: f64,
    unit: Unit,
}

impl Measurement {
    pub fn new(value: f64, unit: Unit) -> Result<Self, ValidationError> {
        check_value(value)?;
        Ok(Self { value, unit })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn to_pixels(&self, dpi: u32) -> Result<u32, ValidationError> {
        to_pixels(self.value, self.unit, dpi)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

fn check_value(value: f64) -> Result<(), ValidationError> {
    // NaN fails this comparison too
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue(value))
    }
}

fn check_dpi(dpi: u32) -> Result<(), ValidationError> {
    if dpi == 0 {
        Err(ValidationError::InvalidDpi)
    } else {
        Ok(())
    }
}

/// Convert a measurement to whole pixels, truncating any fractional pixel.
///
/// ```
/// use dpiresize::units::{to_pixels, Unit};
/// assert_eq!(to_pixels(21.0, Unit::Cm, 300).unwrap(), 2480);
/// assert_eq!(to_pixels(2.0, Unit::In, 150).unwrap(), 300);
/// ```
pub fn to_pixels(value: f64, unit: Unit, dpi: u32) -> Result<u32, ValidationError> {
    check_value(value)?;
    check_dpi(dpi)?;

    let dpi = f64::from(dpi);
    let pixels = match unit {
        Unit::Px => value,
        Unit::In => value * dpi,
        Unit::Cm => (value / CM_PER_INCH) * dpi,
        Unit::Mm => (value / MM_PER_INCH) * dpi,
    };
    Ok(pixels.trunc() as u32)
}

/// Convert a pixel count back to the given unit without rounding.
pub fn from_pixels(pixels: u32, unit: Unit, dpi: u32) -> Result<f64, ValidationError> {
    check_dpi(dpi)?;

    let pixels = f64::from(pixels);
    let inches = pixels / f64::from(dpi);
    Ok(match unit {
        Unit::Px => pixels,
        Unit::In => inches,
        Unit::Cm => inches * CM_PER_INCH,
        Unit::Mm => inches * MM_PER_INCH,
    })
}

/// Parse an optional dimension typed by a user.
///
/// Blank input means "not given". Anything else must be a finite number
/// greater than zero.
///
/// ```
/// use dpiresize::units::parse_optional_dimension;
/// assert_eq!(parse_optional_dimension(" 21.5 ").unwrap(), Some(21.5));
/// assert_eq!(parse_optional_dimension("").unwrap(), None);
/// assert!(parse_optional_dimension("0").is_err());
/// ```
pub fn parse_optional_dimension(text: &str) -> Result<Option<f64>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(value) if value > 0.0 && value.is_finite() => Ok(Some(value)),
        Ok(value) => Err(ValidationError::InvalidValue(value)),
        Err(_) => Err(ValidationError::InvalidValue(f64::NAN)),
    }
}

/// Resolution embedded in an image file, in dots per inch per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Resolution {
    pub fn uniform(dpi: u32) -> Self {
        Self {
            horizontal: dpi,
            vertical: dpi,
        }
    }
}

/// DPI to use for an image: the horizontal component of its embedded
/// resolution, or [`DEFAULT_DPI`] when there is none (or it is zero).
pub fn get_image_dpi(resolution: Option<Resolution>) -> u32 {
    match resolution {
        Some(res) if res.horizontal > 0 => res.horizontal,
        _ => DEFAULT_DPI,
    }
}
