//! Resizer configuration module.
//!
//! Handles loading and validating `dpiresize.toml`. Every key is optional;
//! command-line flags override whatever the file sets.
//!
//! ## Config File Location
//!
//! `dpiresize.toml` in the working directory is picked up automatically. Use
//! `--config PATH` to load a file from anywhere else.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! dpi = 300                          # Resolution for unit conversion and output metadata
//! quality = 95                       # JPEG quality (1-100)
//! suffix = "_resized"                # Appended to each output file stem
//! mode = "fit"                       # stretch | fit | fill | crop
//! filter = "lanczos"                 # nearest | bilinear | bicubic | lanczos
//! background = [255, 255, 255, 255]  # RGBA canvas colour for fill mode
//!
//! [processing]
//! max_workers = 4                    # Omit for auto: min(cores + 1, 8)
//! ```
//!
//! Unknown keys are rejected, so a typo never silently falls back to a default.

use crate::imaging::{Background, ProcessorSettings, Quality, ResampleFilter, ResizeMode};
use crate::units::DEFAULT_DPI;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "dpiresize.toml";

/// Upper bound for the automatic worker count.
const MAX_AUTO_WORKERS: usize = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resizer configuration loaded from `dpiresize.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    pub dpi: u32,
    pub quality: u32,
    pub suffix: String,
    pub mode: ResizeMode,
    pub filter: ResampleFilter,
    pub background: Background,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            quality: Quality::default().value(),
            suffix: "_resized".to_string(),
            mode: ResizeMode::default(),
            filter: ResampleFilter::default(),
            background: Background::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dpi == 0 {
            return Err(ConfigError::Validation("dpi must be greater than 0".into()));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "suffix must not contain path separators".into(),
            ));
        }
        Ok(())
    }

    /// The per-image settings an [`ImageProcessor`](crate::imaging::ImageProcessor) needs.
    pub fn processor_settings(&self) -> ProcessorSettings {
        ProcessorSettings {
            dpi: self.dpi,
            quality: Quality::new(self.quality),
            filter: self.filter,
            background: self.background,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Number of batch workers. `1` runs on the calling thread; absent or
    /// `0` picks automatically.
    pub max_workers: Option<usize>,
}

/// Resolve the worker count for a batch.
///
/// - `None` or `Some(0)` → `min(available cores + 1, 8)`
/// - `Some(n)` → `n`, as given
pub fn effective_workers(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if n > 0 => n,
        _ => {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            (cores + 1).min(MAX_AUTO_WORKERS)
        }
    }
}

/// Parse and validate a config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<ResizerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ResizerConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load `dpiresize.toml` from a directory, or the defaults when there is none.
pub fn load_config(dir: &Path) -> Result<ResizerConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(ResizerConfig::default());
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `dpiresize.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dpiresize configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# Resolution in dots per inch. Used to turn in/cm/mm into pixels and
# written into JPEG and PNG output metadata.
dpi = 300

# JPEG encoding quality (1-100).
quality = 95

# Appended to each output file name: photo.jpg -> photo_resized.jpg
suffix = "_resized"

# How the image is mapped onto the requested size:
#   stretch - exact size, aspect ratio ignored
#   fit     - largest size inside the box, aspect ratio kept
#   fill    - exact size, image fitted and centred on the background colour
#   crop    - exact size, image covers the box and the overflow is trimmed
mode = "fit"

# Resampling filter: nearest, bilinear, bicubic, lanczos
filter = "lanczos"

# RGBA canvas colour used by fill mode.
background = [255, 255, 255, 255]

[processing]
# Number of parallel workers. 1 processes files one by one on the main
# thread. Omit for auto: CPU cores + 1, at most 8.
# max_workers = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ResizerConfig::default();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.quality, 95);
        assert_eq!(config.suffix, "_resized");
        assert_eq!(config.mode, ResizeMode::Fit);
        assert_eq!(config.filter, ResampleFilter::Lanczos);
        assert_eq!(config.background, Background::WHITE);
        assert_eq!(config.processing.max_workers, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
dpi = 150
mode = "crop"
"#;
        let config: ResizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.dpi, 150);
        assert_eq!(config.mode, ResizeMode::Crop);
        // Unspecified values keep defaults
        assert_eq!(config.quality, 95);
        assert_eq!(config.suffix, "_resized");
    }

    #[test]
    fn parse_background_and_filter() {
        let toml = r#"
filter = "bicubic"
background = [0, 0, 0, 0]
"#;
        let config: ResizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.filter, ResampleFilter::Bicubic);
        assert_eq!(config.background, Background([0, 0, 0, 0]));
    }

    #[test]
    fn processor_settings_carry_config_values() {
        let config = ResizerConfig {
            dpi: 72,
            quality: 60,
            ..Default::default()
        };
        let settings = config.processor_settings();
        assert_eq!(settings.dpi, 72);
        assert_eq!(settings.quality.value(), 60);
        assert_eq!(settings.filter, ResampleFilter::Lanczos);
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn parse_processing_config() {
        let toml = r#"
[processing]
max_workers = 4
"#;
        let config: ResizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.processing.max_workers, Some(4));
    }

    #[test]
    fn effective_workers_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let expected = (cores + 1).min(8);
        assert_eq!(effective_workers(None), expected);
        assert_eq!(effective_workers(Some(0)), expected);
    }

    #[test]
    fn effective_workers_explicit_override() {
        assert_eq!(effective_workers(Some(1)), 1);
        assert_eq!(effective_workers(Some(32)), 32);
    }

    // =========================================================================
    // Unknown keys and validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ResizerConfig, _> = toml::from_str("qualty = 90\n");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ResizerConfig, _> = toml::from_str("[procesing]\nmax_workers = 2\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_mode_rejected() {
        let result: Result<ResizerConfig, _> = toml::from_str("mode = \"squash\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(ResizerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = ResizerConfig::default();
        config.quality = 100;
        assert!(config.validate().is_ok());
        config.quality = 1;
        assert!(config.validate().is_ok());

        config.quality = 0;
        assert!(config.validate().unwrap_err().to_string().contains("quality"));
        config.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_dpi_zero() {
        let config = ResizerConfig {
            dpi: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_suffix() {
        let mut config = ResizerConfig::default();
        config.suffix = String::new();
        assert!(config.validate().is_ok());
        config.suffix = "_a/b".into();
        assert!(config.validate().is_err());
        config.suffix = "_a\\b".into();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), ResizerConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "dpi = 600\nsuffix = \"_print\"\n").unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.dpi, 600);
        assert_eq!(config.suffix, "_print");
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "quality = 200\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "dpi = [[[").unwrap();

        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_file_missing_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("elsewhere.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: ResizerConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ResizerConfig::default());
    }
}
