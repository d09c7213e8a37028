//! # dpiresize
//!
//! Batch image resizer that thinks in print sizes. Widths and heights can be
//! given in pixels, inches, centimetres or millimetres; physical units are
//! converted to pixels at a chosen DPI, images are resized in one of four
//! modes, and the DPI is recorded in JPEG and PNG output.
//!
//! ```text
//! files ──► ImageProcessor ──► BatchHandler ──► ProcessingResult per file
//!             │  resolve sizes (units)            sorted by input path
//!             │  plan geometry (calculations)
//!             └─ decode / transform / encode (backend)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`units`] | Unit conversion between px/in/cm/mm at a DPI, embedded-DPI fallback |
//! | [`error`] | `ValidationError` and `ResizeError` |
//! | [`imaging`] | Geometry, the backend trait and its pure-Rust implementation, `ImageProcessor` |
//! | [`batch`] | Worker-pool batch runner with progress, cancellation and per-file results |
//! | [`scan`] | Directory scanner and header inspection |
//! | [`presets`] | Named sizes: photo prints, paper, ID photos, screens, social media |
//! | [`config`] | `dpiresize.toml` loading and validation |
//! | [`output`] | CLI text formatting |
//!
//! # Resize Modes
//!
//! | Mode | Output size | Aspect ratio |
//! |------|-------------|--------------|
//! | `stretch` | exactly the target | ignored |
//! | `fit` | largest size inside the target | kept |
//! | `fill` | exactly the target, padded with a background colour | kept |
//! | `crop` | exactly the target, overflow trimmed from the centre | kept |
//!
//! When only one side is given the other follows the source aspect ratio.
//!
//! # Failure Isolation
//!
//! A batch never aborts on a bad file. Each input yields one
//! [`batch::ProcessingResult`] with a success flag, sizes and an error kind
//! and message. Only an output directory that cannot be created fails the
//! batch as a whole.

pub mod batch;
pub mod config;
pub mod error;
pub mod imaging;
pub mod output;
pub mod presets;
pub mod scan;
pub mod units;

#[cfg(test)]
pub(crate) mod test_helpers;
