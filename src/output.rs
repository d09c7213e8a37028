//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, no I/O) and,
//! where the command prints a block, a `print_*` wrapper writing to stdout.
//! Progress lines go to stderr from `main` so stdout stays parseable.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! [ 1/3] beach.jpg
//! [ 2/3] dunes.png
//! [ 3/3] notes.bmp
//! ok    beach.jpg -> out/beach_resized.jpg (4000x3000 -> 1181x886)
//! ok    dunes.png -> out/dunes_resized.png (1200x800 -> 1181x787)
//! FAIL  notes.bmp: processing failed: unexpected end of file
//!
//! 2 of 3 resized, 1 failed
//! ```
//!
//! ## Scan
//!
//! ```text
//! beach.jpg  4000x3000 px  300 dpi  33.87 x 25.40 cm
//! broken.png  unreadable: ...
//!
//! 2 images
//! ```

use crate::batch::{BatchSummary, ProcessingResult};
use crate::presets::{SizePreset, categories};
use crate::scan::ScannedImage;
use crate::units::{Unit, from_pixels};
use serde::Serialize;
use std::path::Path;

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Trim trailing zeros: `21.0` -> `21`, `29.70` -> `29.7`.
fn format_number(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Resize
// ============================================================================

/// One progress line, with the counter padded to the width of `total`.
pub fn format_progress(completed: usize, total: usize, file_name: &str) -> String {
    let width = total.to_string().len();
    format!("[{completed:>width$}/{total}] {file_name}")
}

/// One line per result, in the order given.
pub fn format_batch_results(results: &[ProcessingResult]) -> Vec<String> {
    results
        .iter()
        .map(|result| {
            if result.success {
                format!(
                    "ok    {} -> {} ({} -> {})",
                    file_label(&result.input_path),
                    result.output_path.display(),
                    result.original_size,
                    result.final_size
                )
            } else if result.is_cancelled() {
                format!("skip  {}: {}", file_label(&result.input_path), result.error_message)
            } else if result.input_path.as_os_str().is_empty() {
                format!("FAIL  {}", result.error_message)
            } else {
                format!("FAIL  {}: {}", file_label(&result.input_path), result.error_message)
            }
        })
        .collect()
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    let mut line = format!("{} of {} resized", summary.succeeded, summary.total);
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    if summary.cancelled > 0 {
        line.push_str(&format!(", {} cancelled", summary.cancelled));
    }
    line
}

#[derive(Serialize)]
struct BatchReport<'a> {
    summary: BatchSummary,
    results: &'a [ProcessingResult],
}

/// Pretty JSON document with a `summary` object and the `results` array.
pub fn format_batch_json(results: &[ProcessingResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&BatchReport {
        summary: BatchSummary::from_results(results),
        results,
    })
}

/// Print result lines, a blank line and the summary to stdout.
pub fn print_batch_results(results: &[ProcessingResult]) {
    for line in format_batch_results(results) {
        println!("{line}");
    }
    println!();
    println!("{}", format_batch_summary(&BatchSummary::from_results(results)));
}

// ============================================================================
// Scan
// ============================================================================

/// Pixel size, resolution and physical size (in `unit`) per image.
pub fn format_scan_output(images: &[ScannedImage], unit: Unit) -> Vec<String> {
    let mut lines: Vec<String> = images
        .iter()
        .map(|image| {
            let name = file_label(&image.path);
            match image.size {
                Some(size) => {
                    let physical = match (
                        from_pixels(size.width, unit, image.dpi),
                        from_pixels(size.height, unit, image.dpi),
                    ) {
                        (Ok(w), Ok(h)) => {
                            format!("  {} x {} {unit}", format_number(w), format_number(h))
                        }
                        _ => String::new(),
                    };
                    format!("{name}  {size} px  {} dpi{physical}", image.dpi)
                }
                None => format!(
                    "{name}  unreadable: {}",
                    image.error.as_deref().unwrap_or("unknown error")
                ),
            }
        })
        .collect();

    lines.push(String::new());
    lines.push(plural(images.len(), "image"));
    lines
}

pub fn print_scan_output(images: &[ScannedImage], unit: Unit) {
    for line in format_scan_output(images, unit) {
        println!("{line}");
    }
}

// ============================================================================
// Presets
// ============================================================================

/// Presets grouped under their category headers, categories sorted.
///
/// ```text
/// ISO
///     a4             A4 (21×29.7 cm)    21 x 29.7 cm
/// ```
pub fn format_presets(presets: &[&SizePreset]) -> Vec<String> {
    let id_width = presets.iter().map(|p| p.id.len()).max().unwrap_or(0);
    let name_width = presets
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for category in categories() {
        let members: Vec<_> = presets.iter().filter(|p| p.category == category).collect();
        if members.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(category.to_string());
        for preset in members {
            let pad = name_width - preset.name.chars().count();
            lines.push(format!(
                "    {:<id_width$}  {}{}  {} x {} {}",
                preset.id,
                preset.name,
                " ".repeat(pad),
                format_number(preset.width),
                format_number(preset.height),
                preset.unit
            ));
        }
    }
    lines
}

pub fn print_presets(presets: &[&SizePreset]) {
    for line in format_presets(presets) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FailureKind;
    use crate::imaging::Dimensions;
    use crate::presets::{find_preset, search_presets};
    use std::path::PathBuf;
    use std::time::Duration;

    fn ok(name: &str) -> ProcessingResult {
        ProcessingResult {
            input_path: PathBuf::from("/in").join(name),
            output_path: PathBuf::from("out").join(name.replace(".jpg", "_resized.jpg")),
            success: true,
            original_size: Dimensions::new(4000, 3000),
            final_size: Dimensions::new(1181, 886),
            error_kind: None,
            error_message: String::new(),
            elapsed: Duration::from_millis(40),
        }
    }

    fn failed(name: &str, kind: FailureKind, message: &str) -> ProcessingResult {
        ProcessingResult {
            input_path: PathBuf::from("/in").join(name),
            output_path: PathBuf::new(),
            success: false,
            original_size: Dimensions::default(),
            final_size: Dimensions::default(),
            error_kind: Some(kind),
            error_message: message.to_string(),
            elapsed: Duration::ZERO,
        }
    }

    // =========================================================================
    // Resize output
    // =========================================================================

    #[test]
    fn progress_pads_counter() {
        assert_eq!(format_progress(3, 12, "a.jpg"), "[ 3/12] a.jpg");
        assert_eq!(format_progress(1, 1, "a.jpg"), "[1/1] a.jpg");
    }

    #[test]
    fn result_lines() {
        let lines = format_batch_results(&[
            ok("beach.jpg"),
            failed("notes.bmp", FailureKind::Processing, "processing failed: eof"),
            failed("later.jpg", FailureKind::Cancelled, "cancelled"),
        ]);
        assert_eq!(
            lines,
            [
                "ok    beach.jpg -> out/beach_resized.jpg (4000x3000 -> 1181x886)",
                "FAIL  notes.bmp: processing failed: eof",
                "skip  later.jpg: cancelled",
            ]
        );
    }

    #[test]
    fn output_directory_failure_has_no_file_label() {
        let mut result = failed("x", FailureKind::FileSystem, "could not create output directory /o");
        result.input_path = PathBuf::new();
        assert_eq!(
            format_batch_results(&[result]),
            ["FAIL  could not create output directory /o"]
        );
    }

    #[test]
    fn summary_mentions_only_nonzero_counts() {
        let all_ok = BatchSummary {
            total: 2,
            succeeded: 2,
            failed: 0,
            cancelled: 0,
        };
        assert_eq!(format_batch_summary(&all_ok), "2 of 2 resized");

        let mixed = BatchSummary {
            total: 5,
            succeeded: 2,
            failed: 1,
            cancelled: 2,
        };
        assert_eq!(
            format_batch_summary(&mixed),
            "2 of 5 resized, 1 failed, 2 cancelled"
        );
    }

    #[test]
    fn json_report_has_summary_and_results() {
        let results = [ok("a.jpg"), failed("b.jpg", FailureKind::Validation, "bad")];
        let json: serde_json::Value =
            serde_json::from_str(&format_batch_json(&results).unwrap()).unwrap();
        assert_eq!(json["summary"]["total"], 2);
        assert_eq!(json["summary"]["failed"], 1);
        assert_eq!(json["results"][0]["final_size"]["width"], 1181);
        assert_eq!(json["results"][1]["error_kind"], "validation");
    }

    // =========================================================================
    // Scan output
    // =========================================================================

    #[test]
    fn scan_lines_show_physical_size() {
        let images = [
            ScannedImage {
                path: PathBuf::from("/p/a4.png"),
                size: Some(Dimensions::new(2480, 3508)),
                dpi: 300,
                error: None,
            },
            ScannedImage {
                path: PathBuf::from("/p/bad.jpg"),
                size: None,
                dpi: 300,
                error: Some("processing failed: truncated".into()),
            },
        ];
        let lines = format_scan_output(&images, Unit::Cm);
        assert_eq!(lines[0], "a4.png  2480x3508 px  300 dpi  21 x 29.7 cm");
        assert_eq!(lines[1], "bad.jpg  unreadable: processing failed: truncated");
        assert_eq!(lines[3], "2 images");
    }

    #[test]
    fn scan_of_nothing() {
        assert_eq!(format_scan_output(&[], Unit::In), ["", "0 images"]);
    }

    // =========================================================================
    // Presets output
    // =========================================================================

    #[test]
    fn presets_grouped_by_category() {
        let presets = [
            find_preset("passport").unwrap(),
            find_preset("a4").unwrap(),
            find_preset("letter").unwrap(),
        ];
        let lines = format_presets(&presets);
        let headers: Vec<_> = lines
            .iter()
            .filter(|l| !l.is_empty() && !l.starts_with(' '))
            .map(String::as_str)
            .collect();
        assert_eq!(headers, ["Document", "ID", "ISO"]);
        assert!(lines.iter().any(|l| l.contains("a4") && l.ends_with("21 x 29.7 cm")));
        assert!(lines.iter().any(|l| l.ends_with("51 x 51 mm")));
    }

    #[test]
    fn full_catalog_lists_every_preset() {
        let all = search_presets("");
        let lines = format_presets(&all);
        let rows = lines.iter().filter(|l| l.starts_with("    ")).count();
        assert_eq!(rows, all.len());
    }
}
