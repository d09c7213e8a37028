//! Concurrent batch resizing.
//!
//! [`BatchHandler`] runs one [`ImageProcessor`] over a list of files and
//! returns exactly one [`ProcessingResult`] per input, sorted by input path.
//!
//! ## Scheduling
//!
//! | Workers | Where files run |
//! |---|---|
//! | `1` | inline on the calling thread, in submission order |
//! | `n > 1` | a dedicated rayon pool of `n` threads (`resize-worker-{i}`) |
//! | `0` | auto: `min(cores + 1, 8)`, see [`effective_workers`] |
//!
//! Both paths run the same per-file function; only the iterator differs.
//!
//! ## Failure isolation
//!
//! Every per-file error (validation, decode, encode, I/O) is turned into a
//! failed result and the batch moves on. A panic inside one file's resize is
//! caught and reported the same way, as a processing failure. The only batch-fatal condition is an
//! output directory that cannot be created: the batch then returns a single
//! synthetic failure and touches no input.
//!
//! ## Cancellation and progress
//!
//! [`BatchHandler::cancel`] (or a [`CancelHandle`] cloned from it) sets a flag
//! that each file checks before it starts. Files already running finish
//! normally; files not yet started come back as failures with the message
//! `cancelled`. The completed-file counter and the progress callback share one
//! mutex, so callbacks see `1, 2, …, N` in order and never overlap.

use crate::config::effective_workers;
use crate::error::ResizeError;
use crate::imaging::{
    Dimensions, ImageBackend, ImageProcessor, ResizeMode, ResizeRequest, RustBackend,
};
use crate::units::Unit;
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Error message carried by files skipped after cancellation.
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// Called after each file with `(completed, total, file name)`.
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Why a file did not produce an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Processing,
    FileSystem,
    Cancelled,
}

impl From<&ResizeError> for FailureKind {
    fn from(err: &ResizeError) -> Self {
        match err {
            ResizeError::Validation(_) => FailureKind::Validation,
            ResizeError::Processing(_) => FailureKind::Processing,
            ResizeError::FileSystem(_) => FailureKind::FileSystem,
        }
    }
}

/// Outcome of one file. Sizes are zero and `error_message` is non-empty
/// exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub success: bool,
    pub original_size: Dimensions,
    pub final_size: Dimensions,
    pub error_kind: Option<FailureKind>,
    pub error_message: String,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_micros() as f64 / 1000.0)
}

impl ProcessingResult {
    fn succeeded(
        input: &Path,
        output: PathBuf,
        original: Dimensions,
        final_size: Dimensions,
        elapsed: Duration,
    ) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output,
            success: true,
            original_size: original,
            final_size,
            error_kind: None,
            error_message: String::new(),
            elapsed,
        }
    }

    fn failed(
        input: &Path,
        output: PathBuf,
        kind: FailureKind,
        message: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output,
            success: false,
            original_size: Dimensions::default(),
            final_size: Dimensions::default(),
            error_kind: Some(kind),
            error_message: message,
            elapsed,
        }
    }

    fn cancelled(input: &Path) -> Self {
        Self::failed(
            input,
            PathBuf::new(),
            FailureKind::Cancelled,
            CANCELLED_MESSAGE.to_string(),
            Duration::ZERO,
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.error_kind == Some(FailureKind::Cancelled)
    }
}

/// Totals over a batch's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Failures other than cancellation.
    pub failed: usize,
    pub cancelled: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ProcessingResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            if result.success {
                summary.succeeded += 1;
            } else if result.is_cancelled() {
                summary.cancelled += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Size and naming shared by every file in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub width_unit: Unit,
    pub height_unit: Unit,
    pub mode: ResizeMode,
    /// Inserted between the input stem and its extension.
    pub suffix: String,
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            width_unit: Unit::Px,
            height_unit: Unit::Px,
            mode: ResizeMode::default(),
            suffix: "_resized".to_string(),
        }
    }
}

/// Shareable cancellation flag for a [`BatchHandler`].
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Stop starting new files. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Completed-file counter; the callback runs while the lock is held.
struct Progress<'a> {
    completed: Mutex<usize>,
    total: usize,
    callback: Option<&'a ProgressCallback>,
}

impl Progress<'_> {
    fn record(&self, file_name: &str) {
        let mut completed = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        *completed += 1;
        if let Some(callback) = self.callback {
            callback(*completed, self.total, file_name);
        }
    }
}

pub struct BatchHandler<B: ImageBackend = RustBackend> {
    processor: ImageProcessor<B>,
    workers: usize,
    progress: Option<ProgressCallback>,
    cancel: CancelHandle,
}

impl<B: ImageBackend> BatchHandler<B> {
    /// `max_workers == 0` picks the worker count automatically.
    pub fn new(processor: ImageProcessor<B>, max_workers: usize) -> Self {
        Self {
            processor,
            workers: effective_workers(Some(max_workers)),
            progress: None,
            cancel: CancelHandle::default(),
        }
    }

    pub fn with_progress(
        mut self,
        callback: impl Fn(usize, usize, &str) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn processor(&self) -> &ImageProcessor<B> {
        &self.processor
    }

    /// Stop the running batch from starting any further files.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle that can cancel this handler from another thread or from
    /// inside the progress callback.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Resize every file into `output_dir`, returning one result per file
    /// sorted by input path.
    ///
    /// Clears any earlier cancellation before starting.
    pub fn process_batch(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        request: &BatchRequest,
    ) -> Vec<ProcessingResult> {
        self.cancel.reset();

        if let Err(err) = std::fs::create_dir_all(output_dir) {
            warn!(output = %output_dir.display(), error = %err, "cannot create output directory");
            return vec![ProcessingResult::failed(
                Path::new(""),
                output_dir.to_path_buf(),
                FailureKind::FileSystem,
                format!("could not create output directory {}: {err}", output_dir.display()),
                Duration::ZERO,
            )];
        }

        info!(
            files = files.len(),
            workers = self.workers,
            output = %output_dir.display(),
            mode = %request.mode,
            "starting batch"
        );

        let progress = Progress {
            completed: Mutex::new(0),
            total: files.len(),
            callback: self.progress.as_ref(),
        };
        let task = |input: &PathBuf| {
            let result = self.process_isolated(input, output_dir, request);
            progress.record(&display_name(input));
            result
        };

        let mut results = self.run_tasks(files, task);
        results.sort_by_cached_key(|r| r.input_path.to_string_lossy().into_owned());

        let summary = BatchSummary::from_results(&results);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "batch finished"
        );
        results
    }

    fn run_tasks<F>(&self, files: &[PathBuf], task: F) -> Vec<ProcessingResult>
    where
        F: Fn(&PathBuf) -> ProcessingResult + Sync,
    {
        if self.workers <= 1 {
            return files.iter().map(task).collect();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("resize-worker-{i}"))
            .build()
        {
            Ok(pool) => pool.install(|| files.par_iter().map(&task).collect()),
            Err(err) => {
                warn!(error = %err, "could not start worker pool, processing sequentially");
                files.iter().map(task).collect()
            }
        }
    }

    /// [`process_one`](Self::process_one), with a panic in the codec or
    /// backend turned into a failed result for that file alone.
    fn process_isolated(
        &self,
        input: &Path,
        output_dir: &Path,
        request: &BatchRequest,
    ) -> ProcessingResult {
        let started = Instant::now();
        panic::catch_unwind(AssertUnwindSafe(|| self.process_one(input, output_dir, request)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                warn!(file = %input.display(), panic = %message, "resize panicked");
                ProcessingResult::failed(
                    input,
                    output_path_for(input, output_dir, &request.suffix),
                    FailureKind::Processing,
                    format!("processing failed: panicked: {message}"),
                    started.elapsed(),
                )
            })
    }

    fn process_one(
        &self,
        input: &Path,
        output_dir: &Path,
        request: &BatchRequest,
    ) -> ProcessingResult {
        if self.cancel.is_cancelled() {
            debug!(file = %input.display(), "skipped after cancel");
            return ProcessingResult::cancelled(input);
        }

        let started = Instant::now();
        let output = output_path_for(input, output_dir, &request.suffix);
        let resize = ResizeRequest {
            input: input.to_path_buf(),
            output: output.clone(),
            width: request.width,
            height: request.height,
            width_unit: request.width_unit,
            height_unit: request.height_unit,
            mode: request.mode,
        };

        match self.processor.resize_detailed(&resize) {
            Ok(outcome) => {
                debug!(file = %input.display(), size = %outcome.output, "resized");
                ProcessingResult::succeeded(
                    input,
                    output,
                    outcome.original,
                    outcome.output,
                    started.elapsed(),
                )
            }
            Err(err) => {
                warn!(file = %input.display(), error = %err, "resize failed");
                ProcessingResult::failed(
                    input,
                    output,
                    FailureKind::from(&err),
                    err.to_string(),
                    started.elapsed(),
                )
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `{stem}{suffix}{.extension}` inside `output_dir`; the extension keeps its case.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or_default());
    name.push(suffix);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    output_dir.join(name)
}

/// Whether `dir` can be created and written to. Never fails; any OS error
/// reads as `false`.
pub fn validate_output_directory(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let marker = dir.join(format!(".write_test_{}", std::process::id()));
    match std::fs::File::create(&marker) {
        Ok(_) => std::fs::remove_file(&marker).is_ok(),
        Err(_) => false,
    }
}
