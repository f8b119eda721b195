//! Batch compositing pipeline.
//!
//! A [`BatchRequest`] is frozen into a [`BatchJob`] before any work starts:
//! the source list, pixel-rounded rectangle, prepared base, naming settings
//! and job stamp are fixed at that point. Later edits to the placement
//! session do not reach a running job.
//!
//! Items run on blocking worker threads, at most `worker_count` at a time.
//! Each item is isolated: a decode, encode or write failure (or a panic) is
//! recorded in its [`ItemResult`] and the job keeps going. Only setup
//! failures abort the job.
//!
//! Progress and completion are reported on an unbounded channel so workers
//! and the dispatcher never wait on the consumer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};

use postermill_common::clock::{JobClock, JobStamp};
use postermill_common::config::BatchDefaults;
use postermill_common::error::{PostermillError, PostermillResult};
use postermill_core::generate_name;
use postermill_model::{ArchiveKind, NamingSpec, OutputFormat, PixelRect, PlacementRect};

use crate::archive::archive_output;
use crate::compositor::{compose, load_overlay, prepare_base, PreparedBase};
use crate::sources::{file_name_lossy, list_source_images};

/// Upper bound on concurrent items regardless of configuration.
pub const MAX_WORKERS: usize = 4;

/// Everything needed to start a batch, as captured from the editor.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub base: Arc<DynamicImage>,
    pub rect: PlacementRect,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub naming: NamingSpec,
    pub archive: ArchiveKind,
    /// Requested worker cap; see [`worker_count`].
    pub max_workers: usize,
    /// Emit progress at least every N completions.
    pub progress_interval: usize,
}

impl BatchRequest {
    pub fn new(
        base: Arc<DynamicImage>,
        rect: PlacementRect,
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let defaults = BatchDefaults::default();
        Self {
            base,
            rect,
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
            naming: NamingSpec::default(),
            archive: ArchiveKind::None,
            max_workers: defaults.max_workers,
            progress_interval: defaults.progress_interval,
        }
    }
}

/// Number of workers for a requested cap: `min(hardware parallelism, cap, 4)`,
/// and at least one.
pub fn worker_count(requested: usize) -> usize {
    let hardware = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    hardware.min(requested).min(MAX_WORKERS).max(1)
}

/// Read-only state shared by every worker.
#[derive(Debug)]
struct FrozenJob {
    base: PreparedBase,
    rect: PixelRect,
    output_dir: PathBuf,
    naming: NamingSpec,
    format: OutputFormat,
    stamp: JobStamp,
}

/// A job whose parameters can no longer change.
#[derive(Debug)]
pub struct BatchJob {
    frozen: Arc<FrozenJob>,
    files: Vec<PathBuf>,
    archive: ArchiveKind,
    workers: usize,
    progress_interval: usize,
    clock: JobClock,
}

impl BatchJob {
    /// Pre-flight: enumerate sources, create the output folder and prepare
    /// the base. Any failure here aborts the job before an item runs. An
    /// empty source folder is not a failure; the job finishes at 0/0.
    pub fn freeze(request: BatchRequest) -> PostermillResult<Self> {
        let files = list_source_images(&request.source_dir)?;

        std::fs::create_dir_all(&request.output_dir)
            .map_err(|e| PostermillError::file_system(&request.output_dir, e))?;

        let clock = JobClock::start();
        let frozen = FrozenJob {
            base: prepare_base(&request.base, request.format),
            rect: request.rect.to_pixels(),
            output_dir: request.output_dir,
            naming: request.naming,
            format: request.format,
            stamp: clock.stamp().clone(),
        };

        Ok(Self {
            frozen: Arc::new(frozen),
            files,
            archive: request.archive,
            workers: worker_count(request.max_workers),
            progress_interval: request.progress_interval.max(1),
            clock,
        })
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn rect(&self) -> PixelRect {
        self.frozen.rect
    }

    pub fn stamp(&self) -> &JobStamp {
        &self.frozen.stamp
    }

    pub fn output_dir(&self) -> &Path {
        &self.frozen.output_dir
    }
}

/// Outcome of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub path: PathBuf,
    /// Where the output was (or would have been) written.
    pub output: PathBuf,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Terminal report of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub success_count: usize,
    pub total: usize,
    /// Per-file results in source order.
    pub items: Vec<ItemResult>,
    pub archive: Option<PathBuf>,
    pub elapsed_ms: u128,
}

impl JobSummary {
    pub fn failure_count(&self) -> usize {
        self.total - self.success_count
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemResult> {
        self.items.iter().filter(|item| !item.succeeded)
    }
}

/// Notifications from a running batch, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started { total: usize, workers: usize },
    Progress { completed: usize, total: usize },
    ItemFailed { path: PathBuf, error: String },
    Archived { path: PathBuf },
    ArchiveFailed { error: String },
    Finished(JobSummary),
    /// Pre-flight failed; no item ran.
    Aborted { error: String },
}

impl BatchEvent {
    /// Percentage for progress events.
    pub fn percent(&self) -> Option<u32> {
        match self {
            Self::Progress { completed, total } if *total > 0 => {
                Some((*completed * 100 / *total) as u32)
            }
            _ => None,
        }
    }
}

/// Progress is emitted on every `interval`-th completion and on the last one.
pub fn should_report(completed: usize, total: usize, interval: usize) -> bool {
    completed == total || completed % interval.max(1) == 0
}

/// Run a frozen job to completion.
///
/// Send failures on `events` are ignored: a consumer that went away does
/// not stop the job.
pub async fn run_batch(job: BatchJob, events: UnboundedSender<BatchEvent>) -> JobSummary {
    let total = job.total();
    let emit = |event: BatchEvent| {
        let _ = events.send(event);
    };

    tracing::info!(
        total,
        workers = job.workers,
        format = %job.frozen.format,
        output = %job.frozen.output_dir.display(),
        date = job.frozen.stamp.date(),
        time = job.frozen.stamp.time(),
        "Starting batch"
    );
    emit(BatchEvent::Started {
        total,
        workers: job.workers,
    });

    let semaphore = Arc::new(Semaphore::new(job.workers));
    let mut tasks = JoinSet::new();

    for (index, path) in job.files.iter().cloned().enumerate() {
        let frozen = Arc::clone(&job.frozen);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let output = frozen.output_dir.join(output_name(&frozen, index, &path));
            let _permit = semaphore.acquire_owned().await;

            let worker_path = path.clone();
            let worker_output = output.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                process_item(&frozen, &worker_path, &worker_output)
            })
            .await;

            let result = match outcome {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(err.to_string()),
                Err(join_err) => Err(format!("worker failed: {join_err}")),
            };
            (index, path, output, result)
        });
    }

    let mut items: Vec<Option<ItemResult>> = vec![None; total];
    let mut completed = 0usize;
    let mut success_count = 0usize;

    while let Some(joined) = tasks.join_next().await {
        completed += 1;

        match joined {
            Ok((index, path, output, result)) => {
                let item = match result {
                    Ok(()) => {
                        success_count += 1;
                        tracing::debug!(source = %path.display(), output = %output.display(), "Item written");
                        ItemResult {
                            path,
                            output,
                            succeeded: true,
                            error: None,
                        }
                    }
                    Err(error) => {
                        tracing::warn!(source = %path.display(), error = %error, "Item failed");
                        emit(BatchEvent::ItemFailed {
                            path: path.clone(),
                            error: error.clone(),
                        });
                        ItemResult {
                            path,
                            output,
                            succeeded: false,
                            error: Some(error),
                        }
                    }
                };
                if let Some(slot) = items.get_mut(index) {
                    *slot = Some(item);
                }
            }
            Err(join_err) => {
                // The dispatch task itself died; its slot is filled below.
                tracing::error!(error = %join_err, "Batch task failed");
            }
        }

        if should_report(completed, total, job.progress_interval) {
            emit(BatchEvent::Progress { completed, total });
        }
    }

    let items: Vec<ItemResult> = items
        .into_iter()
        .zip(job.files.iter())
        .map(|(item, path)| {
            item.unwrap_or_else(|| ItemResult {
                path: path.clone(),
                output: PathBuf::new(),
                succeeded: false,
                error: Some("task did not complete".to_string()),
            })
        })
        .collect();

    let archive = finish_archive(&job, &emit).await;

    let summary = JobSummary {
        success_count,
        total,
        items,
        archive,
        elapsed_ms: job.clock.elapsed_ms(),
    };

    tracing::info!(
        success = summary.success_count,
        total = summary.total,
        elapsed_secs = job.clock.elapsed_secs(),
        "Batch finished"
    );
    emit(BatchEvent::Finished(summary.clone()));
    summary
}

/// Archive failures are reported but never fail the job.
async fn finish_archive(job: &BatchJob, emit: &impl Fn(BatchEvent)) -> Option<PathBuf> {
    if job.archive == ArchiveKind::None {
        return None;
    }

    let folder = job.frozen.output_dir.clone();
    let kind = job.archive;
    let outcome = tokio::task::spawn_blocking(move || archive_output(&folder, kind)).await;

    match outcome {
        Ok(Ok(Some(path))) => {
            emit(BatchEvent::Archived { path: path.clone() });
            Some(path)
        }
        Ok(Ok(None)) => None,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "Archiving output failed");
            emit(BatchEvent::ArchiveFailed {
                error: err.to_string(),
            });
            None
        }
        Err(join_err) => {
            tracing::warn!(error = %join_err, "Archiving task failed");
            emit(BatchEvent::ArchiveFailed {
                error: join_err.to_string(),
            });
            None
        }
    }
}

fn output_name(job: &FrozenJob, index: usize, source: &Path) -> String {
    generate_name(
        &file_name_lossy(source),
        index,
        &job.naming,
        job.format,
        &job.stamp,
    )
}

/// Decode, composite, encode and write one item.
fn process_item(job: &FrozenJob, source: &Path, output: &Path) -> PostermillResult<()> {
    let overlay = load_overlay(source)?;
    let bytes = compose(&job.base, &overlay, job.rect)
        .map_err(|e| PostermillError::item(source, e.to_string()))?;
    std::fs::write(output, bytes)
        .map_err(|e| PostermillError::item(source, format!("write {} failed: {e}", output.display())))
}

/// A batch running on the tokio runtime.
#[derive(Debug)]
pub struct BatchHandle {
    pub events: UnboundedReceiver<BatchEvent>,
    pub task: JoinHandle<PostermillResult<JobSummary>>,
}

/// Freeze and run `request` in the background. Must be called from within a
/// tokio runtime.
///
/// Pre-flight failures are sent as [`BatchEvent::Aborted`] and returned
/// from the task.
pub fn spawn_batch(request: BatchRequest) -> BatchHandle {
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let frozen = tokio::task::spawn_blocking(move || BatchJob::freeze(request))
            .await
            .map_err(|e| PostermillError::Other(e.into()))
            .and_then(|job| job);

        match frozen {
            Ok(job) => Ok(run_batch(job, tx).await),
            Err(err) => {
                tracing::error!(error = %err, "Batch aborted before start");
                let _ = tx.send(BatchEvent::Aborted {
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    });

    BatchHandle { events: rx, task }
}
