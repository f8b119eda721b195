//! Composite every source image onto the base.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use postermill_common::config::AppConfig;
use postermill_common::error::PostermillError;
use postermill_core::placement::ManualEntry;
use postermill_core::{PlacementSession, PlacementSettings};
use postermill_model::{ArchiveKind, ImageSize, NamingSpec, OutputFormat, QualityTier};
use postermill_render::{list_source_images, spawn_batch, BatchEvent, BatchRequest};

pub struct ComposeOptions {
    pub base: PathBuf,
    pub sources: PathBuf,
    pub output: PathBuf,
    pub rect: Option<String>,
    pub center: bool,
    pub lock_aspect: bool,
    pub archive: ArchiveKind,
    pub workers: usize,
    pub format: OutputFormat,
    pub naming: NamingSpec,
}

pub async fn run(options: ComposeOptions, config: &AppConfig) -> anyhow::Result<()> {
    println!("Composing onto: {}", options.base.display());

    let base = image::open(&options.base)
        .map_err(|e| PostermillError::load(&options.base, e.to_string()))?;

    let files = list_source_images(&options.sources)?;

    let mut session = PlacementSession::new(PlacementSettings::from(&config.placement));
    session.load_base(ImageSize::new(base.width(), base.height()));
    // The first source stands in for the overlay the editor would preview.
    if let Some(first) = files.first() {
        let (ow, oh) = image::image_dimensions(first)
            .map_err(|e| PostermillError::load(first, e.to_string()))?;
        session.load_overlay(ImageSize::new(ow, oh));
    }
    if options.lock_aspect {
        session.toggle_aspect_lock(true);
    }
    if let Some(rect) = options.rect.as_deref() {
        let entry = ManualEntry::parse_csv(rect)?;
        if options.lock_aspect {
            // keep the overlay ratio: height follows the requested width
            session.manual_set(entry.x, entry.y, entry.w, entry.w / session.aspect_lock().ratio)?;
        } else {
            session.apply_entry(entry)?;
        }
    }
    if options.center {
        session.center()?;
    }
    let placement = session.rect();

    println!("  Sources: {} ({} images)", options.sources.display(), files.len());
    println!("  Output: {}", options.output.display());
    println!("  Format: {}", options.format);
    if let Some(quality) = options.format.quality() {
        println!("  Quality hint: {}", QualityTier::from_quality(quality).label());
    }
    println!(
        "  Placement: x={:.0} y={:.0} w={:.0} h={:.0}",
        placement.x, placement.y, placement.w, placement.h
    );

    let request = BatchRequest {
        base: Arc::new(base),
        rect: placement,
        source_dir: options.sources,
        output_dir: options.output,
        format: options.format,
        naming: options.naming,
        archive: options.archive,
        max_workers: options.workers,
        progress_interval: config.batch.progress_interval,
    };

    let mut handle = spawn_batch(request);
    while let Some(event) = handle.events.recv().await {
        match &event {
            BatchEvent::Started { total, workers } => {
                println!("  Processing {total} images on {workers} workers");
            }
            BatchEvent::Progress { completed, total } => {
                print!(
                    "\r  Progress: {}% ({completed}/{total})  ",
                    event.percent().unwrap_or(0)
                );
                let _ = std::io::stdout().flush();
            }
            BatchEvent::ItemFailed { path, error } => {
                eprintln!("\n  Failed: {} ({error})", path.display());
            }
            BatchEvent::Archived { path } => {
                println!("\n  Archive: {}", path.display());
            }
            BatchEvent::ArchiveFailed { error } => {
                eprintln!("\n  Archive failed: {error}");
            }
            BatchEvent::Finished(summary) => {
                println!(
                    "\nDone: {}/{} images composited in {:.1}s",
                    summary.success_count,
                    summary.total,
                    summary.elapsed_ms as f64 / 1000.0
                );
            }
            BatchEvent::Aborted { error } => {
                println!("Batch aborted: {error}");
            }
        }
    }

    handle.task.await??;
    Ok(())
}
