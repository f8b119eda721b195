//! Inspect the inputs of a batch without writing anything.

use std::path::PathBuf;

use postermill_common::config::AppConfig;
use postermill_common::error::PostermillError;
use postermill_core::{PlacementSession, PlacementSettings};
use postermill_model::ImageSize;
use postermill_render::list_source_images;

pub fn run(base: PathBuf, sources: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<()> {
    println!("Postermill Input Check");
    println!("{}", "=".repeat(50));

    let (width, height) = image::image_dimensions(&base)
        .map_err(|e| PostermillError::load(&base, e.to_string()))?;
    println!("[OK] Base image: {} ({width}x{height})", base.display());

    let mut session = PlacementSession::new(PlacementSettings::from(&config.placement));
    let rect = session.load_base(ImageSize::new(width, height));
    println!(
        "     Default placement: x={:.0} y={:.0} w={:.0} h={:.0}",
        rect.x, rect.y, rect.w, rect.h
    );

    let Some(dir) = sources else {
        println!("[--] No source folder given");
        return Ok(());
    };

    let files = list_source_images(&dir)?;
    let Some(first) = files.first() else {
        println!("[WARN] No eligible images in {}", dir.display());
        return Ok(());
    };
    println!("[OK] Source images: {} in {}", files.len(), dir.display());

    match image::image_dimensions(first) {
        Ok((ow, oh)) => {
            let rect = session.load_overlay(ImageSize::new(ow, oh));
            println!(
                "     First overlay {ow}x{oh} would be placed at x={:.0} y={:.0} w={:.0} h={:.0}",
                rect.x, rect.y, rect.w, rect.h
            );
        }
        Err(e) => println!("[WARN] First source cannot be read: {e}"),
    }

    Ok(())
}
