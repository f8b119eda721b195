//! Preview output names for a source folder.

use std::path::PathBuf;

use postermill_common::clock::JobStamp;
use postermill_model::{NamingSpec, OutputFormat};
use postermill_render::preview_names;

pub fn run(sources: Option<PathBuf>, naming: NamingSpec, format: OutputFormat) -> anyhow::Result<()> {
    let preview = preview_names(sources.as_deref(), &naming, format, &JobStamp::now())?;

    println!("Naming preview ({} eligible files)", preview.total);
    for (source, output) in &preview.samples {
        println!("  {source} → {output}");
    }
    if preview.total > preview.samples.len() {
        println!("  ...");
    }

    Ok(())
}
