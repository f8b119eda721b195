//! Packing the output folder into a single archive after a batch.
//!
//! The archive is written next to the folder (`out` → `out.zip` /
//! `out.tar.gz`) and its entries are rooted at the folder's own name.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use postermill_common::error::{PostermillError, PostermillResult};
use postermill_model::ArchiveKind;

/// Archive `folder`. Returns the archive path, or `None` for [`ArchiveKind::None`].
pub fn archive_output(folder: &Path, kind: ArchiveKind) -> PostermillResult<Option<PathBuf>> {
    let Some(ext) = kind.extension() else {
        return Ok(None);
    };

    let root = folder
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| PostermillError::config(format!("Cannot archive {}", folder.display())))?;
    // `file_name` and `parent` ignore a trailing separator, so `out/` still lands beside the folder
    let target = folder
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{}.{ext}", root.display()));

    match kind {
        ArchiveKind::Zip => write_zip(folder, &root, &target)?,
        ArchiveKind::TarGz => write_tar_gz(folder, &root, &target)?,
        ArchiveKind::None => return Ok(None),
    }

    tracing::info!(archive = %target.display(), kind = ?kind, "Output archived");
    Ok(Some(target))
}

fn write_zip(folder: &Path, root: &Path, target: &Path) -> PostermillResult<()> {
    let file = File::create(target).map_err(|e| PostermillError::file_system(target, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = Vec::new();
    collect_files(folder, &mut files)?;
    files.sort();

    for path in files {
        let relative = path.strip_prefix(folder).map_err(anyhow::Error::from)?;
        let name = root
            .join(relative)
            .to_string_lossy()
            .replace('\\', "/");

        zip.start_file(name, options)
            .map_err(|e| PostermillError::Other(e.into()))?;
        let mut input = File::open(&path).map_err(|e| PostermillError::file_system(&path, e))?;
        io::copy(&mut input, &mut zip)?;
    }

    zip.finish()
        .map_err(|e| PostermillError::Other(e.into()))?
        .flush()?;
    Ok(())
}

fn write_tar_gz(folder: &Path, root: &Path, target: &Path) -> PostermillResult<()> {
    let file = File::create(target).map_err(|e| PostermillError::file_system(target, e))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder
        .append_dir_all(root, folder)
        .map_err(|e| PostermillError::file_system(folder, e))?;
    builder.into_inner()?.finish()?.flush()?;
    Ok(())
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> PostermillResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| PostermillError::file_system(dir, e))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
