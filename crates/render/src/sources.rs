//! Source folder enumeration and naming preview.

use std::path::{Path, PathBuf};

use postermill_common::clock::JobStamp;
use postermill_common::error::{PostermillError, PostermillResult};
use postermill_core::generate_name;
use postermill_model::{NamingSpec, OutputFormat};

/// Extensions (lowercase, without the dot) that are picked up from a source folder.
pub const SOURCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// How many names a preview shows.
pub const PREVIEW_COUNT: usize = 2;

/// Whether a path has one of the recognized image extensions (any case).
pub fn is_source_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|known| e.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Regular files in `dir` with a recognized extension, sorted by file name
/// ignoring case.
///
/// Subdirectories are not searched.
pub fn list_source_images(dir: &Path) -> PostermillResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| PostermillError::file_system(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PostermillError::file_system(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_source_image(&path) {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|path| {
        let name = file_name_lossy(path);
        (name.to_lowercase(), name)
    });
    Ok(files)
}

/// Output names for the first few files of a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPreview {
    /// `(source file name, output name)` pairs.
    pub samples: Vec<(String, String)>,
    /// Number of eligible files in the folder.
    pub total: usize,
}

impl NamingPreview {
    /// Single-line rendering, e.g. `a.png → IMG_0001.png, b.png → IMG_0002.png (12 files)`.
    pub fn summary(&self) -> String {
        let pairs: Vec<String> = self
            .samples
            .iter()
            .map(|(from, to)| format!("{from} → {to}"))
            .collect();
        format!("{} ({} files)", pairs.join(", "), self.total)
    }
}

/// Preview output names for the selected source folder.
///
/// Fails with [`PostermillError::SourcesUnavailable`] when no folder is
/// selected and [`PostermillError::NoEligibleImages`] when it holds no images.
pub fn preview_names(
    source_dir: Option<&Path>,
    spec: &NamingSpec,
    format: OutputFormat,
    stamp: &JobStamp,
) -> PostermillResult<NamingPreview> {
    let dir = source_dir.ok_or(PostermillError::SourcesUnavailable)?;
    let files = list_source_images(dir)?;
    if files.is_empty() {
        return Err(PostermillError::NoEligibleImages {
            path: dir.to_path_buf(),
        });
    }

    let samples = files
        .iter()
        .take(PREVIEW_COUNT)
        .enumerate()
        .map(|(index, path)| {
            let original = file_name_lossy(path);
            let output = generate_name(&original, index, spec, format, stamp);
            (original, output)
        })
        .collect();

    Ok(NamingPreview {
        samples,
        total: files.len(),
    })
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use postermill_model::NamingPattern;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_lists_only_images_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PNG", "A.jpeg", "notes.txt", "c.Gif", "D.bmp", "e.webp"] {
            touch(dir.path(), name);
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = list_source_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name_lossy(p))
            .collect();
        assert_eq!(names, vec!["A.jpeg", "b.PNG", "c.Gif", "D.bmp"]);
    }

    #[test]
    fn test_missing_folder_is_file_system_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_source_images(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, PostermillError::FileSystem { .. }));
    }

    #[test]
    fn test_preview_first_two() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            touch(dir.path(), name);
        }
        let spec = NamingSpec {
            pattern: NamingPattern::PrefixPaddedNumber,
            prefix: "IMG_".to_string(),
            ..NamingSpec::default()
        };

        let preview =
            preview_names(Some(dir.path()), &spec, OutputFormat::Png, &JobStamp::now()).unwrap();
        assert_eq!(preview.total, 3);
        assert_eq!(
            preview.samples,
            vec![
                ("a.png".to_string(), "IMG_0001.png".to_string()),
                ("b.png".to_string(), "IMG_0002.png".to_string()),
            ]
        );
        assert!(preview.summary().ends_with("(3 files)"));
    }

    #[test]
    fn test_preview_errors() {
        let spec = NamingSpec::default();
        let stamp = JobStamp::now();
        assert!(matches!(
            preview_names(None, &spec, OutputFormat::Png, &stamp),
            Err(PostermillError::SourcesUnavailable)
        ));

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "readme.md");
        assert!(matches!(
            preview_names(Some(dir.path()), &spec, OutputFormat::Png, &stamp),
            Err(PostermillError::NoEligibleImages { .. })
        ));
    }
}
