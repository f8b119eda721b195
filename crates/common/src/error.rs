//! Error types shared across Postermill crates.

use std::path::PathBuf;

/// Top-level error type for Postermill operations.
#[derive(Debug, thiserror::Error)]
pub enum PostermillError {
    /// Rejected user input; engine state is left unchanged.
    #[error("Invalid input: {message}")]
    Input { message: String },

    /// A base or overlay image could not be opened or decoded.
    #[error("Failed to load image {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Setup-phase file system failure; aborts a whole batch.
    #[error("File system error at {path}: {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One batch item failed; the batch keeps going.
    #[error("Failed to process {path}: {message}")]
    Item { path: PathBuf, message: String },

    #[error("Nothing to {action}")]
    HistoryUnavailable { action: &'static str },

    #[error("No source folder selected")]
    SourcesUnavailable,

    #[error("No eligible images in {path}")]
    NoEligibleImages { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PostermillError.
pub type PostermillResult<T> = Result<T, PostermillError>;

impl PostermillError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub fn item(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Item {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error aborts a whole batch (as opposed to one item).
    pub fn is_job_fatal(&self) -> bool {
        !matches!(self, Self::Item { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_errors_are_not_job_fatal() {
        let err = PostermillError::item("a.png", "decode failed");
        assert!(!err.is_job_fatal());
        assert_eq!(err.to_string(), "Failed to process a.png: decode failed");
    }

    #[test]
    fn test_file_system_errors_are_job_fatal() {
        let err = PostermillError::file_system(
            "/out",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_job_fatal());
        assert!(err.to_string().starts_with("File system error at /out"));
    }

    #[test]
    fn test_history_message() {
        let err = PostermillError::HistoryUnavailable { action: "undo" };
        assert_eq!(err.to_string(), "Nothing to undo");
    }
}
