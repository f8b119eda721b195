//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output encoding defaults.
    pub output: OutputDefaults,

    /// Output naming defaults.
    pub naming: NamingDefaults,

    /// Interactive placement behavior.
    pub placement: PlacementDefaults,

    /// Batch worker settings.
    pub batch: BatchDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default output encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDefaults {
    /// `png` (lossless) or `jpeg` (lossy).
    pub format: String,

    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,

    /// Archive produced after a batch: `none`, `zip` or `tar-gz`.
    pub archive: String,
}

/// Default naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingDefaults {
    /// Pattern name (`original`, `number`, `padded`, `prefix-original`,
    /// `original-suffix`, `prefix-padded`) or a custom template.
    pub pattern: String,

    /// First sequence number.
    pub start_index: u32,

    pub prefix: String,

    pub suffix: String,

    /// Width used by the padded-number patterns.
    pub pad_width: usize,
}

/// Placement engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementDefaults {
    /// Snap the dragged rectangle to the base center lines.
    pub snap_enabled: bool,

    /// Snap tolerance in view pixels.
    pub snap_threshold_px: f64,

    /// Box an overlay is fitted into when it is first loaded (image pixels).
    pub overlay_box: f64,
}

/// Batch pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchDefaults {
    /// Upper bound on worker threads; the pool never exceeds hardware parallelism.
    pub max_workers: usize,

    /// Emit a progress event at least every N completions.
    pub progress_interval: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "postermill=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            jpeg_quality: 95,
            archive: "none".to_string(),
        }
    }
}

impl Default for NamingDefaults {
    fn default() -> Self {
        Self {
            pattern: "original".to_string(),
            start_index: 1,
            prefix: String::new(),
            suffix: String::new(),
            pad_width: 4,
        }
    }
}

impl Default for PlacementDefaults {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            snap_threshold_px: 10.0,
            overlay_box: 300.0,
        }
    }
}

impl Default for BatchDefaults {
    fn default() -> Self {
        Self {
            max_workers: 4,
            progress_interval: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("postermill").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.output.format, "png");
        assert_eq!(config.output.jpeg_quality, 95);
        assert_eq!(config.batch.max_workers, 4);
        assert_eq!(config.batch.progress_interval, 10);
        assert!((config.placement.snap_threshold_px - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.output.format = "jpeg".to_string();
        config.naming.prefix = "IMG_".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.output.format, "jpeg");
        assert_eq!(loaded.naming.prefix, "IMG_");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "batch": { "max_workers": 2 } }"#).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.batch.max_workers, 2);
        assert_eq!(loaded.batch.progress_interval, 10);
        assert_eq!(loaded.naming.start_index, 1);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.output.archive, "none");
    }
}
