//! Write a starter configuration file.

use std::path::Path;

use postermill_common::config::{config_file_path, AppConfig};

pub fn run(force: bool, config: &AppConfig) -> anyhow::Result<()> {
    let path = config_file_path();
    if !write_config(&path, force, config)? {
        println!("[WARN] Config already exists: {}", path.display());
        println!("  Pass --force to overwrite it with the current settings.");
        return Ok(());
    }

    println!("Config written: {}", path.display());
    println!(
        "  Format: {} (JPEG quality {})",
        config.output.format, config.output.jpeg_quality
    );
    println!("  Naming: {}", config.naming.pattern);
    println!("  Archive: {}", config.output.archive);
    println!("  Workers: up to {}", config.batch.max_workers);
    Ok(())
}

/// Returns `false` when an existing file was left alone.
fn write_config(path: &Path, force: bool, config: &AppConfig) -> anyhow::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    config
        .save_to(path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_config_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postermill").join("config.json");

        let mut config = AppConfig::default();
        assert!(write_config(&path, false, &config).unwrap());
        assert_eq!(AppConfig::load_from(&path).output.format, "png");

        config.output.format = "jpeg".to_string();
        assert!(!write_config(&path, false, &config).unwrap());
        assert_eq!(AppConfig::load_from(&path).output.format, "png");

        assert!(write_config(&path, true, &config).unwrap());
        assert_eq!(AppConfig::load_from(&path).output.format, "jpeg");
    }
}
