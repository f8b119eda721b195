//! Subcommands and the flag groups they share.

use clap::Args;

use postermill_common::config::{NamingDefaults, OutputDefaults};
use postermill_model::{ArchiveKind, NamingPattern, NamingSpec, OutputFormat, SettingParseError};

pub mod check;
pub mod compose;
pub mod init;
pub mod preview;

/// Output encoding flags. Unset flags fall back to the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct FormatArgs {
    /// Output format: png or jpeg
    #[arg(long)]
    pub format: Option<String>,

    /// JPEG quality (1-100, clamped)
    #[arg(long)]
    pub quality: Option<i64>,
}

impl FormatArgs {
    pub fn resolve(&self, defaults: &OutputDefaults) -> anyhow::Result<OutputFormat> {
        let name = self.format.as_deref().unwrap_or(&defaults.format);
        let quality = self.quality.unwrap_or(defaults.jpeg_quality as i64);
        Ok(OutputFormat::parse(name, Some(quality))?)
    }
}

/// Naming flags. Unset flags fall back to the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct NamingArgs {
    /// Naming pattern: original, number, padded, prefix-original,
    /// original-suffix, prefix-padded, custom
    #[arg(long)]
    pub pattern: Option<String>,

    /// Custom template, e.g. "{prefix}{number:03d}_{date}"
    #[arg(long)]
    pub template: Option<String>,

    /// Prefix used by prefix patterns and {prefix}
    #[arg(long)]
    pub prefix: Option<String>,

    /// Suffix used by suffix patterns and {suffix}
    #[arg(long)]
    pub suffix: Option<String>,

    /// Number given to the first file
    #[arg(long)]
    pub start: Option<u32>,

    /// Digits for padded numbers
    #[arg(long)]
    pub pad_width: Option<usize>,
}

impl NamingArgs {
    pub fn resolve(&self, defaults: &NamingDefaults) -> anyhow::Result<NamingSpec> {
        let pattern = match (self.pattern.as_deref(), self.template.as_deref()) {
            // a bare template implies the custom pattern
            (None, Some(template)) => NamingPattern::Custom(template.to_string()),
            (name, template) => parse_pattern(name.unwrap_or(&defaults.pattern), template)?,
        };

        Ok(NamingSpec {
            pattern,
            start_index: self.start.unwrap_or(defaults.start_index),
            prefix: self.prefix.clone().unwrap_or_else(|| defaults.prefix.clone()),
            suffix: self.suffix.clone().unwrap_or_else(|| defaults.suffix.clone()),
            pad_width: self.pad_width.unwrap_or(defaults.pad_width),
        })
    }
}

/// A configured pattern may also be a template string.
fn parse_pattern(name: &str, template: Option<&str>) -> Result<NamingPattern, SettingParseError> {
    if name.contains('{') {
        return Ok(NamingPattern::Custom(name.to_string()));
    }
    NamingPattern::from_name(name, template)
}

pub fn resolve_archive(
    flag: Option<&str>,
    defaults: &OutputDefaults,
) -> anyhow::Result<ArchiveKind> {
    Ok(flag.unwrap_or(&defaults.archive).parse::<ArchiveKind>()?)
}
