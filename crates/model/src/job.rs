//! Settings that are frozen into a batch job when it starts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Quality used when a JPEG quality is not given.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG; keeps the overlay's alpha.
    Png,
    /// Lossy JPEG at the given quality (1-100).
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// JPEG with the quality clamped into `1..=100`.
    pub fn jpeg(quality: i64) -> Self {
        Self::Jpeg {
            quality: quality.clamp(1, 100) as u8,
        }
    }

    /// Parse a format name (`png`, `jpeg`/`jpg`) with an optional quality.
    pub fn parse(name: &str, quality: Option<i64>) -> Result<Self, SettingParseError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" | "lossless" => Ok(Self::Png),
            "jpeg" | "jpg" | "lossy" => Ok(Self::jpeg(
                quality.unwrap_or(DEFAULT_JPEG_QUALITY as i64),
            )),
            other => Err(SettingParseError::new("output format", other, "png, jpeg")),
        }
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Png)
    }

    pub fn quality(&self) -> Option<u8> {
        match self {
            Self::Png => None,
            Self::Jpeg { quality } => Some(*quality),
        }
    }

    /// File extension including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Jpeg { .. } => ".jpg",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg { quality } => write!(f, "JPEG (quality {quality})"),
        }
    }
}

/// Coarse JPEG quality bands, used for user-facing hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    High,
    Medium,
    Low,
    VeryLow,
}

impl QualityTier {
    pub fn from_quality(quality: u8) -> Self {
        match quality {
            90..=u8::MAX => Self::High,
            75..=89 => Self::Medium,
            50..=74 => Self::Low,
            _ => Self::VeryLow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "high quality (larger files)",
            Self::Medium => "medium quality (recommended)",
            Self::Low => "low quality (smaller files)",
            Self::VeryLow => "very low quality (visible artifacts)",
        }
    }
}

/// How output files are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "template", rename_all = "kebab-case")]
pub enum NamingPattern {
    /// Source stem unchanged.
    Original,
    /// Sequence number.
    Number,
    /// Zero-padded sequence number.
    PaddedNumber,
    /// Prefix followed by the source stem.
    PrefixOriginal,
    /// Source stem followed by the suffix.
    OriginalSuffix,
    /// Prefix followed by the zero-padded sequence number.
    PrefixPaddedNumber,
    /// Free-form template with `{original}`, `{number}`, `{number:0Nd}`,
    /// `{prefix}`, `{suffix}`, `{date}` and `{time}` placeholders.
    Custom(String),
}

impl NamingPattern {
    /// Resolve a pattern name; `custom` takes its template from `template`.
    pub fn from_name(name: &str, template: Option<&str>) -> Result<Self, SettingParseError> {
        let pattern = match name.trim().to_ascii_lowercase().as_str() {
            "original" => Self::Original,
            "number" => Self::Number,
            "padded" | "padded-number" => Self::PaddedNumber,
            "prefix-original" => Self::PrefixOriginal,
            "original-suffix" => Self::OriginalSuffix,
            "prefix-padded" | "prefix-padded-number" => Self::PrefixPaddedNumber,
            "custom" => match template {
                Some(t) if !t.is_empty() => Self::Custom(t.to_string()),
                _ => {
                    return Err(SettingParseError::new(
                        "naming pattern",
                        "custom",
                        "a non-empty template",
                    ))
                }
            },
            other => {
                return Err(SettingParseError::new(
                    "naming pattern",
                    other,
                    "original, number, padded, prefix-original, original-suffix, prefix-padded, custom",
                ))
            }
        };
        Ok(pattern)
    }
}

impl Default for NamingPattern {
    fn default() -> Self {
        Self::Original
    }
}

/// Naming configuration for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingSpec {
    pub pattern: NamingPattern,
    /// Number assigned to the first file.
    pub start_index: u32,
    pub prefix: String,
    pub suffix: String,
    /// Digits used by the padded patterns.
    pub pad_width: usize,
}

impl Default for NamingSpec {
    fn default() -> Self {
        Self {
            pattern: NamingPattern::Original,
            start_index: 1,
            prefix: String::new(),
            suffix: String::new(),
            pad_width: 4,
        }
    }
}

/// Optional archive built from the output folder after a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveKind {
    #[default]
    None,
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Suffix appended to the output folder path.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Zip => Some("zip"),
            Self::TarGz => Some("tar.gz"),
        }
    }
}

impl FromStr for ArchiveKind {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "zip" => Ok(Self::Zip),
            "tar-gz" | "targz" | "tar.gz" | "gzip" => Ok(Self::TarGz),
            other => Err(SettingParseError::new("archive", other, "none, zip, tar-gz")),
        }
    }
}

/// A setting string that does not name a known option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {setting} '{value}' (expected {expected})")]
pub struct SettingParseError {
    pub setting: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl SettingParseError {
    fn new(setting: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            setting,
            value: value.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_quality_is_clamped() {
        assert_eq!(OutputFormat::jpeg(0), OutputFormat::Jpeg { quality: 1 });
        assert_eq!(OutputFormat::jpeg(250), OutputFormat::Jpeg { quality: 100 });
        assert_eq!(
            OutputFormat::parse("JPG", None).unwrap(),
            OutputFormat::Jpeg { quality: 95 }
        );
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Png.extension(), ".png");
        assert_eq!(OutputFormat::jpeg(80).extension(), ".jpg");
        assert!(OutputFormat::parse("webp", None).is_err());
    }

    #[test]
    fn test_quality_tiers() {
        assert_eq!(QualityTier::from_quality(95), QualityTier::High);
        assert_eq!(QualityTier::from_quality(80), QualityTier::Medium);
        assert_eq!(QualityTier::from_quality(60), QualityTier::Low);
        assert_eq!(QualityTier::from_quality(10), QualityTier::VeryLow);
    }

    #[test]
    fn test_pattern_names() {
        assert_eq!(
            NamingPattern::from_name("prefix-padded", None).unwrap(),
            NamingPattern::PrefixPaddedNumber
        );
        assert_eq!(
            NamingPattern::from_name("custom", Some("{date}_{original}")).unwrap(),
            NamingPattern::Custom("{date}_{original}".to_string())
        );
        assert!(NamingPattern::from_name("custom", None).is_err());
        assert!(NamingPattern::from_name("weird", None).is_err());
    }

    #[test]
    fn test_archive_kind_parsing() {
        assert_eq!("zip".parse::<ArchiveKind>().unwrap(), ArchiveKind::Zip);
        assert_eq!("tar-gz".parse::<ArchiveKind>().unwrap(), ArchiveKind::TarGz);
        assert_eq!(ArchiveKind::TarGz.extension(), Some("tar.gz"));
        assert!("rar".parse::<ArchiveKind>().is_err());
    }

    #[test]
    fn test_naming_spec_serialization() {
        let spec = NamingSpec {
            pattern: NamingPattern::Custom("{prefix}{number:03d}".to_string()),
            prefix: "A_".to_string(),
            ..NamingSpec::default()
        };
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: NamingSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
