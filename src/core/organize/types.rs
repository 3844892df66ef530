//! Configuration records for the organize operation.

use crate::core::fingerprint::FileKind;
use crate::core::scanner::WalkOptions;
use crate::error::ConfigError;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Copy or move files into the destination layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// Leave the source in place
    #[default]
    Copy,
    /// Remove the source once the destination is written
    Move,
}

/// When an existing destination file may be replaced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OverwritePolicy {
    /// Replace a file with the same name
    pub same_name: bool,
    /// ...but only if its content is identical
    pub same_name_requires_identical: bool,
    /// Replace a file with the same size
    pub same_size: bool,
    /// ...but only if its content is identical
    pub same_size_requires_identical: bool,
}

/// Which date components become directories. Independent and additive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Grouping {
    pub year: bool,
    pub month: bool,
    pub day: bool,
}

/// Size units, 1024-based
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeUnit {
    Kb,
    #[default]
    Mb,
    Gb,
}

impl SizeUnit {
    pub fn multiplier(&self) -> u64 {
        match self {
            SizeUnit::Kb => 1024,
            SizeUnit::Mb => 1024 * 1024,
            SizeUnit::Gb => 1024 * 1024 * 1024,
        }
    }
}

impl std::fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeUnit::Kb => write!(f, "KB"),
            SizeUnit::Mb => write!(f, "MB"),
            SizeUnit::Gb => write!(f, "GB"),
        }
    }
}

/// An amount with its unit, as entered in a form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SizeLimit {
    pub amount: u64,
    pub unit: SizeUnit,
}

impl SizeLimit {
    pub fn new(amount: u64, unit: SizeUnit) -> Self {
        Self { amount, unit }
    }

    /// The limit in bytes
    pub fn bytes(&self) -> u64 {
        self.amount.saturating_mul(self.unit.multiplier())
    }
}

impl std::fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.unit)
    }
}

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d+)\s*(kb|mb|gb|k|m|g)?\s*$").expect("size pattern is valid")
    })
}

impl std::str::FromStr for SizeLimit {
    type Err = ConfigError;

    /// Parse "500KB", "10 mb", "2G". A bare number is megabytes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSize {
            value: s.to_string(),
        };

        let caps = size_pattern().captures(s).ok_or_else(invalid)?;
        let amount: u64 = caps[1].parse().map_err(|_| invalid())?;
        let unit = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
            Some(u) if u.starts_with('k') => SizeUnit::Kb,
            Some(u) if u.starts_with('g') => SizeUnit::Gb,
            _ => SizeUnit::Mb,
        };

        Ok(SizeLimit::new(amount, unit))
    }
}

/// Split a user-typed extension list ("png, .JPG tiff") into lower-case
/// extensions without leading dots
pub fn parse_extension_list(text: &str) -> Vec<String> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let separator =
        SEPARATOR.get_or_init(|| Regex::new(r"[\s,;]+").expect("separator pattern is valid"));

    separator
        .split(text)
        .map(|ext| ext.trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Filters as a settings form holds them: each value next to its toggle.
///
/// Converted to a [`FilterSet`](super::FilterSet) before a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterSettings {
    pub not_before_active: bool,
    pub not_before: NaiveDate,
    pub not_after_active: bool,
    pub not_after: NaiveDate,

    pub min_size_active: bool,
    pub min_size: SizeLimit,
    pub max_size_active: bool,
    pub max_size: SizeLimit,

    pub use_file_extension: bool,
    /// Free text, e.g. "png, jpg tiff"
    pub file_extensions: String,

    pub use_system_file_type: bool,
    pub file_kind: FileKind,

    pub skip_files_without_extension: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            not_before_active: false,
            not_before: today,
            not_after_active: false,
            not_after: today,
            min_size_active: false,
            min_size: SizeLimit::default(),
            max_size_active: false,
            max_size: SizeLimit::default(),
            use_file_extension: false,
            file_extensions: String::new(),
            use_system_file_type: false,
            file_kind: FileKind::All,
            skip_files_without_extension: false,
        }
    }
}

/// Configuration for an organize run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrganizeConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub recurse: bool,
    pub include_hidden: bool,
    pub mode: TransferMode,
    pub overwrite: OverwritePolicy,
    pub grouping: Grouping,
    pub filters: FilterSettings,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            recurse: true,
            include_hidden: false,
            mode: TransferMode::Copy,
            overwrite: OverwritePolicy::default(),
            grouping: Grouping::default(),
            filters: FilterSettings::default(),
        }
    }
}

impl OrganizeConfig {
    /// Both roots, or the first one missing
    pub fn roots(&self) -> Result<(PathBuf, PathBuf), ConfigError> {
        let source = self.source.clone().ok_or(ConfigError::MissingSource)?;
        let destination = self
            .destination
            .clone()
            .ok_or(ConfigError::MissingDestination)?;
        Ok((source, destination))
    }

    /// How the source tree is walked
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            recurse: self.recurse,
            include_hidden: self.include_hidden,
            follow_links: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes_with_units() {
        assert_eq!("500KB".parse::<SizeLimit>().unwrap().bytes(), 500 * 1024);
        assert_eq!("10 mb".parse::<SizeLimit>().unwrap().bytes(), 10 * 1024 * 1024);
        assert_eq!("2G".parse::<SizeLimit>().unwrap().unit, SizeUnit::Gb);
        assert_eq!("7".parse::<SizeLimit>().unwrap(), SizeLimit::new(7, SizeUnit::Mb));
    }

    #[test]
    fn rejects_garbage_sizes() {
        assert!(matches!(
            "ten megs".parse::<SizeLimit>(),
            Err(ConfigError::InvalidSize { .. })
        ));
        assert!("-5MB".parse::<SizeLimit>().is_err());
    }

    #[test]
    fn splits_extension_lists() {
        assert_eq!(
            parse_extension_list("png, .JPG  tiff;gif"),
            vec!["png", "jpg", "tiff", "gif"]
        );
        assert!(parse_extension_list("  , ").is_empty());
    }

    #[test]
    fn roots_must_be_present() {
        let mut config = OrganizeConfig::default();
        assert!(matches!(config.roots(), Err(ConfigError::MissingSource)));

        config.source = Some(PathBuf::from("/src"));
        assert!(matches!(config.roots(), Err(ConfigError::MissingDestination)));

        config.destination = Some(PathBuf::from("/dst"));
        assert!(config.roots().is_ok());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: OrganizeConfig = serde_json::from_str(
            r#"{"source": "/a", "destination": "/b", "grouping": {"year": true}}"#,
        )
        .unwrap();

        assert!(config.recurse);
        assert!(config.grouping.year);
        assert!(!config.grouping.month);
        assert_eq!(config.mode, TransferMode::Copy);
    }
}
