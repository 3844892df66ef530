//! Include/exclude gate applied before a file is placed.

use super::types::{parse_extension_list, FilterSettings};
use crate::core::fingerprint::{calendar_day, lower_extension, FileKind};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Result of running a file through the filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Include,
    /// Excluded, with the reason shown on the status line
    Exclude(String),
}

impl FilterDecision {
    pub fn is_included(&self) -> bool {
        matches!(self, FilterDecision::Include)
    }
}

/// Active filters only; `None` means that filter is off
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub not_before: Option<NaiveDate>,
    pub not_after: Option<NaiveDate>,
    pub min_bytes: Option<u64>,
    pub max_bytes: Option<u64>,
    /// Lower-case, without dots
    pub extensions: Option<HashSet<String>>,
    pub skip_without_extension: bool,
    pub kind: Option<FileKind>,
}

impl From<&FilterSettings> for FilterSet {
    fn from(settings: &FilterSettings) -> Self {
        let extensions = if settings.use_file_extension {
            let list: HashSet<String> = parse_extension_list(&settings.file_extensions)
                .into_iter()
                .collect();
            // An empty allow-list filters nothing
            (!list.is_empty()).then_some(list)
        } else {
            None
        };

        let kind = settings
            .use_system_file_type
            .then_some(settings.file_kind)
            .filter(|kind| *kind != FileKind::All);

        Self {
            not_before: settings.not_before_active.then_some(settings.not_before),
            not_after: settings.not_after_active.then_some(settings.not_after),
            min_bytes: settings.min_size_active.then(|| settings.min_size.bytes()),
            max_bytes: settings.max_size_active.then(|| settings.max_size.bytes()),
            extensions,
            skip_without_extension: settings.skip_files_without_extension,
            kind,
        }
    }
}

impl FilterSet {
    /// Check if every filter is off
    pub fn is_empty(&self) -> bool {
        *self == FilterSet::default()
    }

    /// Decide whether a file takes part in the run.
    ///
    /// Dates compare by local calendar day with inclusive bounds; sizes
    /// compare in bytes.
    pub fn evaluate(&self, path: &Path, size: u64, date: DateTime<Utc>) -> FilterDecision {
        let day = calendar_day(date);

        if let Some(bound) = self.not_before {
            if day < bound {
                return FilterDecision::Exclude(format!("dated {} before {}", day, bound));
            }
        }
        if let Some(bound) = self.not_after {
            if day > bound {
                return FilterDecision::Exclude(format!("dated {} after {}", day, bound));
            }
        }

        if let Some(min) = self.min_bytes {
            if size < min {
                return FilterDecision::Exclude(format!("{} bytes is below {}", size, min));
            }
        }
        if let Some(max) = self.max_bytes {
            if size > max {
                return FilterDecision::Exclude(format!("{} bytes is above {}", size, max));
            }
        }

        let extension = lower_extension(path);

        if self.skip_without_extension && extension.is_none() {
            return FilterDecision::Exclude("no file extension".to_string());
        }

        if let Some(allowed) = &self.extensions {
            match &extension {
                Some(ext) if allowed.contains(ext) => {}
                Some(ext) => {
                    return FilterDecision::Exclude(format!("extension '{}' not selected", ext))
                }
                None => return FilterDecision::Exclude("no file extension".to_string()),
            }
        }

        if let Some(kind) = self.kind {
            if !kind.matches(path) {
                return FilterDecision::Exclude(format!("not a {:?} file", kind).to_lowercase());
            }
        }

        FilterDecision::Include
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::organize::types::{SizeLimit, SizeUnit};
    use chrono::{Local, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_set_includes_everything() {
        let set = FilterSet::default();
        assert!(set.is_empty());
        assert!(set
            .evaluate(Path::new("README"), 0, at(2020, 1, 1, 0))
            .is_included());
    }

    #[test]
    fn inactive_toggles_produce_empty_set() {
        let mut settings = FilterSettings::default();
        settings.file_extensions = "png".to_string();
        settings.min_size = SizeLimit::new(5, SizeUnit::Gb);
        assert!(FilterSet::from(&settings).is_empty());
    }

    #[test]
    fn date_bounds_are_inclusive_by_day() {
        let set = FilterSet {
            not_before: Some(day(2022, 1, 1)),
            not_after: Some(day(2022, 12, 31)),
            ..Default::default()
        };
        let path = Path::new("a.jpg");

        assert!(set.evaluate(path, 1, at(2022, 1, 1, 1)).is_included());
        assert!(set.evaluate(path, 1, at(2022, 12, 31, 23)).is_included());
        assert!(!set.evaluate(path, 1, at(2021, 12, 31, 23)).is_included());
        assert!(!set.evaluate(path, 1, at(2023, 1, 1, 1)).is_included());
    }

    #[test]
    fn size_limits_use_1024_units() {
        let mut settings = FilterSettings::default();
        settings.min_size_active = true;
        settings.min_size = SizeLimit::new(1, SizeUnit::Kb);
        settings.max_size_active = true;
        settings.max_size = SizeLimit::new(1, SizeUnit::Mb);
        let set = FilterSet::from(&settings);
        let path = Path::new("a.bin");
        let now = Utc::now();

        assert!(!set.evaluate(path, 1023, now).is_included());
        assert!(set.evaluate(path, 1024, now).is_included());
        assert!(set.evaluate(path, 1024 * 1024, now).is_included());
        assert!(!set.evaluate(path, 1024 * 1024 + 1, now).is_included());
    }

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        let mut settings = FilterSettings::default();
        settings.use_file_extension = true;
        settings.file_extensions = "png, JPG".to_string();
        let set = FilterSet::from(&settings);
        let now = Utc::now();

        assert!(set.evaluate(Path::new("a.PNG"), 1, now).is_included());
        assert!(set.evaluate(Path::new("b.jpg"), 1, now).is_included());
        assert_eq!(
            set.evaluate(Path::new("c.gif"), 1, now),
            FilterDecision::Exclude("extension 'gif' not selected".to_string())
        );
    }

    #[test]
    fn skips_files_without_extension() {
        let set = FilterSet {
            skip_without_extension: true,
            ..Default::default()
        };
        let now = Utc::now();

        assert!(!set.evaluate(Path::new("Makefile"), 1, now).is_included());
        assert!(set.evaluate(Path::new("main.rs"), 1, now).is_included());
    }

    #[test]
    fn kind_filter() {
        let mut settings = FilterSettings::default();
        settings.use_system_file_type = true;
        settings.file_kind = FileKind::Video;
        let set = FilterSet::from(&settings);
        let now = Utc::now();

        assert!(set.evaluate(Path::new("clip.mov"), 1, now).is_included());
        assert_eq!(
            set.evaluate(Path::new("photo.jpg"), 1, now),
            FilterDecision::Exclude("not a video file".to_string())
        );
    }

    #[test]
    fn kind_all_is_no_filter() {
        let mut settings = FilterSettings::default();
        settings.use_system_file_type = true;
        settings.file_kind = FileKind::All;
        assert!(FilterSet::from(&settings).kind.is_none());
    }
}
