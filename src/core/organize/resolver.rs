//! Maps a file and its date to a path in the destination layout.

use super::types::Grouping;
use crate::core::fingerprint::calendar_day;
use crate::error::TransferError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::path::{Path, PathBuf};

/// Computes `root[/YYYY][/MM][/DD]/<file name>`
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    root: PathBuf,
    grouping: Grouping,
}

impl DestinationResolver {
    pub fn new(root: impl Into<PathBuf>, grouping: Grouping) -> Self {
        Self {
            root: root.into(),
            grouping,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a file dated `date` lands in, by local calendar day
    pub fn directory_for(&self, date: DateTime<Utc>) -> PathBuf {
        self.directory_for_day(calendar_day(date))
    }

    pub fn directory_for_day(&self, day: NaiveDate) -> PathBuf {
        let mut dir = self.root.clone();
        if self.grouping.year {
            dir.push(format!("{:04}", day.year()));
        }
        if self.grouping.month {
            dir.push(format!("{:02}", day.month()));
        }
        if self.grouping.day {
            dir.push(format!("{:02}", day.day()));
        }
        dir
    }

    /// Full destination path for `source`, keeping its file name
    pub fn resolve(&self, source: &Path, date: DateTime<Utc>) -> Result<PathBuf, TransferError> {
        let name = source.file_name().ok_or_else(|| TransferError::NoFileName {
            path: source.to_path_buf(),
        })?;
        Ok(self.directory_for(date).join(name))
    }
}

/// Human-readable template of the layout a grouping produces
pub fn destination_format(grouping: &Grouping) -> String {
    let mut format = String::from("[destination directory]");
    if grouping.year {
        format.push_str("/[YYYY]");
    }
    if grouping.month {
        format.push_str("/[MM]");
    }
    if grouping.day {
        format.push_str("/[DD]");
    }
    format.push_str("/[filename]");
    format
}

/// Concrete path a file dated `today` would get, shown next to the template.
///
/// Without a destination the root stays as the `[destination directory]`
/// placeholder.
pub fn destination_example(
    root: Option<&Path>,
    grouping: &Grouping,
    today: NaiveDate,
) -> String {
    let root = root.unwrap_or_else(|| Path::new("[destination directory]"));
    DestinationResolver::new(root, *grouping)
        .directory_for_day(today)
        .join("filename.txt")
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn date() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2022, 3, 7, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn year_only() {
        let resolver = DestinationResolver::new(
            "/dst",
            Grouping {
                year: true,
                ..Default::default()
            },
        );
        assert_eq!(
            resolver.resolve(Path::new("/src/a.jpg"), date()).unwrap(),
            PathBuf::from("/dst/2022/a.jpg")
        );
    }

    #[test]
    fn full_grouping_is_zero_padded() {
        let resolver = DestinationResolver::new(
            "/dst",
            Grouping {
                year: true,
                month: true,
                day: true,
            },
        );
        assert_eq!(
            resolver.resolve(Path::new("/src/deep/a.jpg"), date()).unwrap(),
            PathBuf::from("/dst/2022/03/07/a.jpg")
        );
    }

    #[test]
    fn flags_are_independent() {
        let resolver = DestinationResolver::new(
            "/dst",
            Grouping {
                year: false,
                month: true,
                day: true,
            },
        );
        assert_eq!(resolver.directory_for(date()), PathBuf::from("/dst/03/07"));
    }

    #[test]
    fn no_grouping_is_flat() {
        let resolver = DestinationResolver::new("/dst", Grouping::default());
        assert_eq!(
            resolver.resolve(Path::new("/src/a/b/c.txt"), date()).unwrap(),
            PathBuf::from("/dst/c.txt")
        );
    }

    #[test]
    fn sentinel_date_pads_year() {
        let resolver = DestinationResolver::new(
            "/dst",
            Grouping {
                year: true,
                ..Default::default()
            },
        );
        let past = crate::core::fingerprint::distant_past();
        assert_eq!(resolver.directory_for(past), PathBuf::from("/dst/0001"));
    }

    #[test]
    fn path_without_file_name_is_an_error() {
        let resolver = DestinationResolver::new("/dst", Grouping::default());
        assert!(matches!(
            resolver.resolve(Path::new("/"), date()),
            Err(TransferError::NoFileName { .. })
        ));
    }

    #[test]
    fn format_preview() {
        assert_eq!(
            destination_format(&Grouping {
                year: true,
                month: true,
                day: false,
            }),
            "[destination directory]/[YYYY]/[MM]/[filename]"
        );
        assert_eq!(
            destination_format(&Grouping::default()),
            "[destination directory]/[filename]"
        );
    }

    #[test]
    fn example_uses_root_and_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        let grouping = Grouping {
            year: true,
            month: true,
            day: false,
        };

        assert_eq!(
            destination_example(Some(Path::new("/photos")), &grouping, today),
            "/photos/2024/05/filename.txt"
        );
        assert_eq!(
            destination_example(None, &Grouping::default(), today),
            "[destination directory]/filename.txt"
        );
    }
}
