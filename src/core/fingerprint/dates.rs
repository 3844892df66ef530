//! Effective creation date: EXIF digitized date, then filesystem, then a sentinel.

use super::kind::may_carry_exif;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use exif::{In, Reader, Tag, Value};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// EXIF date format: "YYYY:MM:DD HH:MM:SS"
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Sentinel for files with no usable date (0001-01-01T00:00:00Z)
pub fn distant_past() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Calendar day a date falls on for grouping and date filters.
///
/// Days follow the local calendar. The [`distant_past`] sentinel always
/// maps to 0001-01-01.
pub fn calendar_day(date: DateTime<Utc>) -> NaiveDate {
    if date == distant_past() {
        return date.date_naive();
    }
    date.with_timezone(&Local).date_naive()
}

/// Date used for destination grouping.
///
/// Image-typed files try the EXIF `DateTimeDigitized` field first. Any
/// failure falls back to the filesystem creation time, and if the platform
/// or filesystem can't report that, to [`distant_past`]. Never fails.
pub fn effective_creation_date(path: &Path) -> DateTime<Utc> {
    if may_carry_exif(path) {
        if let Some(date) = read_exif_digitized(path) {
            return date;
        }
    }

    filesystem_creation_date(path).unwrap_or_else(distant_past)
}

/// Read the EXIF digitized timestamp
pub fn read_exif_digitized(path: &Path) -> Option<DateTime<Utc>> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    let field = exif.get_field(Tag::DateTimeDigitized, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref values) => {
            let bytes = values.first()?;
            let text = std::str::from_utf8(bytes).ok()?;
            parse_exif_datetime(text)
        }
        _ => None,
    }
}

/// Parse an EXIF ASCII date ("2024:01:15 14:30:00").
///
/// EXIF carries the camera's wall-clock time with no zone, so it is read as
/// local time. A time skipped by a DST change is taken as UTC.
pub fn parse_exif_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim_end_matches('\0').trim().trim_matches('"');
    let naive = NaiveDateTime::parse_from_str(text, EXIF_DATE_FORMAT).ok()?;
    let date = Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc());
    Some(date)
}

fn filesystem_creation_date(path: &Path) -> Option<DateTime<Utc>> {
    let created = fs::metadata(path).ok()?.created().ok()?;
    Some(created.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use tempfile::TempDir;

    #[test]
    fn parses_exif_format() {
        let date = parse_exif_datetime("2022:03:04 10:11:12").unwrap();
        assert_eq!(calendar_day(date), NaiveDate::from_ymd_opt(2022, 3, 4).unwrap());
    }

    #[test]
    fn exif_wall_clock_keeps_its_day_near_midnight() {
        let late = parse_exif_datetime("2022:06:15 23:59:00").unwrap();
        let early = parse_exif_datetime("2022:06:15 00:01:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2022, 6, 15).unwrap();

        assert_eq!(calendar_day(late), expected);
        assert_eq!(calendar_day(early), expected);
    }

    #[test]
    fn calendar_day_follows_local_time() {
        let local = Local.with_ymd_and_hms(2021, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(
            calendar_day(local.with_timezone(&Utc)),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()
        );
    }

    #[test]
    fn sentinel_stays_on_year_one() {
        assert_eq!(
            calendar_day(distant_past()),
            NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
        );
    }

    #[test]
    fn tolerates_nul_padding_and_quotes() {
        assert!(parse_exif_datetime("2022:03:04 10:11:12\0").is_some());
        assert!(parse_exif_datetime("\"2022:03:04 10:11:12\"").is_some());
    }

    #[test]
    fn rejects_unparsable_dates() {
        assert!(parse_exif_datetime("    :  :     :  :  ").is_none());
        assert!(parse_exif_datetime("2022-03-04").is_none());
    }

    #[test]
    fn distant_past_is_year_one() {
        let sentinel = distant_past();
        assert_eq!((sentinel.year(), sentinel.month(), sentinel.day()), (1, 1, 1));
    }

    #[test]
    fn fake_jpeg_falls_back_without_failing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        assert!(read_exif_digitized(&path).is_none());
        // Either the filesystem birth time or the sentinel; both are fine
        let date = effective_creation_date(&path);
        assert!(date <= Utc::now());
    }

    #[test]
    fn missing_file_yields_sentinel() {
        let date = effective_creation_date(Path::new("/nonexistent/photo.jpg"));
        assert_eq!(date, distant_past());
    }
}
