//! # Fingerprint Module
//!
//! Computes the identity facts of a single file.
//!
//! ## Facts
//! - Size and modification time (plain attribute reads)
//! - SHA-256 content checksum, streamed in fixed-size chunks
//! - Effective creation date: EXIF `DateTimeDigitized` for images, else the
//!   filesystem creation time, else a distant-past sentinel
//!
//! Checksums are the expensive part and are only computed on request.

mod checksum;
mod dates;
mod kind;

pub use checksum::{sha256_file, Checksum, DEFAULT_CHUNK_SIZE};
pub use dates::{
    calendar_day, distant_past, effective_creation_date, parse_exif_datetime, read_exif_digitized,
};
pub use kind::{lower_extension, may_carry_exif, FileKind};

use crate::core::catalog::FileRecord;
use crate::error::FingerprintError;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Reads sizes, dates and checksums of files
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    chunk_size: usize,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the read size used while checksumming
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn metadata(&self, path: &Path) -> Result<fs::Metadata, FingerprintError> {
        fs::metadata(path).map_err(|source| FingerprintError::AttributeRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File size in bytes
    pub fn size(&self, path: &Path) -> Result<u64, FingerprintError> {
        Ok(self.metadata(path)?.len())
    }

    /// Last modification time
    pub fn modified_date(&self, path: &Path) -> Result<DateTime<Utc>, FingerprintError> {
        let modified = self
            .metadata(path)?
            .modified()
            .map_err(|source| FingerprintError::AttributeRead {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(modified.into())
    }

    /// Hex SHA-256 of the file's content
    pub fn checksum(&self, path: &Path) -> Result<String, FingerprintError> {
        sha256_file(path, self.chunk_size)
    }

    /// Date used for destination grouping; never fails
    pub fn effective_creation_date(&self, path: &Path) -> DateTime<Utc> {
        effective_creation_date(path)
    }

    /// Build a record with size and dates filled in and the checksum `Unknown`.
    pub fn record(&self, path: &Path) -> Result<FileRecord, FingerprintError> {
        let metadata = self.metadata(path)?;
        let modified_at: DateTime<Utc> = metadata
            .modified()
            .map_err(|source| FingerprintError::AttributeRead {
                path: path.to_path_buf(),
                source,
            })?
            .into();

        Ok(FileRecord::new(
            path.to_path_buf(),
            metadata.len(),
            modified_at,
            self.effective_creation_date(path),
        ))
    }

    /// Build a record and checksum it.
    ///
    /// A checksum failure is not fatal to the record: it keeps `Unknown` and
    /// the error is returned beside it.
    pub fn record_with_checksum(
        &self,
        path: &Path,
    ) -> Result<(FileRecord, Option<FingerprintError>), FingerprintError> {
        let record = self.record(path)?;
        match self.checksum(path) {
            Ok(hex) => Ok((record.with_checksum(hex), None)),
            Err(e) => Ok((record, Some(e))),
        }
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn identical_content_has_identical_checksum() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let sub = temp_dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();
        let b = sub.join("completely_different_name.bin");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();

        let fingerprinter = Fingerprinter::new();
        assert_eq!(
            fingerprinter.checksum(&a).unwrap(),
            fingerprinter.checksum(&b).unwrap()
        );
    }

    #[test]
    fn different_content_has_different_checksum() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        std::fs::write(&a, b"one").unwrap();
        std::fs::write(&b, b"two").unwrap();

        let fingerprinter = Fingerprinter::new();
        assert_ne!(
            fingerprinter.checksum(&a).unwrap(),
            fingerprinter.checksum(&b).unwrap()
        );
    }

    #[test]
    fn record_reads_size_and_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, b"12345").unwrap();

        let record = Fingerprinter::new().record(&path).unwrap();

        assert_eq!(record.size, 5);
        assert_eq!(record.name, "notes.txt");
        assert_eq!(record.checksum, Checksum::Unknown);
    }

    #[test]
    fn record_with_checksum_fills_digest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let (record, error) = Fingerprinter::new()
            .chunk_size(4)
            .record_with_checksum(&path)
            .unwrap();

        assert!(error.is_none());
        assert_eq!(
            record.checksum.as_computed(),
            Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn vanished_file_is_an_attribute_error() {
        let fingerprinter = Fingerprinter::new();
        let path = Path::new("/nonexistent/gone.txt");

        assert!(matches!(
            fingerprinter.size(path),
            Err(FingerprintError::AttributeRead { .. })
        ));
        assert!(matches!(
            fingerprinter.modified_date(path),
            Err(FingerprintError::AttributeRead { .. })
        ));
        assert!(fingerprinter.record(path).is_err());
    }
}
