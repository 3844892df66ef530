//! The identity snapshot of one file.

use crate::core::fingerprint::Checksum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identity facts about a single file, captured once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Per-run token, not derived from content
    pub id: Uuid,
    /// Final path component
    pub name: String,
    pub path: PathBuf,
    /// `file://` form of the path
    pub uri: String,
    /// Size in bytes
    pub size: u64,
    pub modified_at: DateTime<Utc>,
    /// Effective creation date
    pub created_at: DateTime<Utc>,
    pub checksum: Checksum,
}

impl FileRecord {
    /// Create a record with a fresh id and an unknown checksum
    pub fn new(
        path: PathBuf,
        size: u64,
        modified_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            name,
            uri: file_uri(&path),
            path,
            size,
            modified_at,
            created_at,
            checksum: Checksum::Unknown,
        }
    }

    /// Attach a computed checksum
    pub fn with_checksum(mut self, hex: String) -> Self {
        self.checksum = Checksum::Computed(hex);
        self
    }
}

/// `file://` URI for a path, with spaces and percent signs escaped
pub fn file_uri(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    let escaped = text.replace('%', "%25").replace(' ', "%20");
    if escaped.starts_with('/') {
        format!("file://{}", escaped)
    } else {
        format!("file:///{}", escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_get_unique_ids() {
        let now = Utc::now();
        let a = FileRecord::new(PathBuf::from("/a.txt"), 1, now, now);
        let b = FileRecord::new(PathBuf::from("/a.txt"), 1, now, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn uri_escapes_spaces() {
        assert_eq!(
            file_uri(Path::new("/My Photos/a.jpg")),
            "file:///My%20Photos/a.jpg"
        );
    }

    #[test]
    fn with_checksum_marks_known() {
        let now = Utc::now();
        let record = FileRecord::new(PathBuf::from("/a.txt"), 1, now, now)
            .with_checksum("abc123".to_string());
        assert_eq!(record.checksum.as_computed(), Some("abc123"));
    }
}
