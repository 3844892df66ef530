//! Coarse file type classification by extension.

use serde::{Deserialize, Serialize};
use std::path::Path;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rtf", "csv", "tsv", "json", "xml", "yaml", "yml", "toml", "log",
    "html", "htm", "tex", "ini",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif", "heic", "heif", "raw", "cr2",
    "nef", "dng", "arw", "raf",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "wmv", "webm", "m4v", "mpg", "mpeg", "3gp",
];

/// Extensions whose containers can carry EXIF that kamadak-exif reads
const EXIF_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tiff", "tif", "heic", "heif", "png", "webp"];

/// Coarse file kinds used by the type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Matches every file
    #[default]
    All,
    Text,
    Image,
    Video,
}

impl FileKind {
    /// Classify a path by its extension (case-insensitive)
    pub fn of(path: &Path) -> Option<FileKind> {
        let ext = lower_extension(path)?;
        let ext = ext.as_str();

        if IMAGE_EXTENSIONS.contains(&ext) {
            Some(FileKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Some(FileKind::Video)
        } else if TEXT_EXTENSIONS.contains(&ext) {
            Some(FileKind::Text)
        } else {
            None
        }
    }

    /// Check if a path falls in this kind
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            FileKind::All => true,
            kind => FileKind::of(path) == Some(*kind),
        }
    }
}

impl std::str::FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(FileKind::All),
            "text" => Ok(FileKind::Text),
            "image" => Ok(FileKind::Image),
            "video" => Ok(FileKind::Video),
            other => Err(format!("unknown file kind '{}'", other)),
        }
    }
}

/// Lower-cased extension of a path, if it has one
pub fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Check if a file may carry an embedded EXIF date
pub fn may_carry_exif(path: &Path) -> bool {
    lower_extension(path)
        .map(|ext| EXIF_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension_case_insensitively() {
        assert_eq!(FileKind::of(Path::new("a.JPG")), Some(FileKind::Image));
        assert_eq!(FileKind::of(Path::new("clip.mov")), Some(FileKind::Video));
        assert_eq!(FileKind::of(Path::new("notes.TXT")), Some(FileKind::Text));
        assert_eq!(FileKind::of(Path::new("archive.zip")), None);
        assert_eq!(FileKind::of(Path::new("README")), None);
    }

    #[test]
    fn all_matches_everything() {
        assert!(FileKind::All.matches(Path::new("archive.zip")));
        assert!(FileKind::All.matches(Path::new("no_extension")));
    }

    #[test]
    fn specific_kind_matches_only_its_files() {
        assert!(FileKind::Image.matches(Path::new("photo.heic")));
        assert!(!FileKind::Image.matches(Path::new("clip.mp4")));
    }

    #[test]
    fn exif_candidates() {
        assert!(may_carry_exif(Path::new("IMG_0001.JPG")));
        assert!(!may_carry_exif(Path::new("clip.mp4")));
        assert!(!may_carry_exif(Path::new("no_extension")));
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("Image".parse::<FileKind>().unwrap(), FileKind::Image);
        assert!("audio".parse::<FileKind>().is_err());
    }
}
