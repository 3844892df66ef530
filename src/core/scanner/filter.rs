//! Hidden-entry policy for the walker.

use std::path::Path;
use walkdir::DirEntry;

/// Check if a file name marks a hidden entry (starts with `.`)
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Check if a path's final component is hidden
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(is_hidden_name)
        .unwrap_or(false)
}

/// Check if a walkdir entry is hidden.
///
/// The walk root itself is never treated as hidden, so scanning
/// `~/.photos` still works.
pub(crate) fn is_hidden_entry(entry: &DirEntry) -> bool {
    entry.depth() > 0 && is_hidden(entry.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_files_are_hidden() {
        assert!(is_hidden(Path::new("/photos/.DS_Store")));
        assert!(is_hidden(Path::new("/photos/.cache")));
    }

    #[test]
    fn regular_files_are_visible() {
        assert!(!is_hidden(Path::new("/photos/IMG_0001.jpg")));
        assert!(!is_hidden(Path::new("/photos/no_extension")));
    }

    #[test]
    fn relative_components_are_not_hidden() {
        assert!(!is_hidden_name("."));
        assert!(!is_hidden_name(".."));
    }
}
