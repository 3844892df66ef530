//! Lazy directory walking implementation using walkdir.

use super::filter::is_hidden_entry;
use crate::error::WalkError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Options for a single walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    /// Descend into subdirectories
    pub recurse: bool,
    /// Include entries whose name starts with `.`
    pub include_hidden: bool,
    /// Follow symbolic links to directories (no cycle protection beyond walkdir's)
    pub follow_links: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            recurse: true,
            include_hidden: false,
            follow_links: false,
        }
    }
}

type EntryIter = Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>;

/// Lazily yields regular-file paths under a root directory.
///
/// Directories are never yielded. Per-entry failures come out as `Err`
/// items and the walk continues with the next entry. A walker is
/// consumed by iteration; start a new one for a new run.
pub struct FileWalker {
    root: PathBuf,
    entries: EntryIter,
}

impl FileWalker {
    /// Create a walker rooted at `root`.
    ///
    /// Fails up front if the root is missing or is not a directory.
    pub fn new(root: impl Into<PathBuf>, options: WalkOptions) -> Result<Self, WalkError> {
        let root = root.into();

        if !root.is_dir() {
            return Err(WalkError::DirectoryNotFound { path: root });
        }

        let mut walker = WalkDir::new(&root)
            .follow_links(options.follow_links)
            .min_depth(1);

        if !options.recurse {
            walker = walker.max_depth(1);
        }

        let include_hidden = options.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(move |entry| include_hidden || !is_hidden_entry(entry));

        Ok(Self {
            root,
            entries: Box::new(entries),
        })
    }

    /// The directory this walker was created for
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn classify(&self, error: walkdir::Error) -> WalkError {
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        match error.io_error().map(|e| e.kind()) {
            Some(std::io::ErrorKind::PermissionDenied) => WalkError::PermissionDenied { path },
            _ => WalkError::Enumeration {
                path,
                reason: error.to_string(),
            },
        }
    }
}

/// Regular files, plus symlinks whose target is a regular file
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

impl Iterator for FileWalker {
    type Item = Result<PathBuf, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.entries.next()? {
                Ok(entry) => {
                    if is_regular_file(&entry) {
                        return Some(Ok(entry.into_path()));
                    }
                }
                Err(error) => return Some(Err(self.classify(error))),
            }
        }
    }
}
