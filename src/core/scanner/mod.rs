//! # Scanner Module
//!
//! Enumerates regular files under a directory.
//!
//! ## Behavior
//! - Lazy: paths are produced one at a time as the tree is read
//! - Recursive or top-level only
//! - Hidden files and directories (`.name`) skipped unless requested
//! - Symbolic links are not resolved beyond walkdir's defaults; there is
//!   no cycle detection
//! - A failing entry is reported and skipped, never aborting the walk
//!
//! ## Example
//! ```rust,ignore
//! use file_zen::core::scanner::{FileWalker, WalkOptions};
//!
//! for item in FileWalker::new("/Users/me/Pictures", WalkOptions::default())? {
//!     match item {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("skipped: {}", e),
//!     }
//! }
//! ```

mod filter;
mod walker;

pub use filter::{is_hidden, is_hidden_name};
pub use walker::{FileWalker, WalkOptions};

use crate::error::WalkError;
use std::path::Path;

/// Count the files a walk would yield, for sizing a progress bar up front.
///
/// Entries that can't be read are not counted.
pub fn count_files(root: &Path, options: WalkOptions) -> Result<usize, WalkError> {
    Ok(FileWalker::new(root, options)?.filter(Result::is_ok).count())
}
