//! # Core Module
//!
//! The UI-agnostic file identification and organization engine.
//!
//! ## Modules
//! - `scanner` - Walks directory trees
//! - `fingerprint` - Sizes, dates and content checksums of single files
//! - `catalog` - Records of every file seen in a scan
//! - `grouping` - Duplicate sets derived from the catalog
//! - `organize` - Filters, destination layout and file transfer
//! - `pipeline` - Scan and organize runs, background tasks

pub mod catalog;
pub mod fingerprint;
pub mod grouping;
pub mod organize;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use catalog::{Catalog, FileRecord};
pub use fingerprint::{Checksum, Fingerprinter};
pub use grouping::{DuplicateSet, KeepPolicy, MatchCriteria};
pub use organize::{OrganizeConfig, TransferMode};
pub use pipeline::{ScanConfig, Task, TaskState};
