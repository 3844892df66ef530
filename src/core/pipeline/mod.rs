//! # Pipeline Module
//!
//! Drives scan and organize runs and reports what happens to every file.
//!
//! ## Scan
//! 1. **Walk** - enumerate files under the root
//! 2. **Fingerprint** - size, dates and (if requested) checksum, in parallel
//!    batches with rayon
//! 3. **Catalog** - insert records and update the duplicate index, one at a
//!    time in walker order
//! 4. **Group** - materialize duplicate sets, optionally a delete script
//!
//! ## Organize
//! Walk, filter, resolve and transfer, one file at a time in walker order.
//!
//! ## Control
//! [`Task`] runs either pipeline on a background thread with cooperative
//! cancellation checked once per walked entry.

mod control;
mod organize;
mod scan;
mod task;

pub use control::{CancellationToken, Progress};
pub use organize::{OrganizePipeline, OrganizeReport};
pub use scan::{ScanConfig, ScanPipeline, ScanReport, DEFAULT_FINGERPRINT_BATCH};
pub use task::{Task, TaskReport, TaskState};
