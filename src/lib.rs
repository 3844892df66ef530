//! # file-zen
//!
//! Finds duplicate files and sorts files into a date-structured layout.
//!
//! ## Core Philosophy
//! - **Never auto-delete** - duplicates are reported; removal is a script the
//!   user reviews and runs
//! - **Never clobber silently** - collisions are skipped, renamed, or
//!   overwritten only when the policy says so
//! - **Never leave partial files** - copies land atomically
//!
//! ## Architecture
//! - `core` - The engine (walk, fingerprint, catalog, group, organize)
//! - `events` - Event-driven progress reporting (UI-ready)
//! - `error` - Error types per component

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{FileZenError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Filtering follows
/// `RUST_LOG`. Calling it twice is harmless.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
