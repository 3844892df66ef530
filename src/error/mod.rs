//! # Error Module
//!
//! Error types for file-zen.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file errors are recoverable** - the pipeline turns them into
//!   status lines and keeps going
//! - **Only configuration errors are fatal** - they stop a run before it starts

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum FileZenError {
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Task has no run to wait for")]
    NotStarted,

    #[error("Task thread panicked")]
    TaskPanicked,
}

/// Errors that occur while enumerating a directory tree
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to enumerate {path}: {reason}")]
    Enumeration { path: PathBuf, reason: String },
}

impl WalkError {
    /// Path of the entry the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            WalkError::DirectoryNotFound { path }
            | WalkError::PermissionDenied { path }
            | WalkError::Enumeration { path, .. } => path,
        }
    }
}

/// Errors that occur while reading attributes or content of a file
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to read attributes of {path}: {source}")]
    AttributeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to checksum {path}: {source}")]
    Checksum {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while placing a file at its destination
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to create destination directory {path}: {source}")]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to transfer {from} to {to}: {source}")]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Copy verification failed for {path}: expected {expected} bytes, wrote {actual}")]
    VerificationFailed {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Path has no file name: {path}")]
    NoFileName { path: PathBuf },

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

/// Errors raised by catalog queries
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("There is no current record; no file has been processed yet")]
    NoCurrentRecord,
}

/// Configuration contract violations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No source directory selected")]
    MissingSource,

    #[error("No destination directory selected")]
    MissingDestination,

    #[error("Invalid size '{value}' (expected e.g. 500KB, 10MB, 2GB)")]
    InvalidSize { value: String },

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FileZenError>;
