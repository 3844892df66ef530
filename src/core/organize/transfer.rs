//! Places files at their resolved destination.
//!
//! Copies are written to a temporary file next to the destination and
//! renamed into place, so an interrupted run never leaves a partial file
//! under the final name. Moves try a plain rename first and fall back to a
//! verified copy followed by removing the source.

use super::types::{OverwritePolicy, TransferMode};
use crate::core::fingerprint::Fingerprinter;
use crate::error::TransferError;
use crate::events::Outcome;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub kind: Outcome,
    /// Where the file ended up, or the path that blocked it
    pub destination: PathBuf,
    pub message: String,
}

/// Copies or moves files with collision handling
#[derive(Debug, Clone)]
pub struct TransferEngine {
    mode: TransferMode,
    overwrite: OverwritePolicy,
    fingerprinter: Fingerprinter,
}

/// Checksums of the two sides of a conflict, computed at most once each
struct ConflictProbe<'a> {
    fingerprinter: &'a Fingerprinter,
    source: &'a Path,
    existing: &'a Path,
    source_size: u64,
    existing_size: u64,
    source_checksum: Option<String>,
    existing_checksum: Option<String>,
}

impl<'a> ConflictProbe<'a> {
    fn source_checksum(&mut self) -> Result<String, TransferError> {
        if let Some(hex) = &self.source_checksum {
            return Ok(hex.clone());
        }
        let hex = self.fingerprinter.checksum(self.source)?;
        self.source_checksum = Some(hex.clone());
        Ok(hex)
    }

    fn existing_checksum(&mut self) -> Result<String, TransferError> {
        if let Some(hex) = &self.existing_checksum {
            return Ok(hex.clone());
        }
        let hex = self.fingerprinter.checksum(self.existing)?;
        self.existing_checksum = Some(hex.clone());
        Ok(hex)
    }

    fn same_size(&self) -> bool {
        self.source_size == self.existing_size
    }

    /// Equal sizes and equal checksums; sizes are compared first
    fn identical(&mut self) -> Result<bool, TransferError> {
        if !self.same_size() {
            return Ok(false);
        }
        Ok(self.source_checksum()? == self.existing_checksum()?)
    }
}

impl TransferEngine {
    pub fn new(mode: TransferMode, overwrite: OverwritePolicy) -> Self {
        Self {
            mode,
            overwrite,
            fingerprinter: Fingerprinter::new(),
        }
    }

    /// Use a specific fingerprinter for conflict checksums
    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    /// Place `source` at `destination`, resolving any conflict.
    pub fn transfer(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<TransferOutcome, TransferError> {
        let source_size = match fs::metadata(source) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TransferError::SourceMissing {
                    path: source.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(TransferError::Transfer {
                    from: source.to_path_buf(),
                    to: destination.to_path_buf(),
                    source: e,
                })
            }
        };

        let parent = destination
            .parent()
            .ok_or_else(|| TransferError::NoFileName {
                path: destination.to_path_buf(),
            })?;
        fs::create_dir_all(parent).map_err(|source| TransferError::DestinationCreate {
            path: parent.to_path_buf(),
            source,
        })?;

        let existing_size = match fs::metadata(destination) {
            Ok(meta) => meta.len(),
            Err(_) => {
                self.place(source, destination, false)?;
                return Ok(self.placed(source, destination, self.placed_kind()));
            }
        };

        if is_same_file(source, destination) {
            return Ok(skipped(source, destination, "already in place"));
        }

        let mut probe = ConflictProbe {
            fingerprinter: &self.fingerprinter,
            source,
            existing: destination,
            source_size,
            existing_size,
            source_checksum: None,
            existing_checksum: None,
        };

        if self.overwrite.same_name
            && (!self.overwrite.same_name_requires_identical || probe.identical()?)
        {
            self.place(source, destination, true)?;
            return Ok(self.placed(source, destination, Outcome::Overwritten));
        }

        if self.overwrite.same_size
            && probe.same_size()
            && (!self.overwrite.same_size_requires_identical || probe.identical()?)
        {
            self.place(source, destination, true)?;
            return Ok(self.placed(source, destination, Outcome::Overwritten));
        }

        if probe.identical()? {
            return Ok(skipped(
                source,
                destination,
                "identical file already exists",
            ));
        }

        let name = source.file_name().ok_or_else(|| TransferError::NoFileName {
            path: source.to_path_buf(),
        })?;
        let renamed = parent.join(format!(
            "{}_{}",
            probe.source_checksum()?,
            name.to_string_lossy()
        ));

        if renamed.exists() {
            return Ok(skipped(source, &renamed, "renamed copy already exists"));
        }

        self.place(source, &renamed, false)?;
        Ok(self.placed(source, &renamed, Outcome::Renamed))
    }

    fn placed_kind(&self) -> Outcome {
        match self.mode {
            TransferMode::Copy => Outcome::Copied,
            TransferMode::Move => Outcome::Moved,
        }
    }

    fn placed(&self, source: &Path, destination: &Path, kind: Outcome) -> TransferOutcome {
        debug!("{:?}: {} -> {}", kind, source.display(), destination.display());
        TransferOutcome {
            kind,
            destination: destination.to_path_buf(),
            message: format!("{} --> {} ✓", source.display(), destination.display()),
        }
    }

    /// Write `source` to `destination` according to the mode.
    fn place(
        &self,
        source: &Path,
        destination: &Path,
        replace: bool,
    ) -> Result<(), TransferError> {
        match self.mode {
            TransferMode::Copy => copy_atomic(source, destination, replace),
            TransferMode::Move => {
                // rename fails across filesystems, fall back to copy+delete
                if fs::rename(source, destination).is_ok() {
                    return Ok(());
                }
                copy_atomic(source, destination, replace)?;
                fs::remove_file(source).map_err(|e| TransferError::Transfer {
                    from: source.to_path_buf(),
                    to: destination.to_path_buf(),
                    source: e,
                })
            }
        }
    }
}

fn skipped(source: &Path, destination: &Path, reason: &str) -> TransferOutcome {
    debug!("Skipped {}: {}", source.display(), reason);
    TransferOutcome {
        kind: Outcome::Skipped,
        destination: destination.to_path_buf(),
        message: format!("{}: skipped, {} at {}", source.display(), reason, destination.display()),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy through a temp file in the destination directory, verify the size,
/// then rename into place. Without `replace` an existing file is never
/// clobbered.
fn copy_atomic(source: &Path, destination: &Path, replace: bool) -> Result<(), TransferError> {
    let io_err = |e: io::Error| TransferError::Transfer {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    };

    let dir = destination.parent().ok_or_else(|| TransferError::NoFileName {
        path: destination.to_path_buf(),
    })?;

    let mut input = File::open(source).map_err(io_err)?;
    let metadata = input.metadata().map_err(io_err)?;
    let expected = metadata.len();

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    io::copy(&mut input, &mut temp).map_err(io_err)?;
    temp.flush().map_err(io_err)?;

    let actual = temp.as_file().metadata().map_err(io_err)?.len();
    if actual != expected {
        // temp file is removed on drop
        return Err(TransferError::VerificationFailed {
            path: destination.to_path_buf(),
            expected,
            actual,
        });
    }

    fs::set_permissions(temp.path(), metadata.permissions()).map_err(io_err)?;

    let persisted = if replace {
        temp.persist(destination)
    } else {
        temp.persist_noclobber(destination)
    };
    persisted.map_err(|e| io_err(e.error))?;

    Ok(())
}
