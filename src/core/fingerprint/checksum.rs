//! Streamed SHA-256 content checksums.

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default read size for checksumming (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Content checksum of a record.
///
/// `Unknown` until computed; checksums are only computed when some
/// operation needs content identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Checksum {
    #[default]
    Unknown,
    Computed(String),
}

impl Checksum {
    /// The hex digest, if computed
    pub fn as_computed(&self) -> Option<&str> {
        match self {
            Checksum::Computed(hex) => Some(hex),
            Checksum::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Checksum::Computed(_))
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checksum::Computed(hex) => write!(f, "{}", hex),
            Checksum::Unknown => write!(f, "unknown"),
        }
    }
}

/// Hash a file's content in `chunk_size` reads and return the lower-case hex digest.
///
/// Never holds more than one chunk of the file in memory.
pub fn sha256_file(path: &Path, chunk_size: usize) -> Result<String, FingerprintError> {
    let wrap = |source| FingerprintError::Checksum {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(wrap)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(wrap)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
