//! Identity keys built from the active match criteria.

use crate::core::catalog::FileRecord;
use serde::{Deserialize, Serialize};

/// Which fields must match for two files to count as the same
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub checksum: bool,
    pub name: bool,
    pub size: bool,
}

impl MatchCriteria {
    /// Check if no criterion is active (grouping finds nothing)
    pub fn is_empty(&self) -> bool {
        !(self.checksum || self.name || self.size)
    }
}

/// The tuple of active identity fields of one record.
///
/// Inactive fields are `None`, so two keys are equal exactly when every
/// active field matches, regardless of the order criteria were chosen in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub checksum: Option<String>,
    pub name: Option<String>,
    pub size: Option<u64>,
}

impl IdentityKey {
    /// Build the key for a record.
    ///
    /// Returns `None` when no criterion is active, or when checksum is
    /// active but the record's checksum was never computed.
    pub fn for_record(record: &FileRecord, criteria: &MatchCriteria) -> Option<Self> {
        if criteria.is_empty() {
            return None;
        }

        let checksum = if criteria.checksum {
            Some(record.checksum.as_computed()?.to_string())
        } else {
            None
        };

        Some(Self {
            checksum,
            name: criteria.name.then(|| record.name.clone()),
            size: criteria.size.then_some(record.size),
        })
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(checksum) = &self.checksum {
            parts.push(format!("checksum={}", checksum));
        }
        if let Some(name) = &self.name {
            parts.push(format!("name={}", name));
        }
        if let Some(size) = self.size {
            parts.push(format!("size={}", size));
        }
        write!(f, "{}", parts.join(", "))
    }
}
