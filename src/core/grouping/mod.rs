//! # Grouping Module
//!
//! Derives duplicate sets from catalogued records.
//!
//! ## How It Works
//! 1. Build an [`IdentityKey`] per record from the active [`MatchCriteria`]
//! 2. Bucket record ids by key, in discovery order
//! 3. Every bucket with two or more ids is a [`DuplicateSet`]
//!
//! With several criteria active the key is the tuple of all of them, so
//! files group only when every active field matches. With none active,
//! nothing groups.
//!
//! ## Keeper selection
//! When redundant copies are listed for removal, one file per set is kept:
//! the oldest or newest by modification time, ties going to whichever was
//! discovered first.

mod key;
mod script;

pub use key::{IdentityKey, MatchCriteria};
pub use script::write_delete_script;

use crate::core::catalog::{Catalog, FileRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Which copy of a duplicate set to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepPolicy {
    #[default]
    Oldest,
    Newest,
}

impl std::fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeepPolicy::Oldest => write!(f, "oldest"),
            KeepPolicy::Newest => write!(f, "newest"),
        }
    }
}

/// Record ids sharing one identity key, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateSet {
    pub key: IdentityKey,
    pub ids: Vec<Uuid>,
}

impl DuplicateSet {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The id to keep under `policy`.
    ///
    /// Compares `modified_at`; on a tie the earlier-discovered record wins.
    pub fn keeper(&self, catalog: &Catalog, policy: KeepPolicy) -> Option<Uuid> {
        let mut best: Option<&FileRecord> = None;

        for record in self.ids.iter().filter_map(|id| catalog.get(id)) {
            let better = match best {
                None => true,
                Some(current) => match policy {
                    KeepPolicy::Oldest => record.modified_at < current.modified_at,
                    KeepPolicy::Newest => record.modified_at > current.modified_at,
                },
            };
            if better {
                best = Some(record);
            }
        }

        best.map(|r| r.id)
    }

    /// Every id except the keeper, in discovery order
    pub fn redundant(&self, catalog: &Catalog, policy: KeepPolicy) -> Vec<Uuid> {
        let keeper = self.keeper(catalog, policy);
        self.ids
            .iter()
            .copied()
            .filter(|id| Some(*id) != keeper)
            .collect()
    }

    /// Bytes reclaimable by removing the redundant copies
    pub fn redundant_bytes(&self, catalog: &Catalog, policy: KeepPolicy) -> u64 {
        self.redundant(catalog, policy)
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|r| r.size)
            .sum()
    }
}

/// Incrementally maintained key → ids buckets.
///
/// Fed one record at a time while the catalog fills; single writer.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    criteria: MatchCriteria,
    buckets: HashMap<IdentityKey, Vec<Uuid>>,
    /// Keys in the order they were first seen
    first_seen: Vec<IdentityKey>,
}

impl DuplicateIndex {
    pub fn new(criteria: MatchCriteria) -> Self {
        Self {
            criteria,
            ..Default::default()
        }
    }

    /// Add a record.
    ///
    /// Returns the updated set when the record's key now has two or more
    /// members, so callers can report duplicates as they appear.
    pub fn observe(&mut self, record: &FileRecord) -> Option<DuplicateSet> {
        let key = IdentityKey::for_record(record, &self.criteria)?;

        let ids = match self.buckets.get_mut(&key) {
            Some(ids) => ids,
            None => {
                self.first_seen.push(key.clone());
                self.buckets.entry(key.clone()).or_default()
            }
        };
        ids.push(record.id);

        (ids.len() >= 2).then(|| DuplicateSet {
            key,
            ids: ids.clone(),
        })
    }

    /// Every key with two or more records, in first-seen order
    pub fn sets(&self) -> Vec<DuplicateSet> {
        self.first_seen
            .iter()
            .filter_map(|key| {
                let ids = self.buckets.get(key)?;
                (ids.len() >= 2).then(|| DuplicateSet {
                    key: key.clone(),
                    ids: ids.clone(),
                })
            })
            .collect()
    }
}

/// Group a whole catalog in one pass
pub fn group(catalog: &Catalog, criteria: &MatchCriteria) -> Vec<DuplicateSet> {
    let mut index = DuplicateIndex::new(*criteria);
    for record in catalog.iter() {
        index.observe(record);
    }
    index.sets()
}
