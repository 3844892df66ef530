//! # Catalog Module
//!
//! Accumulates one [`FileRecord`] per visited file during a scan, with
//! secondary indices by size, by name and by checksum.
//!
//! Every index maps a key to record ids in discovery order. The catalog
//! itself never deduplicates: that is the grouping engine's job.

mod record;

pub use record::{file_uri, FileRecord};

use crate::error::CatalogError;
use std::collections::HashMap;
use uuid::Uuid;

/// All records of one scan run
#[derive(Debug, Default)]
pub struct Catalog {
    records: HashMap<Uuid, FileRecord>,
    /// Ids in discovery order
    order: Vec<Uuid>,
    positions: HashMap<Uuid, usize>,
    by_size: HashMap<u64, Vec<Uuid>>,
    by_name: HashMap<String, Vec<Uuid>>,
    by_checksum: HashMap<String, Vec<Uuid>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record and index it.
    ///
    /// Records with an unknown checksum are left out of the checksum index.
    pub fn insert(&mut self, record: FileRecord) {
        let id = record.id;

        self.by_size.entry(record.size).or_default().push(id);
        self.by_name.entry(record.name.clone()).or_default().push(id);
        if let Some(hex) = record.checksum.as_computed() {
            self.by_checksum.entry(hex.to_string()).or_default().push(id);
        }

        self.positions.insert(id, self.order.len());
        self.order.push(id);
        self.records.insert(id, record);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&FileRecord> {
        self.records.get(id)
    }

    /// Discovery index of a record (0 = first found)
    pub fn position(&self, id: &Uuid) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Records in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.order.iter().filter_map(move |id| self.records.get(id))
    }

    /// Records most-recent-first, the order a live list shows them
    pub fn newest_first(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.order.iter().rev().filter_map(move |id| self.records.get(id))
    }

    /// The most recently discovered record
    pub fn current(&self) -> Result<&FileRecord, CatalogError> {
        self.order
            .last()
            .and_then(|id| self.records.get(id))
            .ok_or(CatalogError::NoCurrentRecord)
    }

    pub fn ids_with_size(&self, size: u64) -> &[Uuid] {
        self.by_size.get(&size).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids_with_name(&self, name: &str) -> &[Uuid] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids_with_checksum(&self, checksum: &str) -> &[Uuid] {
        self.by_checksum.get(checksum).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total bytes across all records
    pub fn total_size(&self) -> u64 {
        self.records.values().map(|r| r.size).sum()
    }
}
