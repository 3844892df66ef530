//! Duplicate scan: walk, fingerprint, catalog, group.

use super::control::{CancellationToken, Progress};
use crate::core::catalog::{Catalog, FileRecord};
use crate::core::fingerprint::Fingerprinter;
use crate::core::grouping::{
    write_delete_script, DuplicateIndex, DuplicateSet, KeepPolicy, MatchCriteria,
};
use crate::core::scanner::{FileWalker, WalkOptions};
use crate::error::{ConfigError, FileZenError, FingerprintError};
use crate::events::{null_sender, Event, EventSender, Outcome, RunSummary, StatusLine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of files fingerprinted together
pub const DEFAULT_FINGERPRINT_BATCH: usize = 64;

/// Configuration for a duplicate scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub root: Option<PathBuf>,
    pub recurse: bool,
    pub include_hidden: bool,
    pub use_checksum: bool,
    pub use_file_name: bool,
    pub use_file_size: bool,
    /// Produce a shell script removing redundant copies
    pub create_delete_script: bool,
    /// Make the script's `rm` lines live instead of commented out
    pub delete_files: bool,
    pub keep: KeepPolicy,
    /// Files pulled from the walker and fingerprinted in parallel at once
    pub fingerprint_batch: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: None,
            recurse: true,
            include_hidden: false,
            use_checksum: true,
            use_file_name: false,
            use_file_size: false,
            create_delete_script: false,
            delete_files: false,
            keep: KeepPolicy::Oldest,
            fingerprint_batch: DEFAULT_FINGERPRINT_BATCH,
        }
    }
}

impl ScanConfig {
    pub fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            checksum: self.use_checksum,
            name: self.use_file_name,
            size: self.use_file_size,
        }
    }

    pub fn root(&self) -> Result<PathBuf, ConfigError> {
        self.root.clone().ok_or(ConfigError::MissingSource)
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            recurse: self.recurse,
            include_hidden: self.include_hidden,
            follow_links: false,
        }
    }
}

/// Everything a scan produced
#[derive(Debug)]
pub struct ScanReport {
    pub catalog: Catalog,
    pub sets: Vec<DuplicateSet>,
    /// Present when a delete script was requested
    pub delete_script: Option<String>,
    pub summary: RunSummary,
    pub cancelled: bool,
}

/// Outcome of fingerprinting one walked entry
enum Visit {
    Recorded(FileRecord, Option<FingerprintError>),
    Failed(PathBuf, String),
}

/// Runs a duplicate scan
pub struct ScanPipeline {
    config: ScanConfig,
    fingerprinter: Fingerprinter,
    progress: Arc<Progress>,
}

impl ScanPipeline {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            fingerprinter: Fingerprinter::new(),
            progress: Progress::new(),
        }
    }

    /// Use a specific fingerprinter (e.g. a different chunk size)
    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Shared handle to this pipeline's counter and clock
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// Run without events or cancellation
    pub fn run(&self) -> Result<ScanReport, FileZenError> {
        self.run_with_events(&CancellationToken::new(), &null_sender())
    }

    /// Run, reporting every file and honouring `token`.
    ///
    /// Only a missing or unreadable root fails the run; per-file problems
    /// become `Failed` status lines.
    pub fn run_with_events(
        &self,
        token: &CancellationToken,
        events: &EventSender,
    ) -> Result<ScanReport, FileZenError> {
        self.progress.begin();

        let walker = match self
            .config
            .root()
            .map_err(FileZenError::from)
            .and_then(|root| Ok(FileWalker::new(root, self.config.walk_options())?))
        {
            Ok(walker) => walker,
            Err(e) => {
                self.progress.finish();
                events.fail(&e);
                return Err(e);
            }
        };

        debug!("Scanning {}", walker.root().display());

        let criteria = self.config.criteria();
        let batch_size = self.config.fingerprint_batch.max(1);
        let mut walker = walker;
        let mut catalog = Catalog::new();
        let mut index = DuplicateIndex::new(criteria);
        let mut summary = RunSummary::default();
        let mut cancelled = false;
        let mut exhausted = false;

        while !cancelled && !exhausted {
            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size {
                if token.is_cancelled() {
                    cancelled = true;
                    break;
                }
                match walker.next() {
                    Some(entry) => batch.push(entry),
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }

            // indexed collect keeps walker order
            let visits: Vec<Visit> = batch
                .into_par_iter()
                .map(|entry| match entry {
                    Ok(path) => self.visit(path),
                    Err(e) => Visit::Failed(e.path().clone(), e.to_string()),
                })
                .collect();

            for visit in visits {
                self.record_visit(visit, &mut catalog, &mut index, &mut summary, events);
            }
        }

        let sets = index.sets();
        summary.duplicate_sets = sets.len();

        let delete_script = if self.config.create_delete_script {
            let mut buffer = Vec::new();
            write_delete_script(
                &sets,
                &catalog,
                self.config.keep,
                self.config.delete_files,
                &mut buffer,
            )
            .map_err(|source| FileZenError::Write {
                path: PathBuf::from("<delete script>"),
                source,
            })?;
            Some(String::from_utf8_lossy(&buffer).into_owned())
        } else {
            None
        };

        self.progress.finish();
        summary.duration_ms = self.progress.elapsed().as_millis() as u64;

        if cancelled {
            debug!("Scan cancelled after {} files", summary.files_processed);
        }
        events.finish(&summary, cancelled);

        Ok(ScanReport {
            catalog,
            sets,
            delete_script,
            summary,
            cancelled,
        })
    }

    fn visit(&self, path: PathBuf) -> Visit {
        let result = if self.config.use_checksum {
            self.fingerprinter.record_with_checksum(&path)
        } else {
            self.fingerprinter.record(&path).map(|record| (record, None))
        };

        match result {
            Ok((record, checksum_error)) => Visit::Recorded(record, checksum_error),
            Err(e) => Visit::Failed(path, e.to_string()),
        }
    }

    fn record_visit(
        &self,
        visit: Visit,
        catalog: &mut Catalog,
        index: &mut DuplicateIndex,
        summary: &mut RunSummary,
        events: &EventSender,
    ) {
        summary.files_processed += 1;
        self.progress.tick();

        match visit {
            Visit::Recorded(record, checksum_error) => {
                let path = record.path.clone();

                if let Some(set) = index.observe(&record) {
                    events.send(Event::DuplicateFound {
                        key: set.key.to_string(),
                        count: set.len(),
                    });
                }
                if events.is_connected() {
                    events.send(Event::FileProcessed(record.clone()));
                }
                catalog.insert(record);

                let line = match checksum_error {
                    None => StatusLine::new(
                        path.clone(),
                        Outcome::Catalogued,
                        format!("{} ✓", path.display()),
                    ),
                    Some(e) => {
                        warn!("Checksum failed for {}: {}", path.display(), e);
                        summary.errors += 1;
                        StatusLine::new(
                            path.clone(),
                            Outcome::Failed,
                            format!("{}: {} ❌", path.display(), e),
                        )
                    }
                };
                events.status(line);
            }
            Visit::Failed(path, message) => {
                warn!("Skipping {}: {}", path.display(), message);
                summary.errors += 1;
                events.status(StatusLine::new(
                    path.clone(),
                    Outcome::Failed,
                    format!("{}: {} ❌", path.display(), message),
                ));
            }
        }
    }
}
