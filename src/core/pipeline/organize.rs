//! Organize run: walk, filter, resolve, transfer. Strictly sequential.

use super::control::{CancellationToken, Progress};
use crate::core::fingerprint::Fingerprinter;
use crate::core::organize::{
    DestinationResolver, FilterDecision, FilterSet, OrganizeConfig, TransferEngine,
};
use crate::core::scanner::FileWalker;
use crate::error::{FileZenError, TransferError};
use crate::events::{null_sender, EventSender, Outcome, RunSummary, StatusLine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything an organize run produced
#[derive(Debug)]
pub struct OrganizeReport {
    /// One terminal line per file, in walker order
    pub statuses: Vec<StatusLine>,
    pub summary: RunSummary,
    pub cancelled: bool,
}

impl OrganizeReport {
    /// Lines with the given outcome
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &StatusLine> + '_ {
        self.statuses.iter().filter(move |s| s.outcome == outcome)
    }
}

/// Runs an organize operation
pub struct OrganizePipeline {
    config: OrganizeConfig,
    fingerprinter: Fingerprinter,
    progress: Arc<Progress>,
}

impl OrganizePipeline {
    pub fn new(config: OrganizeConfig) -> Self {
        Self {
            config,
            fingerprinter: Fingerprinter::new(),
            progress: Progress::new(),
        }
    }

    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn config(&self) -> &OrganizeConfig {
        &self.config
    }

    /// Shared handle to this pipeline's counter and clock
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// Run without events or cancellation
    pub fn run(&self) -> Result<OrganizeReport, FileZenError> {
        self.run_with_events(&CancellationToken::new(), &null_sender())
    }

    /// Run, reporting every file and honouring `token`.
    ///
    /// Missing roots or an unreadable source fail the run before any file
    /// is touched; everything after that is reported per file.
    pub fn run_with_events(
        &self,
        token: &CancellationToken,
        events: &EventSender,
    ) -> Result<OrganizeReport, FileZenError> {
        self.progress.begin();

        let (walker, destination) = match self.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                self.progress.finish();
                events.fail(&e);
                return Err(e);
            }
        };

        debug!(
            "Organizing {} into {}",
            walker.root().display(),
            destination.display()
        );

        let filters = FilterSet::from(&self.config.filters);
        let resolver = DestinationResolver::new(destination, self.config.grouping);
        let engine = TransferEngine::new(self.config.mode, self.config.overwrite)
            .with_fingerprinter(self.fingerprinter.clone());

        let mut statuses = Vec::new();
        let mut summary = RunSummary::default();
        let mut cancelled = false;

        for entry in walker {
            if token.is_cancelled() {
                cancelled = true;
                break;
            }

            let line = match entry {
                Ok(path) => self.organize_file(&path, &filters, &resolver, &engine),
                Err(e) => failed(e.path(), &e.to_string()),
            };

            summary.files_processed += 1;
            match line.outcome {
                Outcome::Skipped => summary.files_skipped += 1,
                Outcome::Failed => summary.errors += 1,
                outcome if outcome.wrote_file() => summary.files_written += 1,
                _ => {}
            }
            self.progress.tick();

            events.status(line.clone());
            statuses.push(line);
        }

        self.progress.finish();
        summary.duration_ms = self.progress.elapsed().as_millis() as u64;

        if cancelled {
            debug!("Organize cancelled after {} files", summary.files_processed);
        }
        events.finish(&summary, cancelled);

        Ok(OrganizeReport {
            statuses,
            summary,
            cancelled,
        })
    }

    fn prepare(&self) -> Result<(FileWalker, PathBuf), FileZenError> {
        let (source, destination) = self.config.roots()?;
        let walker = FileWalker::new(source, self.config.walk_options())?;
        Ok((walker, destination))
    }

    /// Filter, resolve and transfer one file into a terminal status line
    fn organize_file(
        &self,
        path: &Path,
        filters: &FilterSet,
        resolver: &DestinationResolver,
        engine: &TransferEngine,
    ) -> StatusLine {
        let size = match self.fingerprinter.size(path) {
            Ok(size) => size,
            Err(e) => return failed(path, &e.to_string()),
        };
        let date = self.fingerprinter.effective_creation_date(path);

        if let FilterDecision::Exclude(reason) = filters.evaluate(path, size, date) {
            debug!("Filtered out {}: {}", path.display(), reason);
            return StatusLine::new(
                path.to_path_buf(),
                Outcome::Skipped,
                format!("{}: skipped, {}", path.display(), reason),
            );
        }

        let result: Result<_, TransferError> = resolver
            .resolve(path, date)
            .and_then(|destination| engine.transfer(path, &destination));

        match result {
            Ok(outcome) => StatusLine::new(path.to_path_buf(), outcome.kind, outcome.message)
                .with_destination(outcome.destination),
            Err(e) => failed(path, &e.to_string()),
        }
    }
}

fn failed(path: &Path, message: &str) -> StatusLine {
    warn!("Failed {}: {}", path.display(), message);
    StatusLine::new(
        path.to_path_buf(),
        Outcome::Failed,
        format!("{}: {} ❌", path.display(), message),
    )
}
