//! Cancellation and progress shared between a running task and its owner.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Cooperative cancellation flag.
///
/// Cloning shares the flag. Runs check it once per walked entry; the file
/// in flight always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct Timing {
    started: Option<Instant>,
    stopped: Option<Duration>,
}

/// Processed-file counter and run clock, readable from any thread
#[derive(Debug, Default)]
pub struct Progress {
    processed: AtomicUsize,
    timing: Mutex<Timing>,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reset the counter and start the clock
    pub(crate) fn begin(&self) {
        self.processed.store(0, Ordering::SeqCst);
        if let Ok(mut timing) = self.timing.lock() {
            timing.started = Some(Instant::now());
            timing.stopped = None;
        }
    }

    /// Count one file with a terminal status
    pub(crate) fn tick(&self) -> usize {
        self.processed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Stop the clock
    pub(crate) fn finish(&self) {
        if let Ok(mut timing) = self.timing.lock() {
            if let Some(started) = timing.started {
                timing.stopped.get_or_insert(started.elapsed());
            }
        }
    }

    /// Files processed so far; never decreases during a run
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Time since the run started, frozen once it ends
    pub fn elapsed(&self) -> Duration {
        match self.timing.lock() {
            Ok(timing) => match (timing.started, timing.stopped) {
                (_, Some(stopped)) => stopped,
                (Some(started), None) => started.elapsed(),
                (None, None) => Duration::ZERO,
            },
            Err(_) => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn progress_counts_and_freezes() {
        let progress = Progress::new();
        assert_eq!(progress.elapsed(), Duration::ZERO);

        progress.begin();
        assert_eq!(progress.tick(), 1);
        assert_eq!(progress.tick(), 2);
        progress.finish();

        let frozen = progress.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(progress.elapsed(), frozen);
        assert_eq!(progress.processed(), 2);
    }
}
