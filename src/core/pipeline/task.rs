//! A scan or organize run as a cancellable background unit of work.

use super::control::{CancellationToken, Progress};
use super::organize::{OrganizePipeline, OrganizeReport};
use super::scan::{ScanConfig, ScanPipeline, ScanReport};
use crate::core::organize::OrganizeConfig;
use crate::error::{ConfigError, FileZenError};
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Lifecycle of a task. `Completed`, `Cancelled` and `Failed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Cancelled | TaskState::Failed
        )
    }
}

/// Result of a finished task
#[derive(Debug)]
pub enum TaskReport {
    Scan(ScanReport),
    Organize(OrganizeReport),
}

impl TaskReport {
    pub fn cancelled(&self) -> bool {
        match self {
            TaskReport::Scan(report) => report.cancelled,
            TaskReport::Organize(report) => report.cancelled,
        }
    }
}

enum Job {
    Scan(ScanPipeline),
    Organize(OrganizePipeline),
}

impl Job {
    fn progress(&self) -> Arc<Progress> {
        match self {
            Job::Scan(pipeline) => pipeline.progress(),
            Job::Organize(pipeline) => pipeline.progress(),
        }
    }

    fn run(
        &self,
        token: &CancellationToken,
        events: &EventSender,
    ) -> Result<TaskReport, FileZenError> {
        match self {
            Job::Scan(pipeline) => pipeline
                .run_with_events(token, events)
                .map(TaskReport::Scan),
            Job::Organize(pipeline) => pipeline
                .run_with_events(token, events)
                .map(TaskReport::Organize),
        }
    }
}

/// Runs one pipeline on a background thread.
///
/// A task runs at most once; start a new task for a new run.
pub struct Task {
    job: Option<Job>,
    state: Arc<Mutex<TaskState>>,
    token: CancellationToken,
    progress: Arc<Progress>,
    handle: Option<JoinHandle<Result<TaskReport, FileZenError>>>,
}

impl Task {
    /// Create a scan task; fails if no root is configured
    pub fn scan(config: ScanConfig) -> Result<Self, ConfigError> {
        config.root()?;
        Ok(Self::with_job(Job::Scan(ScanPipeline::new(config))))
    }

    /// Create an organize task; fails if either root is missing
    pub fn organize(config: OrganizeConfig) -> Result<Self, ConfigError> {
        config.roots()?;
        Ok(Self::with_job(Job::Organize(OrganizePipeline::new(config))))
    }

    fn with_job(job: Job) -> Self {
        Self {
            progress: job.progress(),
            job: Some(job),
            state: Arc::new(Mutex::new(TaskState::Idle)),
            token: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(TaskState::Failed)
    }

    /// Start the run in the background.
    ///
    /// Returns false without doing anything unless the task is `Idle`.
    pub fn start(&mut self, events: EventSender) -> bool {
        {
            let Ok(mut state) = self.state.lock() else {
                return false;
            };
            if *state != TaskState::Idle {
                debug!("Ignoring start while {:?}", *state);
                return false;
            }
            *state = TaskState::Running;
        }

        let Some(job) = self.job.take() else {
            return false;
        };

        let state = Arc::clone(&self.state);
        let token = self.token.clone();

        self.handle = Some(thread::spawn(move || {
            let result = job.run(&token, &events);

            let finished = match &result {
                Ok(report) if report.cancelled() => TaskState::Cancelled,
                Ok(_) => TaskState::Completed,
                Err(_) => TaskState::Failed,
            };
            debug!("Task finished: {:?}", finished);
            if let Ok(mut state) = state.lock() {
                *state = finished;
            }

            result
        }));

        true
    }

    /// Ask a running task to stop after the file in flight.
    ///
    /// Returns false if the task is not running.
    pub fn cancel(&self) -> bool {
        if self.state() != TaskState::Running {
            return false;
        }
        self.token.cancel();
        true
    }

    /// Files given a terminal status so far
    pub fn processed(&self) -> usize {
        self.progress.processed()
    }

    pub fn elapsed(&self) -> Duration {
        self.progress.elapsed()
    }

    /// Block until the run ends and take its report
    pub fn wait(&mut self) -> Result<TaskReport, FileZenError> {
        let handle = self.handle.take().ok_or(FileZenError::NotStarted)?;
        handle.join().map_err(|_| FileZenError::TaskPanicked)?
    }
}
