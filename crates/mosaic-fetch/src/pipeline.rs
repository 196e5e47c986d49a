//! Fetch-and-decode pipeline
//!
//! A fixed pool of workers drains a shared task queue. Each worker runs one
//! task at a time: fetch (bounded by a timeout), then decode and resize on
//! the blocking pool. Outcomes are sent on a channel as soon as they exist,
//! so the consumer sees them in completion order. The channel closes once
//! every worker has run out of tasks, which is the round's end.

use crate::decode::decode_cell;
use crate::error::TaskError;
use crate::fetcher::Fetcher;
use mosaic_grid::{CellImage, GridCoordinate, DEFAULT_CELL_SIZE};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// One URL bound to its destination cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTask {
    /// Image URL
    pub url: String,
    /// Destination cell
    pub coord: GridCoordinate,
}

impl FetchTask {
    /// Create new task
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, coord: GridCoordinate) -> Self {
        Self {
            url: url.into(),
            coord,
        }
    }

    /// Pair URLs with coordinates in order; the shorter side bounds the count
    #[must_use]
    pub fn zip<I>(urls: I, coords: &[GridCoordinate]) -> Vec<Self>
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter()
            .zip(coords.iter().copied())
            .map(|(url, coord)| Self::new(url, coord))
            .collect()
    }
}

/// Result of one task
#[derive(Debug)]
pub enum TaskOutcome {
    /// Image ready for its cell
    Completed {
        /// Source URL
        url: String,
        /// Destination cell
        coord: GridCoordinate,
        /// Normalized image
        image: CellImage,
    },
    /// Task produced nothing; the destination stays untouched
    Dropped {
        /// The failed task
        task: FetchTask,
        /// Why it failed
        error: TaskError,
    },
}

impl TaskOutcome {
    /// Destination cell
    #[inline]
    #[must_use]
    pub fn coord(&self) -> GridCoordinate {
        match self {
            Self::Completed { coord, .. } => *coord,
            Self::Dropped { task, .. } => task.coord,
        }
    }

    /// Check if an image was produced
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Maximum concurrent tasks
    pub workers: usize,
    /// Bound on each fetch
    pub fetch_timeout: Duration,
    /// Output cell edge length
    pub cell_size: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: 8,
            fetch_timeout: Duration::from_secs(5),
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Bounded worker pool over a [`Fetcher`]
#[derive(Clone)]
pub struct FetchPipeline {
    /// Fetch seam
    fetcher: Arc<dyn Fetcher>,
    /// Tuning
    settings: PipelineSettings,
}

impl std::fmt::Debug for FetchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchPipeline")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FetchPipeline {
    /// Create pipeline with default settings
    #[inline]
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            settings: PipelineSettings::default(),
        }
    }

    /// With explicit settings (workers clamped to at least one)
    #[inline]
    #[must_use]
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = PipelineSettings {
            workers: settings.workers.max(1),
            ..settings
        };
        self
    }

    /// Current settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    /// Fetch seam shared with the workers
    #[inline]
    #[must_use]
    pub fn fetcher(&self) -> Arc<dyn Fetcher> {
        Arc::clone(&self.fetcher)
    }

    /// Start workers for `tasks`; outcomes arrive in completion order
    ///
    /// Spawns `min(workers, tasks.len())` workers on the current tokio
    /// runtime. The receiver yields `None` once every task has finished.
    #[must_use]
    pub fn spawn(&self, tasks: Vec<FetchTask>) -> mpsc::Receiver<TaskOutcome> {
        let workers = self.settings.workers.min(tasks.len());
        let (tx, rx) = mpsc::channel(self.settings.workers.max(1));

        tracing::debug!("Starting {} workers for {} tasks", workers, tasks.len());

        let queue = Arc::new(Mutex::new(VecDeque::from(tasks)));
        for id in 0..workers {
            tokio::spawn(worker_task(
                id,
                Arc::clone(&queue),
                Arc::clone(&self.fetcher),
                self.settings,
                tx.clone(),
            ));
        }

        rx
    }

    /// Run `tasks` to completion and collect outcomes in completion order
    pub async fn run(&self, tasks: Vec<FetchTask>) -> Vec<TaskOutcome> {
        let expected = tasks.len();
        let mut rx = self.spawn(tasks);
        let mut outcomes = Vec::with_capacity(expected);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Worker loop (runs in separate tokio task)
async fn worker_task(
    id: usize,
    queue: Arc<Mutex<VecDeque<FetchTask>>>,
    fetcher: Arc<dyn Fetcher>,
    settings: PipelineSettings,
    tx: mpsc::Sender<TaskOutcome>,
) {
    loop {
        let next = queue.lock().pop_front();
        let Some(task) = next else { break };

        let outcome = process_task(task, fetcher.as_ref(), settings).await;
        if tx.send(outcome).await.is_err() {
            tracing::debug!("Worker {} stopping: outcome receiver dropped", id);
            break;
        }
    }
}

/// Fetch, decode and resize one task
async fn process_task(
    task: FetchTask,
    fetcher: &dyn Fetcher,
    settings: PipelineSettings,
) -> TaskOutcome {
    match fetch_cell(&task.url, fetcher, settings).await {
        Ok(image) => {
            tracing::debug!("Fetched {} for cell {}", task.url, task.coord);
            TaskOutcome::Completed {
                url: task.url,
                coord: task.coord,
                image,
            }
        }
        Err(error) => {
            tracing::debug!("Dropped {} for cell {}: {}", task.url, task.coord, error);
            TaskOutcome::Dropped { task, error }
        }
    }
}

async fn fetch_cell(
    url: &str,
    fetcher: &dyn Fetcher,
    settings: PipelineSettings,
) -> Result<CellImage, TaskError> {
    let response = tokio::time::timeout(settings.fetch_timeout, fetcher.fetch(url))
        .await
        .map_err(|_| TaskError::Timeout {
            timeout_ms: u64::try_from(settings.fetch_timeout.as_millis()).unwrap_or(u64::MAX),
        })??;

    if !response.is_success() {
        return Err(TaskError::Status {
            status: response.status,
        });
    }

    let cell_size = settings.cell_size;
    tokio::task::spawn_blocking(move || decode_cell(&response.body, cell_size))
        .await
        .map_err(|e| TaskError::Worker(e.to_string()))?
}
