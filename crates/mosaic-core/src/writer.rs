//! Grid writer
//!
//! Applies pipeline outcomes to the image grid as they arrive. Destinations
//! within a round are disjoint, so writes need no coordination beyond the
//! per-cell swap the grid already does.

use crate::report::RoundStats;
use mosaic_fetch::TaskOutcome;
use mosaic_grid::{GridCoordinate, GridError, ImageGrid};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Cells populated by one drained round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainResult {
    /// Outcome tallies
    pub stats: RoundStats,
    /// Cells written, in write order
    pub populated: Vec<GridCoordinate>,
}

/// Writes completed outcomes into an [`ImageGrid`]
#[derive(Debug, Clone)]
pub struct GridWriter {
    grid: Arc<ImageGrid>,
}

impl GridWriter {
    /// Create writer over `grid`
    #[inline]
    #[must_use]
    pub fn new(grid: Arc<ImageGrid>) -> Self {
        Self { grid }
    }

    /// Apply one outcome; returns the written cell for completed outcomes
    ///
    /// # Errors
    /// - `GridError` if the image does not fit the grid
    pub fn apply(&self, outcome: TaskOutcome) -> Result<Option<GridCoordinate>, GridError> {
        match outcome {
            TaskOutcome::Completed { coord, image, .. } => {
                self.grid.write(coord, image)?;
                Ok(Some(coord))
            }
            TaskOutcome::Dropped { .. } => Ok(None),
        }
    }

    /// Apply outcomes until the pipeline closes the channel
    ///
    /// Every outcome is consumed even if a write fails; the first write
    /// error is returned after draining.
    ///
    /// # Errors
    /// - the first `GridError` raised by [`apply`](Self::apply)
    pub async fn drain(&self, mut rx: mpsc::Receiver<TaskOutcome>) -> Result<DrainResult, GridError> {
        let mut result = DrainResult::default();
        let mut first_error = None;

        while let Some(outcome) = rx.recv().await {
            result.stats.record(&outcome);
            match self.apply(outcome) {
                Ok(Some(coord)) => result.populated.push(coord),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Cell write failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use mosaic_fetch::{FetchTask, TaskError};
    use mosaic_grid::GridDims;

    fn grid() -> Arc<ImageGrid> {
        Arc::new(ImageGrid::new(GridDims::new(3, 3), 4, 127))
    }

    fn completed(row: usize, col: usize, v: u8) -> TaskOutcome {
        TaskOutcome::Completed {
            url: format!("http://img/{row}/{col}"),
            coord: GridCoordinate::new(row, col),
            image: RgbImage::from_pixel(4, 4, Rgb([v, v, v])),
        }
    }

    #[test]
    fn apply_writes_completed_only() {
        let grid = grid();
        let writer = GridWriter::new(Arc::clone(&grid));

        assert_eq!(
            writer.apply(completed(1, 2, 5)).unwrap(),
            Some(GridCoordinate::new(1, 2))
        );
        let dropped = TaskOutcome::Dropped {
            task: FetchTask::new("http://x", GridCoordinate::new(0, 0)),
            error: TaskError::Status { status: 404 },
        };
        assert_eq!(writer.apply(dropped).unwrap(), None);

        assert!(!grid.is_filler(GridCoordinate::new(1, 2)));
        assert!(grid.is_filler(GridCoordinate::new(0, 0)));
    }

    #[tokio::test]
    async fn drain_tallies_and_continues_past_errors() {
        let grid = grid();
        let writer = GridWriter::new(Arc::clone(&grid));
        let (tx, rx) = mpsc::channel(8);

        tx.send(completed(0, 0, 1)).await.unwrap();
        tx.send(completed(9, 9, 1)).await.unwrap();
        tx.send(completed(2, 2, 1)).await.unwrap();
        drop(tx);

        let err = writer.drain(rx).await.unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { .. }));
        assert!(!grid.is_filler(GridCoordinate::new(2, 2)));
    }

    #[tokio::test]
    async fn drain_reports_populated_cells() {
        let writer = GridWriter::new(grid());
        let (tx, rx) = mpsc::channel(8);

        tx.send(completed(0, 1, 1)).await.unwrap();
        tx.send(TaskOutcome::Dropped {
            task: FetchTask::new("http://bad", GridCoordinate::new(1, 1)),
            error: TaskError::Decode("truncated".into()),
        })
        .await
        .unwrap();
        drop(tx);

        let result = writer.drain(rx).await.unwrap();
        assert_eq!(result.populated, vec![GridCoordinate::new(0, 1)]);
        assert_eq!(result.stats.succeeded, 1);
        assert_eq!(result.stats.dropped, 1);
        assert_eq!(result.stats.decode_failures, 1);
    }
}
