//! Round reports
//!
//! Per-task failures are silent to the round, so these counts are the only
//! record of how much a round actually yielded.

use mosaic_fetch::TaskOutcome;
use mosaic_grid::{GridCoordinate, GridDims};
use serde::Serialize;

/// Outcome tallies for one round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    /// Tasks submitted to the pipeline
    pub attempted: usize,
    /// Tasks that produced an image
    pub succeeded: usize,
    /// Tasks that produced nothing
    pub dropped: usize,
    /// Drops in the fetch stage (status, transport, timeout)
    pub fetch_failures: usize,
    /// Drops in the decode stage
    pub decode_failures: usize,
}

impl RoundStats {
    /// Count one outcome
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Completed { .. } => self.succeeded += 1,
            TaskOutcome::Dropped { error, .. } => {
                self.dropped += 1;
                if error.is_fetch() {
                    self.fetch_failures += 1;
                } else if error.is_decode() {
                    self.decode_failures += 1;
                }
            }
        }
    }

    /// Fraction of attempted tasks that succeeded
    #[must_use]
    pub fn yield_ratio(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.succeeded as f64 / self.attempted as f64;
        ratio
    }
}

/// Everything observable about one filled round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// Growth steps taken so far in the session
    pub round: u64,
    /// Query token
    pub token: String,
    /// Results-page URL, if the session fetched it
    pub page_url: Option<String>,
    /// Logical extent at fill time
    pub dims: GridDims,
    /// Image tags seen in the document
    pub tags_seen: usize,
    /// Eligible URLs extracted
    pub urls_found: usize,
    /// Coordinates supplied for the round
    pub slots_allocated: usize,
    /// Coordinates left without a URL (still occupied)
    pub unused_slots: usize,
    /// Task tallies
    pub stats: RoundStats,
    /// Cells written, in completion order
    pub populated: Vec<GridCoordinate>,
    /// Wall time for scan + pipeline
    pub elapsed_ms: u64,
}

impl RoundReport {
    /// Render as JSON
    ///
    /// # Errors
    /// - `serde_json::Error` if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for RoundReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "round {} '{}' on {}: {} urls, {} slots, {}/{} cells filled ({} fetch, {} decode failures, {} unused) in {}ms",
            self.round,
            self.token,
            self.dims,
            self.urls_found,
            self.slots_allocated,
            self.stats.succeeded,
            self.stats.attempted,
            self.stats.fetch_failures,
            self.stats.decode_failures,
            self.unused_slots,
            self.elapsed_ms
        )
    }
}
