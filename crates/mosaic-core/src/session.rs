//! Mosaic session
//!
//! Owns the occupancy grid (through the allocator) and the image grid for
//! the lifetime of one mosaic, and runs rounds over them:
//!
//! ```text
//! grow ─→ round_budget ─→ allocate ─→ fetch page ─→ scan ─→ zip ─→ pipeline ─→ writer
//! ```
//!
//! The allocator is only reachable through `&mut self`, so coordinate
//! handout is sequential. Filling takes `&self`: workers never touch
//! occupancy, and each writes only the cell its task owns.

use crate::config::MosaicConfig;
use crate::error::MosaicError;
use crate::report::{RoundReport, RoundStats};
use crate::writer::GridWriter;
use mosaic_fetch::{scan_document, FetchPipeline, FetchTask, Fetcher, HttpFetcher, SearchTemplate};
use mosaic_grid::{
    GridCoordinate, GridDims, GridError, GrowthStep, ImageGrid, OccupancyGrid, SlotAllocator,
};
use std::sync::Arc;
use std::time::Instant;

/// One mosaic's grid state plus the machinery to fill it
#[derive(Debug)]
pub struct MosaicSession {
    /// Configuration fixed at start
    config: MosaicConfig,
    /// Results-page URL template
    template: SearchTemplate,
    /// Sole owner of the occupancy grid
    allocator: SlotAllocator,
    /// Cell images, shared with readers
    images: Arc<ImageGrid>,
    /// Applies outcomes to `images`
    writer: GridWriter,
    /// Image fetch worker pool
    pipeline: FetchPipeline,
    /// Growth steps taken
    rounds: u64,
}

impl MosaicSession {
    /// Start a session that fetches over HTTP
    ///
    /// # Errors
    /// - `MosaicError::Config` / `Template` / `Grid` for invalid settings
    /// - `MosaicError::Client` if the HTTP client cannot be built
    pub fn new(config: MosaicConfig) -> Result<Self, MosaicError> {
        let timeout = config.fetch_timeout().max(config.page_timeout());
        let fetcher = HttpFetcher::new(timeout, &config.user_agent)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Start a session over a custom fetcher
    ///
    /// # Errors
    /// - `MosaicError::Config` / `Template` / `Grid` for invalid settings
    pub fn with_fetcher(config: MosaicConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, MosaicError> {
        config.validate()?;
        let template = config.provider.template()?;

        let grid = OccupancyGrid::new(config.start_dims(), config.capacity())?;
        let mut allocator = SlotAllocator::new(grid).with_max_draws(config.max_draws_per_slot);
        if let Some(seed) = config.seed {
            allocator = allocator.with_seed(seed);
        }

        let images = Arc::new(ImageGrid::new(
            config.capacity(),
            config.cell_size,
            config.filler_value,
        ));
        if !allocator.capacity().fits_in(images.capacity()) {
            return Err(GridError::InvalidDimensions {
                start: allocator.capacity(),
                capacity: images.capacity(),
            }
            .into());
        }

        let pipeline = FetchPipeline::new(fetcher).with_settings(config.pipeline_settings());

        tracing::info!(
            "Mosaic session started: {} of {}, {} workers, provider {}",
            config.start_dims(),
            config.capacity(),
            config.workers,
            config.provider
        );

        Ok(Self {
            writer: GridWriter::new(Arc::clone(&images)),
            config,
            template,
            allocator,
            images,
            pipeline,
            rounds: 0,
        })
    }

    /// With explicit free-slot counter
    #[inline]
    #[must_use]
    pub fn with_free_slots(mut self, free_slots: usize) -> Self {
        self.allocator = self.allocator.with_free_slots(free_slots);
        self
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Results-page template in use
    #[inline]
    #[must_use]
    pub fn template(&self) -> &SearchTemplate {
        &self.template
    }

    /// Switch provider template between rounds
    #[inline]
    pub fn set_template(&mut self, template: SearchTemplate) {
        self.template = template;
    }

    /// Shared handle to the image grid for readers
    #[inline]
    #[must_use]
    pub fn images(&self) -> Arc<ImageGrid> {
        Arc::clone(&self.images)
    }

    /// Current logical extent
    #[inline]
    #[must_use]
    pub fn logical_dims(&self) -> GridDims {
        self.allocator.dims()
    }

    /// Allocator state (read-only)
    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &SlotAllocator {
        &self.allocator
    }

    /// Growth steps taken
    #[inline]
    #[must_use]
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Grow the logical extent for a new round
    ///
    /// # Errors
    /// - `MosaicError::Grid` with `CapacityExceeded` at capacity
    pub fn grow(&mut self) -> Result<GrowthStep, MosaicError> {
        let step = self.allocator.grow()?;
        self.rounds += 1;
        Ok(step)
    }

    /// Slots the current round should request
    #[inline]
    #[must_use]
    pub fn round_budget(&self) -> usize {
        self.allocator.round_budget()
    }

    /// Allocate up to `n` free coordinates
    ///
    /// # Errors
    /// - `MosaicError::Grid` with `Saturation` if sampling runs out of draws
    pub fn allocate(&mut self, n: usize) -> Result<Vec<GridCoordinate>, MosaicError> {
        Ok(self.allocator.allocate(n)?)
    }

    /// Fetch the results page for `token`
    ///
    /// Returns the page URL and its body text.
    ///
    /// # Errors
    /// - `MosaicError::PageFetch` on transport failure, timeout or non-success status
    pub async fn fetch_results_page(&self, token: &str) -> Result<(String, String), MosaicError> {
        let url = self.template.render(token);
        let fetcher = self.pipeline.fetcher();

        let response = tokio::time::timeout(self.config.page_timeout(), fetcher.fetch(&url))
            .await
            .map_err(|_| {
                MosaicError::page_fetch(
                    &url,
                    None,
                    format!("timed out after {}ms", self.config.page_timeout_ms),
                )
            })?
            .map_err(|e| MosaicError::page_fetch(&url, None, e.to_string()))?;

        if !response.is_success() {
            tracing::warn!("Results page {} returned status {}", url, response.status);
            return Err(MosaicError::page_fetch(
                &url,
                Some(response.status),
                format!("status {}", response.status),
            ));
        }

        Ok((url, response.text()))
    }

    /// Fill `coords` with images found for `token`
    ///
    /// Fetches the results page, then proceeds as [`fill_document`](Self::fill_document).
    ///
    /// # Errors
    /// - `MosaicError::PageFetch` if the results page cannot be fetched;
    ///   no cell is touched
    /// - `MosaicError::Grid` if a coordinate lies outside capacity
    pub async fn fill_round(
        &self,
        token: &str,
        coords: &[GridCoordinate],
    ) -> Result<RoundReport, MosaicError> {
        let (url, document) = self.fetch_results_page(token).await?;
        let mut report = self.fill_document(token, &document, coords).await?;
        report.page_url = Some(url);
        Ok(report)
    }

    /// Fill `coords` from an already-fetched results document
    ///
    /// URLs are paired with coordinates in order; outcomes are written as
    /// they complete. Per-task failures only show up in the report.
    ///
    /// # Errors
    /// - `MosaicError::Grid` if a coordinate lies outside capacity
    pub async fn fill_document(
        &self,
        token: &str,
        document: &str,
        coords: &[GridCoordinate],
    ) -> Result<RoundReport, MosaicError> {
        let capacity = self.images.capacity();
        if let Some(coord) = coords.iter().find(|c| !c.within(capacity)) {
            return Err(GridError::OutOfBounds {
                coord: *coord,
                capacity,
            }
            .into());
        }

        let start = Instant::now();
        let scan = scan_document(document);
        let urls_found = scan.urls.len();
        let tasks = FetchTask::zip(scan.urls, coords);
        let attempted = tasks.len();

        tracing::info!(
            "Round {} '{}': {} urls for {} slots",
            self.rounds,
            token,
            urls_found,
            coords.len()
        );

        let drained = self.writer.drain(self.pipeline.spawn(tasks)).await?;
        let stats = RoundStats {
            attempted,
            ..drained.stats
        };

        let report = RoundReport {
            round: self.rounds,
            token: token.to_string(),
            page_url: None,
            dims: self.logical_dims(),
            tags_seen: scan.tags,
            urls_found,
            slots_allocated: coords.len(),
            unused_slots: coords.len() - attempted,
            stats,
            populated: drained.populated,
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        tracing::info!("{}", report);
        Ok(report)
    }

    /// Run one full round for `token`: grow, allocate the budget, fill
    ///
    /// # Errors
    /// - `MosaicError::Grid` with `CapacityExceeded` at capacity
    /// - `MosaicError::Grid` with `Saturation`; the coordinates already
    ///   allocated are available from [`MosaicError::saturation_allocated`]
    /// - `MosaicError::PageFetch` if the results page cannot be fetched
    pub async fn advance_round(&mut self, token: &str) -> Result<RoundReport, MosaicError> {
        let step = self.grow()?;
        let budget = self.round_budget();
        let coords = self.allocate(budget)?;

        tracing::debug!(
            "Round {}: grid {}, budget {}, allocated {}",
            self.rounds,
            step.dims,
            budget,
            coords.len()
        );

        self.fill_round(token, &coords).await
    }
}
