//! Slot allocator
//!
//! Grows the logical extent once per round and hands out collision-free
//! coordinates by rejection sampling over the current extent.
//!
//! # Free-slot accounting
//!
//! The free-slot counter is not the number of truly free cells. Each growth
//! step credits only the newly exposed border (`width + height - 1`), not the
//! full enlarged rectangle, which throttles how much a single round may
//! request. The sampler itself checks real occupancy, so a stale counter can
//! only cause a short result or a [`GridError::Saturation`], never a
//! duplicate.

use crate::coord::{GridCoordinate, GridDims};
use crate::error::GridError;
use crate::occupancy::OccupancyGrid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Default bound on resampling per requested slot
pub const DEFAULT_MAX_DRAWS_PER_SLOT: usize = 10_000;

/// Outcome of a single growth step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthStep {
    /// Logical extent after growing
    pub dims: GridDims,
    /// Slots credited by this step
    pub credited: usize,
    /// Free-slot counter after crediting
    pub free_slots: usize,
}

/// Single owner of the occupancy grid
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    /// Occupancy markers
    grid: OccupancyGrid,
    /// Slots the allocator believes are free
    free_slots: usize,
    /// Resampling bound per slot
    max_draws_per_slot: usize,
    /// Coordinate source
    rng: StdRng,
}

impl SlotAllocator {
    /// Create allocator over `grid`
    ///
    /// The counter starts at `width + height - 1` of the starting extent.
    #[must_use]
    pub fn new(grid: OccupancyGrid) -> Self {
        let free_slots = grid.width() + grid.height() - 1;
        Self {
            grid,
            free_slots,
            max_draws_per_slot: DEFAULT_MAX_DRAWS_PER_SLOT,
            rng: StdRng::from_os_rng(),
        }
    }

    /// With explicit free-slot counter
    #[inline]
    #[must_use]
    pub fn with_free_slots(mut self, free_slots: usize) -> Self {
        self.free_slots = free_slots;
        self
    }

    /// With deterministic coordinate source
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// With resampling bound (clamped to at least one draw)
    #[inline]
    #[must_use]
    pub fn with_max_draws(mut self, max_draws_per_slot: usize) -> Self {
        self.max_draws_per_slot = max_draws_per_slot.max(1);
        self
    }

    /// Free-slot counter
    #[inline]
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.free_slots
    }

    /// Current logical extent
    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.grid.dims()
    }

    /// Maximum extent
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> GridDims {
        self.grid.capacity()
    }

    /// Read-only view of the occupancy grid
    #[inline]
    #[must_use]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Grow the logical extent by one row and one column
    ///
    /// Credits `new_width + new_height - 1` free slots.
    ///
    /// # Errors
    /// - `GridError::CapacityExceeded` if the capacity is already reached;
    ///   the grid and counter are left unchanged
    pub fn grow(&mut self) -> Result<GrowthStep, GridError> {
        let dims = self.grid.grow_by_one()?;
        let credited = dims.width + dims.height - 1;
        self.free_slots += credited;

        tracing::debug!(
            "Grew grid to {} (+{} slots, {} free)",
            dims,
            credited,
            self.free_slots
        );

        Ok(GrowthStep {
            dims,
            credited,
            free_slots: self.free_slots,
        })
    }

    /// Slots a round should request after growing
    ///
    /// `max(0, trunc(free_slots - width * height / 2))`
    #[must_use]
    pub fn round_budget(&self) -> usize {
        (2 * self.free_slots).saturating_sub(self.grid.dims().area()) / 2
    }

    /// Allocate up to `n` distinct free coordinates
    ///
    /// Returns fewer than `n` when the free-slot counter runs out. Each
    /// returned cell is marked occupied before the next draw.
    ///
    /// # Errors
    /// - `GridError::Saturation` if no free cell is found within the draw
    ///   bound; the error carries the coordinates already allocated
    pub fn allocate(&mut self, n: usize) -> Result<Vec<GridCoordinate>, GridError> {
        let mut coords = Vec::with_capacity(n.min(self.free_slots));

        while coords.len() < n {
            if self.free_slots == 0 {
                tracing::debug!("Free slots exhausted after {} of {}", coords.len(), n);
                break;
            }

            let Some(coord) = self.draw_free() else {
                tracing::warn!(
                    "Allocator saturated: {} of {} slots, counter {}, extent {}",
                    coords.len(),
                    n,
                    self.free_slots,
                    self.grid.dims()
                );
                return Err(GridError::Saturation {
                    requested: n,
                    allocated: coords,
                    draws: self.max_draws_per_slot,
                });
            };

            self.grid.mark(coord)?;
            coords.push(coord);
            self.free_slots -= 1;
        }

        Ok(coords)
    }

    /// Rejection-sample one unoccupied cell of the logical extent
    fn draw_free(&mut self) -> Option<GridCoordinate> {
        let dims = self.grid.dims();
        for _ in 0..self.max_draws_per_slot {
            let coord = GridCoordinate::new(
                self.rng.random_range(0..dims.height),
                self.rng.random_range(0..dims.width),
            );
            if !self.grid.is_occupied(coord) {
                return Some(coord);
            }
        }
        None
    }
}
