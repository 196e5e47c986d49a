//! Occupancy grid
//!
//! Tracks which cells have been handed out. Storage is allocated once at
//! capacity; only the logical extent moves, and it only moves outward.

use crate::coord::{GridCoordinate, GridDims};
use crate::error::GridError;

/// Occupancy markers over a capacity-sized backing store
///
/// Mutation is crate-private: the [`SlotAllocator`](crate::SlotAllocator)
/// is the single writer.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    /// Fixed maximum extent
    capacity: GridDims,
    /// Current logical extent
    dims: GridDims,
    /// Row-major markers over `capacity`
    occupied: Vec<bool>,
    /// Number of set markers
    occupied_count: usize,
}

impl OccupancyGrid {
    /// Create grid with a starting logical extent
    ///
    /// # Errors
    /// - `GridError::InvalidDimensions` if `start` is empty or exceeds `capacity`
    pub fn new(start: GridDims, capacity: GridDims) -> Result<Self, GridError> {
        if start.area() == 0 || !start.fits_in(capacity) {
            return Err(GridError::InvalidDimensions { start, capacity });
        }

        Ok(Self {
            capacity,
            dims: start,
            occupied: vec![false; capacity.area()],
            occupied_count: 0,
        })
    }

    /// Current logical width
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.dims.width
    }

    /// Current logical height
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.dims.height
    }

    /// Current logical extent
    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Maximum extent
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> GridDims {
        self.capacity
    }

    /// Check if a cell is occupied (out-of-capacity cells read as free)
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, coord: GridCoordinate) -> bool {
        self.capacity
            .index_of(coord)
            .is_some_and(|idx| self.occupied[idx])
    }

    /// Number of occupied cells
    #[inline]
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied_count
    }

    /// Number of unoccupied cells inside the logical extent
    #[must_use]
    pub fn true_free_count(&self) -> usize {
        self.dims
            .coordinates()
            .filter(|c| !self.is_occupied(*c))
            .count()
    }

    /// Iterate occupied coordinates in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.capacity
            .coordinates()
            .filter(move |c| self.is_occupied(*c))
    }

    /// Extend the logical extent by one row and one column
    pub(crate) fn grow_by_one(&mut self) -> Result<GridDims, GridError> {
        let next = GridDims::new(self.dims.width + 1, self.dims.height + 1);
        if !next.fits_in(self.capacity) {
            return Err(GridError::CapacityExceeded {
                current: self.dims,
                capacity: self.capacity,
            });
        }
        self.dims = next;
        Ok(next)
    }

    /// Mark a cell occupied; returns false if it already was
    pub(crate) fn mark(&mut self, coord: GridCoordinate) -> Result<bool, GridError> {
        let idx = self.capacity.index_of(coord).ok_or(GridError::OutOfBounds {
            coord,
            capacity: self.capacity,
        })?;

        if self.occupied[idx] {
            return Ok(false);
        }
        self.occupied[idx] = true;
        self.occupied_count += 1;
        Ok(true)
    }
}
