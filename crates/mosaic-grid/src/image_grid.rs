//! Cell image store
//!
//! A capacity-sized array of fixed-size RGB cell images. Each cell is
//! replaced wholesale by swapping an `Arc`, so a reader sees either the old
//! or the new raster, never a partial one.

use crate::coord::{GridCoordinate, GridDims};
use crate::error::GridError;
use image::{Rgb, RgbImage};
use parking_lot::RwLock;
use std::sync::Arc;

/// Image held by one cell (canonical RGB channel order)
pub type CellImage = RgbImage;

/// Default cell edge length in pixels
pub const DEFAULT_CELL_SIZE: u32 = 100;

/// Default gray level of unwritten cells
pub const DEFAULT_FILLER_VALUE: u8 = 127;

/// Capacity-sized store of cell images
#[derive(Debug)]
pub struct ImageGrid {
    /// Fixed extent
    capacity: GridDims,
    /// Cell edge length
    cell_size: u32,
    /// Shared placeholder for unwritten cells
    filler: Arc<CellImage>,
    /// Row-major cells
    cells: Vec<RwLock<Arc<CellImage>>>,
}

impl ImageGrid {
    /// Create store with every cell set to a uniform gray filler
    #[must_use]
    pub fn new(capacity: GridDims, cell_size: u32, filler_value: u8) -> Self {
        let filler = Arc::new(RgbImage::from_pixel(
            cell_size,
            cell_size,
            Rgb([filler_value; 3]),
        ));
        let cells = (0..capacity.area())
            .map(|_| RwLock::new(Arc::clone(&filler)))
            .collect();

        Self {
            capacity,
            cell_size,
            filler,
            cells,
        }
    }

    /// Create store with default cell size and filler
    #[inline]
    #[must_use]
    pub fn with_defaults(capacity: GridDims) -> Self {
        Self::new(capacity, DEFAULT_CELL_SIZE, DEFAULT_FILLER_VALUE)
    }

    /// Fixed extent
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> GridDims {
        self.capacity
    }

    /// Cell edge length in pixels
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Snapshot of one cell
    #[must_use]
    pub fn cell(&self, coord: GridCoordinate) -> Option<Arc<CellImage>> {
        self.capacity
            .index_of(coord)
            .map(|idx| Arc::clone(&*self.cells[idx].read()))
    }

    /// Check if a cell still holds the filler
    #[must_use]
    pub fn is_filler(&self, coord: GridCoordinate) -> bool {
        self.capacity
            .index_of(coord)
            .is_some_and(|idx| Arc::ptr_eq(&*self.cells[idx].read(), &self.filler))
    }

    /// Number of cells holding written content
    #[must_use]
    pub fn written_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| !Arc::ptr_eq(&*cell.read(), &self.filler))
            .count()
    }

    /// Replace a cell's image
    ///
    /// # Errors
    /// - `GridError::OutOfBounds` if `coord` lies outside capacity
    /// - `GridError::CellSizeMismatch` if `image` is not `cell_size` square
    pub fn write(&self, coord: GridCoordinate, image: CellImage) -> Result<(), GridError> {
        let idx = self.capacity.index_of(coord).ok_or(GridError::OutOfBounds {
            coord,
            capacity: self.capacity,
        })?;

        if image.width() != self.cell_size || image.height() != self.cell_size {
            return Err(GridError::CellSizeMismatch {
                expected: self.cell_size,
                actual_width: image.width(),
                actual_height: image.height(),
            });
        }

        *self.cells[idx].write() = Arc::new(image);
        Ok(())
    }
}
