//! Mosaic Grid - cell bookkeeping for a growing mosaic
//!
//! Owns the two pieces of grid state a mosaic session carries:
//! - [`OccupancyGrid`]: which cells have been handed out, over a logical
//!   extent that grows by one row and one column per round
//! - [`ImageGrid`]: the capacity-sized store of fixed-size cell images
//!
//! The [`SlotAllocator`] is the only mutator of the occupancy grid. It grows
//! the logical extent and hands out collision-free coordinates, so writers
//! targeting distinct coordinates never contend on a cell.
//!
//! # Example
//!
//! ```rust
//! use mosaic_grid::{GridDims, OccupancyGrid, SlotAllocator};
//!
//! # fn example() -> Result<(), mosaic_grid::GridError> {
//! let grid = OccupancyGrid::new(GridDims::new(1, 1), GridDims::new(8, 8))?;
//! let mut allocator = SlotAllocator::new(grid).with_seed(7);
//!
//! allocator.grow()?;
//! let coords = allocator.allocate(3)?;
//! assert!(coords.len() <= 3);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod allocator;
pub mod coord;
pub mod error;
pub mod image_grid;
pub mod occupancy;

// Re-exports for convenience
pub use allocator::{GrowthStep, SlotAllocator, DEFAULT_MAX_DRAWS_PER_SLOT};
pub use coord::{GridCoordinate, GridDims};
pub use error::GridError;
pub use image_grid::{CellImage, ImageGrid, DEFAULT_CELL_SIZE, DEFAULT_FILLER_VALUE};
pub use occupancy::OccupancyGrid;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
