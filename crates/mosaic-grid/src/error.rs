//! Error types for grid bookkeeping
//!
//! Every variant here is either a configuration problem (dimensions that do
//! not fit the capacity fixed at session start) or allocator saturation.

use crate::coord::{GridCoordinate, GridDims};

/// Grid errors
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Starting extent is empty or larger than capacity
    #[error("invalid dimensions: start {start} must be non-empty and fit capacity {capacity}")]
    InvalidDimensions {
        /// Requested starting extent
        start: GridDims,
        /// Maximum extent
        capacity: GridDims,
    },

    /// Growth would exceed the capacity fixed at session start
    #[error("grid capacity exceeded: cannot grow {current} beyond {capacity}")]
    CapacityExceeded {
        /// Extent before the failed growth
        current: GridDims,
        /// Maximum extent
        capacity: GridDims,
    },

    /// Coordinate outside of the backing store
    #[error("coordinate {coord} out of bounds for capacity {capacity}")]
    OutOfBounds {
        /// Offending coordinate
        coord: GridCoordinate,
        /// Extent of the backing store
        capacity: GridDims,
    },

    /// Cell image does not match the store's fixed cell size
    #[error("cell image is {actual_width}x{actual_height}, expected {expected}x{expected}")]
    CellSizeMismatch {
        /// Store cell edge length
        expected: u32,
        /// Width of the rejected image
        actual_width: u32,
        /// Height of the rejected image
        actual_height: u32,
    },

    /// Rejection sampling could not find a free cell within its draw budget
    #[error("allocator saturated after {draws} draws ({} of {requested} slots allocated)", .allocated.len())]
    Saturation {
        /// Slots requested by the call
        requested: usize,
        /// Coordinates allocated (and marked) before saturation
        allocated: Vec<GridCoordinate>,
        /// Draws spent on the failing slot
        draws: usize,
    },
}

impl GridError {
    /// Check if error is an allocator saturation
    #[inline]
    #[must_use]
    pub fn is_saturation(&self) -> bool {
        matches!(self, Self::Saturation { .. })
    }

    /// Coordinates the allocator already handed out before failing
    ///
    /// These cells are marked occupied; callers may still fill them.
    #[must_use]
    pub fn allocated(&self) -> &[GridCoordinate] {
        match self {
            Self::Saturation { allocated, .. } => allocated,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_display() {
        let err = GridError::Saturation {
            requested: 4,
            allocated: vec![GridCoordinate::new(0, 0)],
            draws: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("10 draws"));
        assert!(msg.contains("1 of 4"));
        assert!(err.is_saturation());
        assert_eq!(err.allocated().len(), 1);
    }

    #[test]
    fn capacity_display() {
        let err = GridError::CapacityExceeded {
            current: GridDims::new(4, 4),
            capacity: GridDims::new(4, 4),
        };
        assert!(err.to_string().contains("capacity exceeded"));
        assert!(!err.is_saturation());
        assert!(err.allocated().is_empty());
    }
}
