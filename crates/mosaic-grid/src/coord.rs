//! Grid coordinates and extents

use serde::{Deserialize, Serialize};

/// A single addressable cell, `(row, col)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    /// Row index (bounded by height)
    pub row: usize,
    /// Column index (bounded by width)
    pub col: usize,
}

impl GridCoordinate {
    /// Create new coordinate
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Check if coordinate lies inside the given extent
    #[inline]
    #[must_use]
    pub fn within(&self, dims: GridDims) -> bool {
        self.row < dims.height && self.col < dims.width
    }
}

impl std::fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for GridCoordinate {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// Width x height of a grid region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl GridDims {
    /// Create new dimensions
    #[inline]
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of cells
    #[inline]
    #[must_use]
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    /// Check if both sides fit inside `other`
    #[inline]
    #[must_use]
    pub const fn fits_in(&self, other: GridDims) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Row-major index of `coord`, if inside this extent
    #[inline]
    #[must_use]
    pub fn index_of(&self, coord: GridCoordinate) -> Option<usize> {
        coord
            .within(*self)
            .then(|| coord.row * self.width + coord.col)
    }

    /// Iterate all coordinates in row-major order
    pub fn coordinates(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| GridCoordinate::new(row, col)))
    }
}

impl std::fmt::Display for GridDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_within_extent() {
        let dims = GridDims::new(3, 2);
        assert!(GridCoordinate::new(1, 2).within(dims));
        assert!(!GridCoordinate::new(2, 0).within(dims));
        assert!(!GridCoordinate::new(0, 3).within(dims));
    }

    #[test]
    fn index_is_row_major() {
        let dims = GridDims::new(4, 3);
        assert_eq!(dims.index_of(GridCoordinate::new(0, 0)), Some(0));
        assert_eq!(dims.index_of(GridCoordinate::new(1, 0)), Some(4));
        assert_eq!(dims.index_of(GridCoordinate::new(2, 3)), Some(11));
        assert_eq!(dims.index_of(GridCoordinate::new(3, 0)), None);
    }

    #[test]
    fn coordinates_cover_area() {
        let dims = GridDims::new(3, 2);
        let all: Vec<_> = dims.coordinates().collect();
        assert_eq!(all.len(), dims.area());
        assert_eq!(all[0], GridCoordinate::new(0, 0));
        assert_eq!(all[5], GridCoordinate::new(1, 2));
    }

    #[test]
    fn dims_fit() {
        assert!(GridDims::new(2, 2).fits_in(GridDims::new(2, 5)));
        assert!(!GridDims::new(3, 2).fits_in(GridDims::new(2, 5)));
    }
}
