//! Image decode and normalization
//!
//! Decoded images are converted to 8-bit RGB, the one channel order the
//! grid stores, then resized to the square cell size.

use crate::error::TaskError;
use image::imageops::{self, FilterType};
use mosaic_grid::CellImage;

/// Decode an image body into a normalized cell image
///
/// # Errors
/// - `TaskError::Decode` if the bytes are not a supported image
pub fn decode_cell(bytes: &[u8], cell_size: u32) -> Result<CellImage, TaskError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| TaskError::Decode(e.to_string()))?;
    let rgb = decoded.to_rgb8();
    Ok(imageops::resize(&rgb, cell_size, cell_size, FilterType::Triangle))
}
