//! Error types for Mosaic Core
//!
//! Only two failures end a round: the results page could not be fetched, or
//! the allocator saturated. Everything else here is a configuration problem
//! detected before or at session start.

use mosaic_fetch::{FetchError, TemplateError};
use mosaic_grid::{GridCoordinate, GridError};
use std::path::PathBuf;

/// Result alias for session operations
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Main mosaic error type
#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    /// Results page could not be fetched
    #[error("results page fetch failed for {url}: {reason}")]
    PageFetch {
        /// Page URL
        url: String,
        /// HTTP status, if a response arrived
        status: Option<u16>,
        /// Failure description
        reason: String,
    },

    /// Grid bookkeeping failed (saturation or capacity)
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// Search template is malformed
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Fetch client could not be created
    #[error("fetch client error: {0}")]
    Client(#[from] FetchError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl MosaicError {
    /// Create page fetch error
    #[inline]
    pub fn page_fetch(url: impl Into<String>, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::PageFetch {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Check if error ends the current round but not the session
    #[inline]
    #[must_use]
    pub fn is_round_fatal(&self) -> bool {
        matches!(
            self,
            Self::PageFetch { .. } | Self::Grid(GridError::Saturation { .. })
        )
    }

    /// Check if error reflects a session configuration problem
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Grid(err) => !err.is_saturation(),
            Self::Template(_) | Self::Client(_) | Self::Config(_) => true,
            Self::PageFetch { .. } => false,
        }
    }

    /// Coordinates allocated before a saturation; empty otherwise
    #[must_use]
    pub fn saturation_allocated(&self) -> &[GridCoordinate] {
        match self {
            Self::Grid(err) => err.allocated(),
            _ => &[],
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting is out of range
    #[error("invalid setting '{field}': {message}")]
    Invalid {
        /// Setting name
        field: &'static str,
        /// What is wrong
        message: String,
    },

    /// TOML could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create invalid-setting error
    #[inline]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_grid::GridDims;

    #[test]
    fn page_fetch_is_round_fatal() {
        let err = MosaicError::page_fetch("https://x", Some(503), "non-success status");
        assert!(err.is_round_fatal());
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("https://x"));
    }

    #[test]
    fn saturation_is_round_fatal() {
        let err = MosaicError::from(GridError::Saturation {
            requested: 3,
            allocated: vec![GridCoordinate::new(0, 0)],
            draws: 5,
        });
        assert!(err.is_round_fatal());
        assert!(!err.is_configuration());
        assert_eq!(err.saturation_allocated(), &[GridCoordinate::new(0, 0)]);
    }

    #[test]
    fn capacity_is_configuration() {
        let err = MosaicError::from(GridError::CapacityExceeded {
            current: GridDims::new(2, 2),
            capacity: GridDims::new(2, 2),
        });
        assert!(err.is_configuration());
        assert!(!err.is_round_fatal());
        assert!(err.saturation_allocated().is_empty());
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::invalid("workers", "must be at least 1");
        assert_eq!(err.to_string(), "invalid setting 'workers': must be at least 1");
    }
}
