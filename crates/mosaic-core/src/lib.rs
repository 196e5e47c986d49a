//! Mosaic Core - round orchestration
//!
//! Ties the grid and the fetch pipeline into a session that grows a mosaic
//! one round at a time:
//! - [`MosaicSession`]: owns the allocator and image grid; runs rounds
//! - [`MosaicConfig`]: session settings, loadable from TOML
//! - [`GridWriter`]: applies pipeline outcomes to the image grid
//! - [`RoundReport`]: what a round allocated, fetched and wrote
//!
//! # Example
//!
//! ```rust,no_run
//! use mosaic_core::{MosaicConfig, MosaicSession};
//!
//! # async fn example() -> Result<(), mosaic_core::MosaicError> {
//! let config = MosaicConfig::new().with_capacity(10, 10).with_workers(4);
//! let mut session = MosaicSession::new(config)?;
//!
//! let report = session.advance_round("red cars").await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod writer;

// Re-exports for convenience
pub use config::MosaicConfig;
pub use error::{ConfigError, MosaicError};
pub use report::{RoundReport, RoundStats};
pub use session::MosaicSession;
pub use writer::{DrainResult, GridWriter};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running mosaic rounds
    pub use crate::config::MosaicConfig;
    pub use crate::error::{MosaicError, Result};
    pub use crate::report::RoundReport;
    pub use crate::session::MosaicSession;
    pub use mosaic_fetch::{SearchProvider, SearchTemplate};
    pub use mosaic_grid::{GridCoordinate, GridDims, ImageGrid};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
