//! Mosaic Fetch - from results page to cell images
//!
//! The network-facing half of a mosaic round:
//! - [`scanner`]: pull eligible absolute image URLs out of a results document
//! - [`template`]: build search-results URLs for interchangeable providers
//! - [`fetcher`]: the `fetch(url) -> (status, body)` seam, with a reqwest client
//! - [`pipeline`]: a bounded worker pool that fetches, decodes and resizes
//!   images, yielding outcomes in completion order
//!
//! # Architecture
//!
//! ```text
//! document ─→ scanner ─→ urls ─┐
//!                              ├─→ FetchTask* ─→ worker pool ─→ TaskOutcome (as completed)
//! allocator ─→ coordinates ────┘        fetch → decode → RGB → resize
//! ```
//!
//! Per-task failures never leave the pipeline as errors: they become
//! [`TaskOutcome::Dropped`] and the round carries on.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod decode;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod scanner;
pub mod template;

// Re-exports for convenience
pub use decode::decode_cell;
pub use error::{FetchError, TaskError, TemplateError};
pub use fetcher::{FetchResponse, Fetcher, HttpFetcher};
pub use pipeline::{FetchPipeline, FetchTask, PipelineSettings, TaskOutcome};
pub use scanner::{extract_image_urls, scan_document, ScanSummary};
pub use template::{encode_token, SearchProvider, SearchTemplate, BING_TEMPLATE, GOOGLE_TEMPLATE};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a fetch round
    pub use crate::fetcher::{FetchResponse, Fetcher, HttpFetcher};
    pub use crate::pipeline::{FetchPipeline, FetchTask, TaskOutcome};
    pub use crate::scanner::extract_image_urls;
    pub use crate::template::{SearchProvider, SearchTemplate};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
