//! Error types for scanning and fetching
//!
//! - `FetchError`: the fetch seam itself failed (transport, client setup)
//! - `TaskError`: why a single pipeline task produced no image
//! - `TemplateError`: a search-results URL template is malformed

/// Fetch seam errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Request could not be completed
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP client could not be built
    #[error("client setup failed: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Self::Client(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Per-task failure; always local to its task
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskError {
    /// Fetch seam failed
    #[error("image fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Server answered with a non-success status
    #[error("image fetch returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Fetch did not finish within the per-fetch timeout
    #[error("image fetch timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// Body is not a decodable image
    #[error("image decode failed: {0}")]
    Decode(String),

    /// Blocking decode worker died
    #[error("decode worker failed: {0}")]
    Worker(String),
}

impl TaskError {
    /// Check if the fetch stage failed (status, transport or timeout)
    #[inline]
    #[must_use]
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::Status { .. } | Self::Timeout { .. }
        )
    }

    /// Check if the decode stage failed
    #[inline]
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Worker(_))
    }
}

/// URL template errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Template has no `{}` slot
    #[error("template has no '{{}}' query slot: {0}")]
    MissingSlot(String),

    /// Template has more than one `{}` slot
    #[error("template has {count} '{{}}' query slots, expected one: {template}")]
    MultipleSlots {
        /// Offending template
        template: String,
        /// Slots found
        count: usize,
    },
}
