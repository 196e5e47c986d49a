//! Session configuration
//!
//! Everything fixed at session start: starting and maximum extent, cell
//! format, pipeline sizing, timeouts and the search provider. Loadable from
//! TOML; any field left out takes its default.

use crate::error::ConfigError;
use mosaic_fetch::{PipelineSettings, SearchProvider};
use mosaic_grid::{GridDims, DEFAULT_CELL_SIZE, DEFAULT_FILLER_VALUE, DEFAULT_MAX_DRAWS_PER_SLOT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Mosaic session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Starting logical width
    pub start_width: usize,
    /// Starting logical height
    pub start_height: usize,
    /// Maximum width (capacity)
    pub max_width: usize,
    /// Maximum height (capacity)
    pub max_height: usize,
    /// Cell edge length in pixels
    pub cell_size: u32,
    /// Gray level of unwritten cells
    pub filler_value: u8,
    /// Fetch worker pool size
    pub workers: usize,
    /// Per-image fetch timeout
    pub fetch_timeout_ms: u64,
    /// Results-page fetch timeout
    pub page_timeout_ms: u64,
    /// Allocator resampling bound per slot
    pub max_draws_per_slot: usize,
    /// Search provider
    pub provider: SearchProvider,
    /// Seed for deterministic allocation
    pub seed: Option<u64>,
    /// HTTP user agent
    pub user_agent: String,
}

impl MosaicConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With starting extent
    #[inline]
    #[must_use]
    pub fn with_start(mut self, width: usize, height: usize) -> Self {
        self.start_width = width;
        self.start_height = height;
        self
    }

    /// With capacity
    #[inline]
    #[must_use]
    pub fn with_capacity(mut self, width: usize, height: usize) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// With cell edge length
    #[inline]
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// With worker pool size
    #[inline]
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// With per-image fetch timeout
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With search provider
    #[inline]
    #[must_use]
    pub fn with_provider(mut self, provider: SearchProvider) -> Self {
        self.provider = provider;
        self
    }

    /// With allocation seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// With allocator resampling bound
    #[inline]
    #[must_use]
    pub fn with_max_draws(mut self, max_draws_per_slot: usize) -> Self {
        self.max_draws_per_slot = max_draws_per_slot;
        self
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML
    /// - `ConfigError::Invalid` if the result fails [`validate`](Self::validate)
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - otherwise as [`from_toml_str`](Self::from_toml_str)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check settings for consistency
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the first offending setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_width == 0 || self.start_height == 0 {
            return Err(ConfigError::invalid("start_width/start_height", "must be at least 1"));
        }
        if !self.start_dims().fits_in(self.capacity()) {
            return Err(ConfigError::invalid(
                "max_width/max_height",
                format!("capacity {} smaller than start {}", self.capacity(), self.start_dims()),
            ));
        }
        if self.cell_size == 0 {
            return Err(ConfigError::invalid("cell_size", "must be at least 1"));
        }
        if self.workers == 0 {
            return Err(ConfigError::invalid("workers", "must be at least 1"));
        }
        if self.fetch_timeout_ms == 0 || self.page_timeout_ms == 0 {
            return Err(ConfigError::invalid("timeouts", "must be non-zero"));
        }
        if self.max_draws_per_slot == 0 {
            return Err(ConfigError::invalid("max_draws_per_slot", "must be at least 1"));
        }
        Ok(())
    }

    /// Starting logical extent
    #[inline]
    #[must_use]
    pub fn start_dims(&self) -> GridDims {
        GridDims::new(self.start_width, self.start_height)
    }

    /// Capacity extent
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> GridDims {
        GridDims::new(self.max_width, self.max_height)
    }

    /// Per-image fetch timeout
    #[inline]
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Results-page fetch timeout
    #[inline]
    #[must_use]
    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    /// Settings for the fetch pipeline
    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            workers: self.workers,
            fetch_timeout: self.fetch_timeout(),
            cell_size: self.cell_size,
        }
    }
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            start_width: 1,
            start_height: 1,
            max_width: 40,
            max_height: 40,
            cell_size: DEFAULT_CELL_SIZE,
            filler_value: DEFAULT_FILLER_VALUE,
            workers: 8,
            fetch_timeout_ms: 5_000,
            page_timeout_ms: 10_000,
            max_draws_per_slot: DEFAULT_MAX_DRAWS_PER_SLOT,
            provider: SearchProvider::default(),
            seed: None,
            user_agent: format!("mosaic/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = MosaicConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.start_dims(), GridDims::new(1, 1));
        assert_eq!(config.cell_size, 100);
        assert_eq!(config.filler_value, 127);
    }

    #[test]
    fn builder_chain() {
        let config = MosaicConfig::new()
            .with_start(2, 3)
            .with_capacity(10, 12)
            .with_workers(4)
            .with_fetch_timeout(Duration::from_millis(250))
            .with_seed(9);

        assert_eq!(config.capacity(), GridDims::new(10, 12));
        assert_eq!(config.pipeline_settings().workers, 4);
        assert_eq!(config.fetch_timeout(), Duration::from_millis(250));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn rejects_start_beyond_capacity() {
        let err = MosaicConfig::new().with_start(5, 5).with_capacity(4, 8).validate();
        assert!(matches!(err, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_zero_workers() {
        let err = MosaicConfig::new().with_workers(0).validate().unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn parses_partial_toml() {
        let config = MosaicConfig::from_toml_str(
            r#"
            start_width = 2
            start_height = 2
            workers = 3
            provider = "google"
            seed = 11
            "#,
        )
        .unwrap();

        assert_eq!(config.start_dims(), GridDims::new(2, 2));
        assert_eq!(config.workers, 3);
        assert_eq!(config.provider, SearchProvider::Google);
        assert_eq!(config.max_width, 40);
    }

    #[test]
    fn parses_custom_provider() {
        let config = MosaicConfig::from_toml_str(
            r#"provider = { custom = "http://localhost:8080/search?q={}" }"#,
        )
        .unwrap();
        assert_eq!(
            config.provider,
            SearchProvider::Custom("http://localhost:8080/search?q={}".into())
        );
    }

    #[test]
    fn rejects_invalid_toml_values() {
        assert!(matches!(
            MosaicConfig::from_toml_str("workers = 0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            MosaicConfig::from_toml_str("workers = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosaic.toml");
        std::fs::write(&path, "max_width = 12\nmax_height = 9\n").unwrap();

        let config = MosaicConfig::load(&path).unwrap();
        assert_eq!(config.capacity(), GridDims::new(12, 9));

        let missing = MosaicConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
