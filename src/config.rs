//! Store configuration.

use crate::error::{BuilderError, BuilderResult};
use std::env;
use std::time::Duration;

/// Default cache lifetime for resolved element data.
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// Default directory namespace for externalized element files.
pub const DEFAULT_FILE_NAMESPACE: &str = "theme_elements";

/// Configuration for an [`ElementStore`](crate::store::ElementStore).
#[derive(Debug, Clone)]
pub struct BuilderConfig {
	/// Cache TTL in hours for resolved element data
	pub cache_ttl_hours: u64,
	/// Directory namespace (relative to the file store root) under which
	/// externalized payloads are written, one subdirectory per element type
	pub file_namespace: String,
}

impl BuilderConfig {
	/// Create a configuration with the default TTL (24 hours) and file
	/// namespace (`theme_elements`).
	pub fn new() -> Self {
		Self {
			cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
			file_namespace: DEFAULT_FILE_NAMESPACE.to_string(),
		}
	}

	/// Override the cache TTL.
	pub fn with_cache_ttl_hours(mut self, hours: u64) -> Self {
		self.cache_ttl_hours = hours;
		self
	}

	/// Override the file namespace.
	pub fn with_file_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.file_namespace = namespace.into();
		self
	}

	/// The configured TTL as a [`Duration`].
	pub fn cache_ttl(&self) -> Duration {
		Duration::from_secs(self.cache_ttl_hours * 60 * 60)
	}

	/// Load configuration from environment variables.
	///
	/// # Environment Variables
	///
	/// - `PAGEWRIGHT_CACHE_TTL_HOURS`: cache TTL in hours (optional)
	/// - `PAGEWRIGHT_FILE_NAMESPACE`: file namespace (optional)
	pub fn from_env() -> BuilderResult<Self> {
		let mut config = Self::new();

		if let Ok(raw) = env::var("PAGEWRIGHT_CACHE_TTL_HOURS") {
			config.cache_ttl_hours = raw.parse().map_err(|_| {
				BuilderError::Config(format!(
					"PAGEWRIGHT_CACHE_TTL_HOURS is not a valid hour count: {}",
					raw
				))
			})?;
		}

		if let Ok(namespace) = env::var("PAGEWRIGHT_FILE_NAMESPACE") {
			config.file_namespace = namespace;
		}

		Ok(config)
	}
}

impl Default for BuilderConfig {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = BuilderConfig::new();
		assert_eq!(config.cache_ttl_hours, 24);
		assert_eq!(config.file_namespace, "theme_elements");
		assert_eq!(config.cache_ttl(), Duration::from_secs(24 * 60 * 60));
	}

	#[test]
	fn builder_overrides() {
		let config = BuilderConfig::new()
			.with_cache_ttl_hours(6)
			.with_file_namespace("site_elements");
		assert_eq!(config.cache_ttl(), Duration::from_secs(6 * 60 * 60));
		assert_eq!(config.file_namespace, "site_elements");
	}
}
