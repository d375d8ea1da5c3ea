//! Error types for the page builder.

use thiserror::Error;

/// Errors surfaced by the element store and the builder layer.
///
/// A record that does not exist is never an error; lookups return `None`.
/// Degraded file reads (pointer present, file missing or unparsable) are
/// absorbed by the store and reported through
/// [`ResolvedSource::InlineFallback`](crate::model::ResolvedSource).
#[derive(Error, Debug)]
pub enum BuilderError {
	/// Durable storage failure (connection lost, constraint violation, ...)
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// File storage failure outside the degraded-read path
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON encoding/decoding failure
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// Cache backend failure
	#[error("cache error: {0}")]
	Cache(String),

	/// A page builder declared zero forms, or a form whose element has
	/// caching disabled. Programmer error; fails loudly.
	#[error("misconfigured page builder: {0}")]
	Misconfiguration(String),

	/// Invalid configuration value
	#[error("configuration error: {0}")]
	Config(String),
}

/// Result type for page-builder operations
pub type BuilderResult<T> = Result<T, BuilderError>;
