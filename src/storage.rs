//! File storage boundary for externalized element payloads.

pub mod local;

use crate::error::BuilderResult;
use async_trait::async_trait;

pub use local::LocalFileStore;

/// Path-addressed blob store.
///
/// Paths are relative, namespaced by element type and named by a
/// deterministic hash of `(key, page_id)`, so re-saves at the same key
/// overwrite the same file.
#[async_trait]
pub trait FileStore: Send + Sync {
	/// Check whether a file exists.
	async fn exists(&self, path: &str) -> BuilderResult<bool>;

	/// Read a file's contents.
	///
	/// # Errors
	///
	/// Returns an i/o error if the file does not exist or cannot be read.
	async fn read(&self, path: &str) -> BuilderResult<Vec<u8>>;

	/// Write a file, replacing any previous contents.
	async fn write(&self, path: &str, content: &[u8]) -> BuilderResult<()>;

	/// Delete a file.
	///
	/// # Errors
	///
	/// Returns an i/o error if the file does not exist.
	async fn delete(&self, path: &str) -> BuilderResult<()>;

	/// Create a directory (and its parents) if it does not exist.
	async fn ensure_dir(&self, path: &str) -> BuilderResult<()>;
}
