//! Local file system storage backend.

use crate::error::{BuilderError, BuilderResult};
use crate::storage::FileStore;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tokio::fs;

/// Local file system [`FileStore`].
#[derive(Debug, Clone)]
pub struct LocalFileStore {
	base_path: PathBuf,
}

impl LocalFileStore {
	/// Create a local store rooted at `base_path`.
	///
	/// # Errors
	///
	/// Returns [`BuilderError::Config`] if the base path does not exist or
	/// is not a directory.
	pub fn new(base_path: impl Into<PathBuf>) -> BuilderResult<Self> {
		let base_path = base_path.into();

		if !base_path.exists() {
			return Err(BuilderError::Config(format!(
				"base path does not exist: {}",
				base_path.display()
			)));
		}

		if !base_path.is_dir() {
			return Err(BuilderError::Config(format!(
				"base path is not a directory: {}",
				base_path.display()
			)));
		}

		Ok(Self { base_path })
	}

	/// Get the full file path.
	fn get_path(&self, name: &str) -> PathBuf {
		self.base_path.join(name)
	}
}

#[async_trait]
impl FileStore for LocalFileStore {
	async fn exists(&self, path: &str) -> BuilderResult<bool> {
		let path = self.get_path(path);
		Ok(path.exists() && path.is_file())
	}

	async fn read(&self, path: &str) -> BuilderResult<Vec<u8>> {
		let path = self.get_path(path);
		let content = fs::read(&path).await?;
		Ok(content)
	}

	async fn write(&self, path: &str, content: &[u8]) -> BuilderResult<()> {
		let path = self.get_path(path);

		// Create parent directories if they don't exist
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).await?;
		}

		fs::write(&path, content).await?;
		Ok(())
	}

	async fn delete(&self, path: &str) -> BuilderResult<()> {
		let full = self.get_path(path);

		if !full.exists() {
			return Err(BuilderError::Io(io::Error::new(
				io::ErrorKind::NotFound,
				format!("file not found: {}", path),
			)));
		}

		fs::remove_file(&full).await?;
		Ok(())
	}

	async fn ensure_dir(&self, path: &str) -> BuilderResult<()> {
		fs::create_dir_all(self.get_path(path)).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn write_read_delete_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let store = LocalFileStore::new(dir.path()).unwrap();

		store.write("a/b/file.json", b"{\"x\":1}").await.unwrap();
		assert!(store.exists("a/b/file.json").await.unwrap());
		assert_eq!(store.read("a/b/file.json").await.unwrap(), b"{\"x\":1}");

		store.delete("a/b/file.json").await.unwrap();
		assert!(!store.exists("a/b/file.json").await.unwrap());
	}

	#[tokio::test]
	async fn delete_missing_file_errors() {
		let dir = tempfile::tempdir().unwrap();
		let store = LocalFileStore::new(dir.path()).unwrap();

		assert!(store.delete("nope.json").await.is_err());
	}

	#[tokio::test]
	async fn rejects_missing_base_path() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("does-not-exist");

		assert!(matches!(
			LocalFileStore::new(missing),
			Err(BuilderError::Config(_))
		));
	}

	#[tokio::test]
	async fn ensure_dir_is_idempotent() {
		let dir = tempfile::tempdir().unwrap();
		let store = LocalFileStore::new(dir.path()).unwrap();

		store.ensure_dir("theme_elements/component").await.unwrap();
		store.ensure_dir("theme_elements/component").await.unwrap();
		assert!(dir.path().join("theme_elements/component").is_dir());
	}
}
