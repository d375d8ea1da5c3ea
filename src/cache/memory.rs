//! In-memory cache backend.

use crate::cache::{CacheEntry, ElementCache};
use crate::error::{BuilderError, BuilderResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory [`ElementCache`] backend.
///
/// Tracks hit/miss counters so tests (and dev tooling) can observe whether
/// a read was served from cache or went through to durable storage.
#[derive(Clone)]
pub struct InMemoryCache {
	store: Arc<RwLock<HashMap<String, CacheEntry>>>,
	hits: Arc<AtomicU64>,
	misses: Arc<AtomicU64>,
}

impl InMemoryCache {
	/// Create an empty cache.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
			hits: Arc::new(AtomicU64::new(0)),
			misses: Arc::new(AtomicU64::new(0)),
		}
	}

	/// Whether a live (non-expired) entry exists for `key`.
	pub async fn has_key(&self, key: &str) -> bool {
		let store = self.store.read().await;
		store.get(key).is_some_and(|entry| !entry.is_expired())
	}

	/// Number of cache hits served so far.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Number of cache misses so far (expired entries count as misses).
	pub fn misses(&self) -> u64 {
		self.misses.load(Ordering::Relaxed)
	}

	/// Drop expired entries.
	pub async fn cleanup_expired(&self) {
		let mut store = self.store.write().await;
		store.retain(|_, entry| !entry.is_expired());
	}
}

impl Default for InMemoryCache {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ElementCache for InMemoryCache {
	async fn get(&self, key: &str) -> BuilderResult<Option<JsonValue>> {
		let store = self.store.read().await;

		if let Some(entry) = store.get(key) {
			if entry.is_expired() {
				self.misses.fetch_add(1, Ordering::Relaxed);
				return Ok(None);
			}

			self.hits.fetch_add(1, Ordering::Relaxed);

			let value = serde_json::from_slice(&entry.value)
				.map_err(|e| BuilderError::Cache(e.to_string()))?;
			Ok(Some(value))
		} else {
			self.misses.fetch_add(1, Ordering::Relaxed);
			Ok(None)
		}
	}

	async fn put(&self, key: &str, value: &JsonValue, ttl: Duration) -> BuilderResult<()> {
		let serialized =
			serde_json::to_vec(value).map_err(|e| BuilderError::Cache(e.to_string()))?;
		let entry = CacheEntry::new(serialized, Some(ttl));

		let mut store = self.store.write().await;
		store.insert(key.to_string(), entry);

		Ok(())
	}

	async fn forget(&self, key: &str) -> BuilderResult<()> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}
}
