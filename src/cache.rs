//! Cache boundary for resolved element data.
//!
//! The cache is a pure accelerator: losing it never loses data, it only
//! adds one extra read-through to durable storage.

pub mod memory;

use crate::error::BuilderResult;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::{Duration, SystemTime};

pub use memory::InMemoryCache;

/// Key-value cache interface for resolved element payloads.
///
/// Writes are best-effort and idempotent; losing a race between two
/// concurrent writers is acceptable because the next read-through
/// repopulates from the durable record.
#[async_trait]
pub trait ElementCache: Send + Sync {
	/// Look up a cached value. Expired entries count as absent.
	async fn get(&self, key: &str) -> BuilderResult<Option<JsonValue>>;

	/// Store a value with a time-to-live.
	async fn put(&self, key: &str, value: &JsonValue, ttl: Duration) -> BuilderResult<()>;

	/// Drop a cached value, if present.
	async fn forget(&self, key: &str) -> BuilderResult<()>;
}

/// Cache entry with expiration
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
	pub(crate) value: Vec<u8>,
	pub(crate) expires_at: Option<SystemTime>,
}

impl CacheEntry {
	pub(crate) fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
		let expires_at = ttl.map(|d| SystemTime::now() + d);
		Self { value, expires_at }
	}

	pub(crate) fn is_expired(&self) -> bool {
		if let Some(expires_at) = self.expires_at {
			SystemTime::now() > expires_at
		} else {
			false
		}
	}
}
