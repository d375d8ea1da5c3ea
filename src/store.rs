//! The element store: a three-tier read/write path for keyed JSON
//! documents (cache → durable record → flat file).

use crate::cache::ElementCache;
use crate::config::BuilderConfig;
use crate::error::BuilderResult;
use crate::model::{
	ElementPayload, ElementRecord, ElementType, ResolvedElement, ResolvedSource, file_sentinel,
};
use crate::repository::{ElementRepository, NewElement};
use crate::storage::FileStore;
use dashmap::DashMap;
use md5::{Digest, Md5};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Single source of truth for keyed JSON documents, with an
/// overflow-to-file strategy and a write-through cache.
///
/// Reads resolve cache → durable record → external file; a missing or
/// corrupt file degrades to the record's inline data instead of failing.
/// Writes upsert by `(key, page_id)`, removing any previous file at that
/// key before externalizing the new payload, inside a per-key critical
/// section.
pub struct ElementStore {
	repository: Arc<dyn ElementRepository>,
	cache: Arc<dyn ElementCache>,
	files: Arc<dyn FileStore>,
	config: BuilderConfig,
	key_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ElementStore {
	/// Create a store with the default [`BuilderConfig`].
	pub fn new(
		repository: Arc<dyn ElementRepository>,
		cache: Arc<dyn ElementCache>,
		files: Arc<dyn FileStore>,
	) -> Self {
		Self::with_config(repository, cache, files, BuilderConfig::default())
	}

	/// Create a store with an explicit configuration.
	pub fn with_config(
		repository: Arc<dyn ElementRepository>,
		cache: Arc<dyn ElementCache>,
		files: Arc<dyn FileStore>,
		config: BuilderConfig,
	) -> Self {
		Self {
			repository,
			cache,
			files,
			config,
			key_locks: DashMap::new(),
		}
	}

	/// The store's configuration.
	pub fn config(&self) -> &BuilderConfig {
		&self.config
	}

	/// Cache key for an element, scoped by page when present.
	pub fn cache_key(key: &str, page_id: Option<&str>) -> String {
		match page_id {
			Some(page) => format!("builder_element_{}_{}", key, page),
			None => format!("builder_element_{}", key),
		}
	}

	/// Deterministic file name (hash of `(key, page_id)`), so re-saves at
	/// the same key overwrite the same file.
	pub fn file_name(key: &str, page_id: Option<&str>) -> String {
		let input = match page_id {
			Some(page) => format!("{}_{}", key, page),
			None => key.to_string(),
		};
		hex::encode(Md5::digest(input.as_bytes()))
	}

	/// Relative path of the external file for an element.
	pub fn file_path(&self, element_type: ElementType, key: &str, page_id: Option<&str>) -> String {
		format!(
			"{}/{}/{}.json",
			self.config.file_namespace,
			element_type,
			Self::file_name(key, page_id)
		)
	}

	fn lock_for(&self, cache_key: &str) -> Arc<Mutex<()>> {
		self.key_locks
			.entry(cache_key.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	/// Resolve an element, using the store's default TTL for the cache
	/// refill. Returns `None` when no record exists.
	pub async fn get(
		&self,
		key: &str,
		page_id: Option<&str>,
	) -> BuilderResult<Option<ResolvedElement>> {
		self.get_with_ttl(key, page_id, self.config.cache_ttl()).await
	}

	/// Resolve an element with an explicit cache TTL.
	pub async fn get_with_ttl(
		&self,
		key: &str,
		page_id: Option<&str>,
		ttl: Duration,
	) -> BuilderResult<Option<ResolvedElement>> {
		let cache_key = Self::cache_key(key, page_id);

		if let Some(data) = self.cache.get(&cache_key).await? {
			debug!(key, ?page_id, "element resolved from cache");
			return Ok(Some(ResolvedElement {
				data,
				source: ResolvedSource::Cache,
			}));
		}

		let Some(record) = self.repository.find(key, page_id).await? else {
			return Ok(None);
		};

		let resolved = self.resolve_record(&record).await;
		self.cache.put(&cache_key, &resolved.data, ttl).await?;

		Ok(Some(resolved))
	}

	/// Follow a record's file pointer, degrading to the inline copy when
	/// the file is missing, unreadable, or holds no usable JSON.
	async fn resolve_record(&self, record: &ElementRecord) -> ResolvedElement {
		let Some(path) = record.file_path.as_deref() else {
			return ResolvedElement {
				data: record.data.clone(),
				source: ResolvedSource::Inline,
			};
		};

		if self.files.exists(path).await.unwrap_or(false) {
			match self.files.read(path).await {
				Ok(bytes) => match serde_json::from_slice::<JsonValue>(&bytes) {
					Ok(data) if !data.is_null() => {
						return ResolvedElement {
							data,
							source: ResolvedSource::File,
						};
					}
					Ok(_) => warn!(key = %record.key, path, "element file holds no data"),
					Err(e) => warn!(key = %record.key, path, error = %e, "element file unparsable"),
				},
				Err(e) => warn!(key = %record.key, path, error = %e, "element file unreadable"),
			}
		} else {
			warn!(key = %record.key, path, "element file pointer target missing");
		}

		ResolvedElement {
			data: record.data.clone(),
			source: ResolvedSource::InlineFallback,
		}
	}

	/// Upsert an element, optionally externalizing the payload to a file,
	/// and refresh the cache with the store's default TTL.
	pub async fn save(
		&self,
		key: &str,
		element_type: ElementType,
		payload: impl Into<ElementPayload>,
		page_id: Option<&str>,
		store_in_file: bool,
	) -> BuilderResult<ElementRecord> {
		self.save_with_ttl(
			key,
			element_type,
			payload,
			page_id,
			store_in_file,
			self.config.cache_ttl(),
		)
		.await
	}

	/// Upsert an element with an explicit cache TTL.
	///
	/// The delete-old-file → write-new-file → update-pointer sequence runs
	/// inside a per-key critical section; concurrent saves to the same key
	/// serialize, last writer wins.
	pub async fn save_with_ttl(
		&self,
		key: &str,
		element_type: ElementType,
		payload: impl Into<ElementPayload>,
		page_id: Option<&str>,
		store_in_file: bool,
		ttl: Duration,
	) -> BuilderResult<ElementRecord> {
		let data = payload.into().into_value();
		let cache_key = Self::cache_key(key, page_id);

		let lock = self.lock_for(&cache_key);
		let _guard = lock.lock().await;

		// Remove the previous file at this key before anything else, so a
		// re-save never orphans it.
		if let Some(existing) = self.repository.find_exact(key, page_id).await?
			&& let Some(old_path) = existing.file_path.as_deref()
			&& self.files.exists(old_path).await?
		{
			self.files.delete(old_path).await?;
		}

		// Inline data is committed first; the file pointer comes after the
		// file is on disk, so readers always have a recoverable copy.
		let mut record = self
			.repository
			.upsert(NewElement {
				key: key.to_string(),
				page_id: page_id.map(str::to_string),
				element_type,
				data: data.clone(),
			})
			.await?;

		if store_in_file {
			let dir = format!("{}/{}", self.config.file_namespace, element_type);
			self.files.ensure_dir(&dir).await?;

			let path = format!("{}/{}.json", dir, Self::file_name(key, page_id));
			self.files.write(&path, &serde_json::to_vec(&data)?).await?;

			let sentinel = file_sentinel();
			self.repository
				.set_file_pointer(record.id, &path, sentinel.clone())
				.await?;
			record.file_path = Some(path);
			record.data = sentinel;
		}

		self.cache.put(&cache_key, &data, ttl).await?;
		debug!(key, ?page_id, store_in_file, "element saved");

		Ok(record)
	}

	/// Delete all records matching `key` (optionally page-scoped), their
	/// files, and their cache entries. Returns `false` when nothing
	/// matched.
	pub async fn delete(&self, key: &str, page_id: Option<&str>) -> BuilderResult<bool> {
		let cache_key = Self::cache_key(key, page_id);

		let lock = self.lock_for(&cache_key);
		let _guard = lock.lock().await;

		let records = self.repository.find_all(key, page_id).await?;
		if records.is_empty() {
			return Ok(false);
		}

		for record in &records {
			if let Some(path) = record.file_path.as_deref()
				&& self.files.exists(path).await?
			{
				self.files.delete(path).await?;
			}

			self.repository.delete(record.id).await?;
			self.cache
				.forget(&Self::cache_key(key, record.page_id.as_deref()))
				.await?;
		}

		self.cache.forget(&cache_key).await?;
		debug!(key, ?page_id, count = records.len(), "elements deleted");

		Ok(true)
	}

	/// All records of a type, optionally page-scoped. No cache involvement.
	pub async fn list_by_type(
		&self,
		element_type: ElementType,
		page_id: Option<&str>,
	) -> BuilderResult<Vec<ElementRecord>> {
		self.repository.list_by_type(element_type, page_id).await
	}

	/// All records scoped to a page. No cache involvement.
	pub async fn list_by_page(&self, page_id: &str) -> BuilderResult<Vec<ElementRecord>> {
		self.repository.list_by_page(page_id).await
	}

	/// Delete every record of a type, one record at a time so each key's
	/// cache entry is invalidated individually. Returns how many records
	/// were removed.
	pub async fn delete_by_type(
		&self,
		element_type: ElementType,
		page_id: Option<&str>,
	) -> BuilderResult<usize> {
		let records = self.repository.list_by_type(element_type, page_id).await?;
		let mut deleted = 0;

		for record in records {
			if self.delete(&record.key, record.page_id.as_deref()).await? {
				deleted += 1;
			}
		}

		Ok(deleted)
	}
}
