//! The builder element contract: identity, cache policy, type
//! classification, and delegation into the element store.

use crate::config::DEFAULT_CACHE_TTL_HOURS;
use crate::error::BuilderResult;
use crate::model::{ElementPayload, ElementType};
use crate::store::ElementStore;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Per-variant configuration, fixed at definition time.
///
/// Each element variant carries its key as an immutable field set once at
/// construction; all statefulness lives in the store's records and cache.
#[derive(Debug, Clone)]
pub struct ElementConfig {
	/// Element key used for storage and cache addressing
	pub key: String,
	/// Element classification
	pub element_type: ElementType,
	/// Whether the variant participates in caching/persistence at all
	pub cache_required: bool,
	/// Cache lifetime in hours
	pub cache_ttl_hours: u64,
}

impl ElementConfig {
	/// Create a configuration with caching disabled and the default TTL.
	pub fn new(key: impl Into<String>, element_type: ElementType) -> Self {
		Self {
			key: key.into(),
			element_type,
			cache_required: false,
			cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
		}
	}

	/// Enable caching (and with it, persistence through the store).
	pub fn with_cache(mut self) -> Self {
		self.cache_required = true;
		self
	}

	/// Override the cache TTL.
	pub fn with_cache_ttl_hours(mut self, hours: u64) -> Self {
		self.cache_ttl_hours = hours;
		self
	}
}

/// Stamp bookkeeping fields into an element payload if absent.
///
/// Only object payloads are stamped; scalars pass through untouched.
fn stamp_element_metadata(data: &mut JsonValue, key: &str) {
	if let JsonValue::Object(map) = data
		&& !map.contains_key("created_at")
	{
		map.insert("created_at".to_string(), json!(Utc::now().timestamp()));
		map.insert("element_key".to_string(), json!(key));
	}
}

/// Behavior shared by every page element variant.
///
/// Variants implement [`config`](Self::config); the persistence discipline
/// is implemented once as default methods and is not meant to be
/// overridden. Variants with `cache_required = false` never read or write
/// the store: reads return `None` and writes are no-ops.
#[async_trait]
pub trait BuilderElement: Send + Sync {
	/// The variant's configuration.
	fn config(&self) -> &ElementConfig;

	/// Element key.
	fn key(&self) -> &str {
		&self.config().key
	}

	/// Element classification.
	fn element_type(&self) -> ElementType {
		self.config().element_type
	}

	/// Whether this variant participates in caching/persistence.
	fn cache_required(&self) -> bool {
		self.config().cache_required
	}

	/// The variant's cache TTL.
	fn cache_ttl(&self) -> Duration {
		Duration::from_secs(self.config().cache_ttl_hours * 60 * 60)
	}

	/// Derived key for sub-elements: `"{key}.{suffix}"`.
	fn element_key_with_suffix(&self, suffix: &str) -> String {
		format!("{}.{}", self.key(), suffix)
	}

	/// Resolve this element's data through the store.
	///
	/// Component-typed variants get `created_at`/`element_key` stamped into
	/// data that is missing them (lazy backfill for legacy records, never
	/// persisted back).
	async fn element_data(
		&self,
		store: &ElementStore,
		page_id: Option<&str>,
	) -> BuilderResult<Option<JsonValue>> {
		if !self.cache_required() {
			return Ok(None);
		}

		let resolved = store
			.get_with_ttl(self.key(), page_id, self.cache_ttl())
			.await?;

		Ok(resolved.map(|r| {
			let mut data = r.data;
			if self.element_type() == ElementType::Component {
				stamp_element_metadata(&mut data, self.key());
			}
			data
		}))
	}

	/// Persist this element's data through the store.
	///
	/// Stamps `created_at`/`element_key` if absent, then saves with the
	/// payload externalized to a file.
	async fn set_element_data(
		&self,
		store: &ElementStore,
		mut data: JsonValue,
		page_id: Option<&str>,
	) -> BuilderResult<()> {
		if !self.cache_required() {
			return Ok(());
		}

		stamp_element_metadata(&mut data, self.key());
		store
			.save_with_ttl(
				self.key(),
				self.element_type(),
				ElementPayload::Json(data),
				page_id,
				true,
				self.cache_ttl(),
			)
			.await?;
		Ok(())
	}

	/// Delete this element's records, files, and cache entries.
	async fn delete_element(
		&self,
		store: &ElementStore,
		page_id: Option<&str>,
	) -> BuilderResult<bool> {
		store.delete(self.key(), page_id).await
	}

	/// Delete an arbitrary key's records, files, and cache entries.
	async fn delete_element_by_key(
		&self,
		store: &ElementStore,
		key: &str,
		page_id: Option<&str>,
	) -> BuilderResult<bool> {
		store.delete(key, page_id).await
	}

	/// Delete every element of a type (this variant's own type when
	/// `element_type` is `None`), invalidating each key's cache entry
	/// individually.
	async fn delete_elements_by_type(
		&self,
		store: &ElementStore,
		element_type: Option<ElementType>,
		page_id: Option<&str>,
	) -> BuilderResult<usize> {
		store
			.delete_by_type(element_type.unwrap_or_else(|| self.element_type()), page_id)
			.await
	}
}

/// A plain element variant with no behavior beyond its configuration.
#[derive(Debug, Clone)]
pub struct Element {
	config: ElementConfig,
}

impl Element {
	/// Wrap a configuration.
	pub fn new(config: ElementConfig) -> Self {
		Self { config }
	}
}

impl BuilderElement for Element {
	fn config(&self) -> &ElementConfig {
		&self.config
	}
}

/// Registry mapping element keys to their variants.
pub struct ElementRegistry {
	elements: HashMap<String, Arc<dyn BuilderElement>>,
}

impl ElementRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self {
			elements: HashMap::new(),
		}
	}

	/// Register a variant under its own key.
	pub fn register(&mut self, element: Arc<dyn BuilderElement>) {
		self.elements.insert(element.key().to_string(), element);
	}

	/// Look up a variant by key.
	pub fn get(&self, key: &str) -> Option<Arc<dyn BuilderElement>> {
		self.elements.get(key).cloned()
	}

	/// Whether a key is registered.
	pub fn contains(&self, key: &str) -> bool {
		self.elements.contains_key(key)
	}

	/// Registered keys, in no particular order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.elements.keys().map(String::as_str)
	}

	/// Number of registered variants.
	pub fn len(&self) -> usize {
		self.elements.len()
	}

	/// Whether the registry is empty.
	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}
}

impl Default for ElementRegistry {
	fn default() -> Self {
		Self::new()
	}
}
