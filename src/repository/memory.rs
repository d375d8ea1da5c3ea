//! In-memory repository backend.

use crate::error::BuilderResult;
use crate::model::{ElementRecord, ElementType};
use crate::repository::{ElementRepository, NewElement};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-memory [`ElementRepository`] for tests and single-process setups.
///
/// Counts `find` calls so tests can observe whether a read was served by
/// the cache or went through to durable storage.
#[derive(Clone)]
pub struct InMemoryRepository {
	records: Arc<RwLock<Vec<ElementRecord>>>,
	next_id: Arc<AtomicI64>,
	find_calls: Arc<AtomicU64>,
}

impl InMemoryRepository {
	/// Create an empty repository.
	pub fn new() -> Self {
		Self {
			records: Arc::new(RwLock::new(Vec::new())),
			next_id: Arc::new(AtomicI64::new(1)),
			find_calls: Arc::new(AtomicU64::new(0)),
		}
	}

	/// How many times [`ElementRepository::find`] has been called.
	pub fn find_count(&self) -> u64 {
		self.find_calls.load(Ordering::Relaxed)
	}

	/// Number of stored records.
	pub async fn len(&self) -> usize {
		self.records.read().await.len()
	}

	/// Whether the repository holds no records.
	pub async fn is_empty(&self) -> bool {
		self.records.read().await.is_empty()
	}
}

impl Default for InMemoryRepository {
	fn default() -> Self {
		Self::new()
	}
}

fn page_matches(record: &ElementRecord, page_id: Option<&str>) -> bool {
	match page_id {
		Some(page) => record.page_id.as_deref() == Some(page),
		None => true,
	}
}

#[async_trait]
impl ElementRepository for InMemoryRepository {
	async fn find(&self, key: &str, page_id: Option<&str>) -> BuilderResult<Option<ElementRecord>> {
		self.find_calls.fetch_add(1, Ordering::Relaxed);
		let records = self.records.read().await;
		Ok(records
			.iter()
			.find(|r| r.key == key && page_matches(r, page_id))
			.cloned())
	}

	async fn find_exact(
		&self,
		key: &str,
		page_id: Option<&str>,
	) -> BuilderResult<Option<ElementRecord>> {
		let records = self.records.read().await;
		Ok(records
			.iter()
			.find(|r| r.key == key && r.page_id.as_deref() == page_id)
			.cloned())
	}

	async fn find_all(
		&self,
		key: &str,
		page_id: Option<&str>,
	) -> BuilderResult<Vec<ElementRecord>> {
		let records = self.records.read().await;
		Ok(records
			.iter()
			.filter(|r| r.key == key && page_matches(r, page_id))
			.cloned()
			.collect())
	}

	async fn upsert(&self, element: NewElement) -> BuilderResult<ElementRecord> {
		let now = Utc::now();
		let mut records = self.records.write().await;

		if let Some(existing) = records
			.iter_mut()
			.find(|r| r.key == element.key && r.page_id.as_deref() == element.page_id.as_deref())
		{
			existing.element_type = element.element_type;
			existing.data = element.data;
			existing.file_path = None;
			existing.updated_at = now;
			return Ok(existing.clone());
		}

		let record = ElementRecord {
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			key: element.key,
			page_id: element.page_id,
			element_type: element.element_type,
			data: element.data,
			file_path: None,
			created_at: now,
			updated_at: now,
		};
		records.push(record.clone());
		Ok(record)
	}

	async fn set_file_pointer(
		&self,
		id: i64,
		file_path: &str,
		data: JsonValue,
	) -> BuilderResult<()> {
		let mut records = self.records.write().await;
		if let Some(record) = records.iter_mut().find(|r| r.id == id) {
			record.file_path = Some(file_path.to_string());
			record.data = data;
			record.updated_at = Utc::now();
		}
		Ok(())
	}

	async fn delete(&self, id: i64) -> BuilderResult<()> {
		let mut records = self.records.write().await;
		records.retain(|r| r.id != id);
		Ok(())
	}

	async fn list_by_type(
		&self,
		element_type: ElementType,
		page_id: Option<&str>,
	) -> BuilderResult<Vec<ElementRecord>> {
		let records = self.records.read().await;
		Ok(records
			.iter()
			.filter(|r| r.element_type == element_type && page_matches(r, page_id))
			.cloned()
			.collect())
	}

	async fn list_by_page(&self, page_id: &str) -> BuilderResult<Vec<ElementRecord>> {
		let records = self.records.read().await;
		Ok(records
			.iter()
			.filter(|r| r.page_id.as_deref() == Some(page_id))
			.cloned()
			.collect())
	}
}
