//! Durable storage boundary for element records.

pub mod memory;
pub mod sqlite;

use crate::error::BuilderResult;
use crate::model::{ElementRecord, ElementType};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

/// Fields for an upsert.
#[derive(Debug, Clone)]
pub struct NewElement {
	/// Element key
	pub key: String,
	/// Page scope, `None` for site-wide elements
	pub page_id: Option<String>,
	/// Element classification
	pub element_type: ElementType,
	/// Inline payload
	pub data: JsonValue,
}

/// Queryable record store for element records.
///
/// `find`/`find_all`/the list operations treat an absent `page_id` as
/// "unscoped" (match records for any page), mirroring the read path of the
/// admin surface. The write path (`find_exact`, `upsert`) is NULL-exact on
/// `page_id`, since `(key, page_id)` is the upsert identity.
///
/// Repositories stamp `created_at` on insert and `updated_at` on every
/// write; the read-then-write upsert relies on the store's per-key critical
/// section for atomicity.
#[async_trait]
pub trait ElementRepository: Send + Sync {
	/// First record matching `key`, optionally page-scoped.
	async fn find(&self, key: &str, page_id: Option<&str>) -> BuilderResult<Option<ElementRecord>>;

	/// The record whose `(key, page_id)` matches exactly (`None` matches
	/// only records without a page scope).
	async fn find_exact(
		&self,
		key: &str,
		page_id: Option<&str>,
	) -> BuilderResult<Option<ElementRecord>>;

	/// All records matching `key`, optionally page-scoped.
	async fn find_all(&self, key: &str, page_id: Option<&str>)
	-> BuilderResult<Vec<ElementRecord>>;

	/// Insert or update by `(key, page_id)`. Updates replace the type and
	/// inline data and clear any file pointer; `created_at` is preserved.
	async fn upsert(&self, element: NewElement) -> BuilderResult<ElementRecord>;

	/// Point a record at an external file, replacing its inline data
	/// (normally with the externalization sentinel).
	async fn set_file_pointer(
		&self,
		id: i64,
		file_path: &str,
		data: JsonValue,
	) -> BuilderResult<()>;

	/// Delete a record by id.
	async fn delete(&self, id: i64) -> BuilderResult<()>;

	/// All records of a type, optionally page-scoped.
	async fn list_by_type(
		&self,
		element_type: ElementType,
		page_id: Option<&str>,
	) -> BuilderResult<Vec<ElementRecord>>;

	/// All records scoped to a page.
	async fn list_by_page(&self, page_id: &str) -> BuilderResult<Vec<ElementRecord>>;
}
