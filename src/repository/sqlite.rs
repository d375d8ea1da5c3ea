//! SQLite-backed repository (sqlx).

use crate::error::BuilderResult;
use crate::model::{ElementRecord, ElementType};
use crate::repository::{ElementRepository, NewElement};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

const SCHEMA: &[&str] = &[
	"CREATE TABLE IF NOT EXISTS theme_elements (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		element_key TEXT NOT NULL,
		element_type TEXT NOT NULL,
		page_id TEXT,
		data TEXT,
		file_path TEXT,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)",
	"CREATE INDEX IF NOT EXISTS idx_theme_elements_key ON theme_elements (element_key)",
	"CREATE INDEX IF NOT EXISTS idx_theme_elements_type ON theme_elements (element_type)",
	"CREATE INDEX IF NOT EXISTS idx_theme_elements_page ON theme_elements (page_id)",
];

/// SQLite [`ElementRepository`].
///
/// `(key, page_id)` uniqueness cannot be enforced by a SQL unique index
/// when `page_id` is NULL (NULLs compare distinct), so the upsert is a
/// select-then-write that relies on the store's per-key critical section.
#[derive(Clone)]
pub struct SqliteRepository {
	pool: SqlitePool,
}

impl SqliteRepository {
	/// Wrap an existing pool. Call [`ensure_schema`](Self::ensure_schema)
	/// before first use.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Connect to a database URL (e.g. `sqlite://elements.db?mode=rwc`)
	/// and create the schema if needed.
	pub async fn connect(url: &str) -> BuilderResult<Self> {
		let pool = SqlitePool::connect(url).await?;
		let repo = Self::new(pool);
		repo.ensure_schema().await?;
		Ok(repo)
	}

	/// Create the element table and its indexes if they do not exist.
	pub async fn ensure_schema(&self) -> BuilderResult<()> {
		for statement in SCHEMA {
			sqlx::query(statement).execute(&self.pool).await?;
		}
		Ok(())
	}

	fn map_row(row: &SqliteRow) -> BuilderResult<ElementRecord> {
		let element_type: String = row.try_get("element_type")?;
		let data: Option<String> = row.try_get("data")?;
		let data = match data {
			Some(raw) => serde_json::from_str(&raw)?,
			None => JsonValue::Null,
		};

		Ok(ElementRecord {
			id: row.try_get("id")?,
			key: row.try_get("element_key")?,
			page_id: row.try_get("page_id")?,
			element_type: element_type.parse()?,
			data,
			file_path: row.try_get("file_path")?,
			created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
			updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
		})
	}
}

#[async_trait]
impl ElementRepository for SqliteRepository {
	async fn find(&self, key: &str, page_id: Option<&str>) -> BuilderResult<Option<ElementRecord>> {
		let row = match page_id {
			Some(page) => {
				sqlx::query(
					"SELECT * FROM theme_elements
					 WHERE element_key = ? AND page_id = ?
					 ORDER BY id LIMIT 1",
				)
				.bind(key)
				.bind(page)
				.fetch_optional(&self.pool)
				.await?
			}
			None => {
				sqlx::query(
					"SELECT * FROM theme_elements
					 WHERE element_key = ?
					 ORDER BY id LIMIT 1",
				)
				.bind(key)
				.fetch_optional(&self.pool)
				.await?
			}
		};

		row.as_ref().map(Self::map_row).transpose()
	}

	async fn find_exact(
		&self,
		key: &str,
		page_id: Option<&str>,
	) -> BuilderResult<Option<ElementRecord>> {
		let row = match page_id {
			Some(page) => {
				sqlx::query(
					"SELECT * FROM theme_elements
					 WHERE element_key = ? AND page_id = ?
					 ORDER BY id LIMIT 1",
				)
				.bind(key)
				.bind(page)
				.fetch_optional(&self.pool)
				.await?
			}
			None => {
				sqlx::query(
					"SELECT * FROM theme_elements
					 WHERE element_key = ? AND page_id IS NULL
					 ORDER BY id LIMIT 1",
				)
				.bind(key)
				.fetch_optional(&self.pool)
				.await?
			}
		};

		row.as_ref().map(Self::map_row).transpose()
	}

	async fn find_all(
		&self,
		key: &str,
		page_id: Option<&str>,
	) -> BuilderResult<Vec<ElementRecord>> {
		let rows = match page_id {
			Some(page) => {
				sqlx::query(
					"SELECT * FROM theme_elements
					 WHERE element_key = ? AND page_id = ?
					 ORDER BY id",
				)
				.bind(key)
				.bind(page)
				.fetch_all(&self.pool)
				.await?
			}
			None => {
				sqlx::query(
					"SELECT * FROM theme_elements WHERE element_key = ? ORDER BY id",
				)
				.bind(key)
				.fetch_all(&self.pool)
				.await?
			}
		};

		rows.iter().map(Self::map_row).collect()
	}

	async fn upsert(&self, element: NewElement) -> BuilderResult<ElementRecord> {
		let now = Utc::now();
		let data = serde_json::to_string(&element.data)?;

		if let Some(existing) = self
			.find_exact(&element.key, element.page_id.as_deref())
			.await?
		{
			sqlx::query(
				"UPDATE theme_elements
				 SET element_type = ?, data = ?, file_path = NULL, updated_at = ?
				 WHERE id = ?",
			)
			.bind(element.element_type.as_str())
			.bind(&data)
			.bind(now)
			.bind(existing.id)
			.execute(&self.pool)
			.await?;

			return Ok(ElementRecord {
				element_type: element.element_type,
				data: element.data,
				file_path: None,
				updated_at: now,
				..existing
			});
		}

		let result = sqlx::query(
			"INSERT INTO theme_elements
			 (element_key, element_type, page_id, data, file_path, created_at, updated_at)
			 VALUES (?, ?, ?, ?, NULL, ?, ?)",
		)
		.bind(&element.key)
		.bind(element.element_type.as_str())
		.bind(element.page_id.as_deref())
		.bind(&data)
		.bind(now)
		.bind(now)
		.execute(&self.pool)
		.await?;

		Ok(ElementRecord {
			id: result.last_insert_rowid(),
			key: element.key,
			page_id: element.page_id,
			element_type: element.element_type,
			data: element.data,
			file_path: None,
			created_at: now,
			updated_at: now,
		})
	}

	async fn set_file_pointer(
		&self,
		id: i64,
		file_path: &str,
		data: JsonValue,
	) -> BuilderResult<()> {
		sqlx::query(
			"UPDATE theme_elements SET file_path = ?, data = ?, updated_at = ? WHERE id = ?",
		)
		.bind(file_path)
		.bind(serde_json::to_string(&data)?)
		.bind(Utc::now())
		.bind(id)
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	async fn delete(&self, id: i64) -> BuilderResult<()> {
		sqlx::query("DELETE FROM theme_elements WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn list_by_type(
		&self,
		element_type: ElementType,
		page_id: Option<&str>,
	) -> BuilderResult<Vec<ElementRecord>> {
		let rows = match page_id {
			Some(page) => {
				sqlx::query(
					"SELECT * FROM theme_elements
					 WHERE element_type = ? AND page_id = ?
					 ORDER BY id",
				)
				.bind(element_type.as_str())
				.bind(page)
				.fetch_all(&self.pool)
				.await?
			}
			None => {
				sqlx::query(
					"SELECT * FROM theme_elements WHERE element_type = ? ORDER BY id",
				)
				.bind(element_type.as_str())
				.fetch_all(&self.pool)
				.await?
			}
		};

		rows.iter().map(Self::map_row).collect()
	}

	async fn list_by_page(&self, page_id: &str) -> BuilderResult<Vec<ElementRecord>> {
		let rows = sqlx::query(
			"SELECT * FROM theme_elements WHERE page_id = ? ORDER BY id",
		)
		.bind(page_id)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(Self::map_row).collect()
	}
}
