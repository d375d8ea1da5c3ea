//! # pagewright
//!
//! A page-builder toolkit for CMS-style applications: define reusable page
//! elements, expose them as editable admin forms, and persist the edited
//! configuration so the live site renders from stored data instead of
//! hard-coded markup.
//!
//! ## Architecture
//!
//! ```text
//! pagewright
//! ├── store      - three-tier read/write path (cache → record → file)
//! ├── element    - builder element contract + registry
//! ├── builder    - admin forms and the page builder
//! ├── cache      - cache boundary (in-memory backend)
//! ├── repository - durable record boundary (sqlite, in-memory backends)
//! ├── storage    - file storage boundary (local backend)
//! ├── model      - element types, records, payloads, resolution results
//! └── config     - TTL and file-namespace configuration
//! ```
//!
//! Reads resolve cache first, then the durable record, then the record's
//! external file; a missing or corrupt file degrades to the inline copy
//! instead of failing. Writes upsert by `(key, page_id)`, externalize
//! large payloads to deterministically named files, and refresh the cache.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewright::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(ElementStore::new(
//!     Arc::new(SqliteRepository::connect("sqlite://elements.db?mode=rwc").await?),
//!     Arc::new(InMemoryCache::new()),
//!     Arc::new(LocalFileStore::new("/var/lib/app/storage")?),
//! ));
//!
//! let hero = Element::new(
//!     ElementConfig::new("hero_banner", ElementType::Component).with_cache(),
//! );
//! hero.set_element_data(&store, serde_json::json!({"title": "Welcome"}), None).await?;
//! let data = hero.element_data(&store, None).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod builder;
pub mod cache;
pub mod config;
pub mod element;
pub mod error;
pub mod model;
pub mod repository;
pub mod storage;
pub mod store;

pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::builder::{BuilderForm, FieldKind, FormField, PageBuilder};
	pub use crate::cache::{ElementCache, InMemoryCache};
	pub use crate::config::BuilderConfig;
	pub use crate::element::{BuilderElement, Element, ElementConfig, ElementRegistry};
	pub use crate::error::{BuilderError, BuilderResult};
	pub use crate::model::{
		ElementPayload, ElementRecord, ElementType, ResolvedElement, ResolvedSource,
	};
	pub use crate::repository::{ElementRepository, InMemoryRepository, SqliteRepository};
	pub use crate::storage::{FileStore, LocalFileStore};
	pub use crate::store::ElementStore;
}
