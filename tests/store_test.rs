//! Element store integration tests: the three-tier read/write path.

use pagewright::prelude::*;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
	store: Arc<ElementStore>,
	repo: Arc<InMemoryRepository>,
	cache: Arc<InMemoryCache>,
	dir: TempDir,
}

fn fixture() -> Fixture {
	let dir = tempfile::tempdir().unwrap();
	let repo = Arc::new(InMemoryRepository::new());
	let cache = Arc::new(InMemoryCache::new());
	let files = Arc::new(LocalFileStore::new(dir.path()).unwrap());

	let store = Arc::new(ElementStore::new(
		repo.clone(),
		cache.clone(),
		files.clone(),
	));

	Fixture {
		store,
		repo,
		cache,
		dir,
	}
}

#[tokio::test]
async fn save_then_get_round_trips_inline() {
	let fx = fixture();

	fx.store
		.save("hero", ElementType::General, json!({"title": "Welcome"}), None, false)
		.await
		.unwrap();

	// Straight after a save the cache is hot
	let resolved = fx.store.get("hero", None).await.unwrap().unwrap();
	assert_eq!(resolved.data, json!({"title": "Welcome"}));
	assert_eq!(resolved.source, ResolvedSource::Cache);

	// Cold cache reads resolve from the record's inline data
	fx.cache
		.forget(&ElementStore::cache_key("hero", None))
		.await
		.unwrap();
	let resolved = fx.store.get("hero", None).await.unwrap().unwrap();
	assert_eq!(resolved.data, json!({"title": "Welcome"}));
	assert_eq!(resolved.source, ResolvedSource::Inline);
}

#[tokio::test]
async fn save_then_get_round_trips_through_file() {
	let fx = fixture();

	let record = fx
		.store
		.save("hero", ElementType::Component, json!({"title": "Welcome"}), None, true)
		.await
		.unwrap();

	// The durable record holds only the externalization sentinel
	assert_eq!(record.data, json!({"_stored_in_file": true}));
	let path = record.file_path.clone().unwrap();
	assert!(fx.dir.path().join(&path).is_file());

	fx.cache
		.forget(&ElementStore::cache_key("hero", None))
		.await
		.unwrap();
	let resolved = fx.store.get("hero", None).await.unwrap().unwrap();
	assert_eq!(resolved.data, json!({"title": "Welcome"}));
	assert_eq!(resolved.source, ResolvedSource::File);
}

#[tokio::test]
async fn file_names_are_deterministic_md5_of_key_and_page() {
	assert_eq!(
		ElementStore::file_name("hero_banner", None),
		"2adbbe29ec8232afa5c1f530d4ecc033"
	);
	assert_eq!(
		ElementStore::file_name("hero_banner", Some("home")),
		"c7408e2e43608c6e01afe471abb0cdf6"
	);
}

#[tokio::test]
async fn hero_banner_scenario_writes_to_deterministic_path() {
	let fx = fixture();

	fx.store
		.save(
			"hero_banner",
			ElementType::Component,
			json!({"title": "Welcome"}),
			None,
			true,
		)
		.await
		.unwrap();

	let expected = fx
		.dir
		.path()
		.join("theme_elements/component/2adbbe29ec8232afa5c1f530d4ecc033.json");
	assert!(expected.is_file());

	let on_disk: JsonValue =
		serde_json::from_slice(&std::fs::read(&expected).unwrap()).unwrap();
	assert_eq!(on_disk, json!({"title": "Welcome"}));
}

#[tokio::test]
async fn resave_keeps_one_record_and_removes_previous_file() {
	let fx = fixture();

	let first = fx
		.store
		.save("hero", ElementType::Component, json!({"v": 1}), None, true)
		.await
		.unwrap();
	let file = fx.dir.path().join(first.file_path.as_deref().unwrap());
	assert!(file.is_file());

	// Re-save without file storage: the old file must not be orphaned
	let second = fx
		.store
		.save("hero", ElementType::Component, json!({"v": 2}), None, false)
		.await
		.unwrap();

	assert_eq!(first.id, second.id);
	assert_eq!(fx.repo.len().await, 1);
	assert_eq!(second.file_path, None);
	assert!(!file.exists());
}

#[tokio::test]
async fn resave_with_file_overwrites_in_place() {
	let fx = fixture();

	let first = fx
		.store
		.save("hero", ElementType::Component, json!({"v": 1}), None, true)
		.await
		.unwrap();
	let second = fx
		.store
		.save("hero", ElementType::Component, json!({"v": 2}), None, true)
		.await
		.unwrap();

	assert_eq!(first.file_path, second.file_path);
	assert_eq!(fx.repo.len().await, 1);

	let on_disk: JsonValue = serde_json::from_slice(
		&std::fs::read(fx.dir.path().join(second.file_path.as_deref().unwrap())).unwrap(),
	)
	.unwrap();
	assert_eq!(on_disk, json!({"v": 2}));
}

#[tokio::test]
async fn same_key_on_different_pages_are_distinct_records() {
	let fx = fixture();

	fx.store
		.save("hero", ElementType::Page, json!({"p": "home"}), Some("home"), false)
		.await
		.unwrap();
	fx.store
		.save("hero", ElementType::Page, json!({"p": "about"}), Some("about"), false)
		.await
		.unwrap();

	assert_eq!(fx.repo.len().await, 2);

	let home = fx.store.get("hero", Some("home")).await.unwrap().unwrap();
	assert_eq!(home.data, json!({"p": "home"}));
	let about = fx.store.get("hero", Some("about")).await.unwrap().unwrap();
	assert_eq!(about.data, json!({"p": "about"}));
}

#[tokio::test]
async fn delete_invalidates_cache_so_reads_go_durable() {
	let fx = fixture();

	fx.store
		.save("hero", ElementType::General, json!({"a": 1}), None, false)
		.await
		.unwrap();

	// Cache is hot: this read never touches the repository
	let before = fx.repo.find_count();
	fx.store.get("hero", None).await.unwrap();
	assert_eq!(fx.repo.find_count(), before);

	assert!(fx.store.delete("hero", None).await.unwrap());
	assert!(!fx.cache.has_key(&ElementStore::cache_key("hero", None)).await);

	// The next read must go through to durable storage
	let resolved = fx.store.get("hero", None).await.unwrap();
	assert!(resolved.is_none());
	assert_eq!(fx.repo.find_count(), before + 1);
}

#[tokio::test]
async fn delete_removes_record_and_file() {
	let fx = fixture();

	let record = fx
		.store
		.save("hero", ElementType::Component, json!({"a": 1}), None, true)
		.await
		.unwrap();
	let file = fx.dir.path().join(record.file_path.as_deref().unwrap());

	assert!(fx.store.delete("hero", None).await.unwrap());
	assert!(fx.repo.is_empty().await);
	assert!(!file.exists());
}

#[tokio::test]
async fn delete_nonexistent_key_returns_false() {
	let fx = fixture();
	assert!(!fx.store.delete("ghost", None).await.unwrap());
}

#[tokio::test]
async fn missing_file_degrades_to_inline_data() {
	let fx = fixture();

	let record = fx
		.store
		.save("hero", ElementType::Component, json!({"title": "Welcome"}), None, true)
		.await
		.unwrap();

	// Delete the file out-of-band; the pointer is now dangling
	std::fs::remove_file(fx.dir.path().join(record.file_path.as_deref().unwrap())).unwrap();
	fx.cache
		.forget(&ElementStore::cache_key("hero", None))
		.await
		.unwrap();

	let resolved = fx.store.get("hero", None).await.unwrap().unwrap();
	assert_eq!(resolved.source, ResolvedSource::InlineFallback);
	assert_eq!(resolved.data, json!({"_stored_in_file": true}));
}

#[tokio::test]
async fn corrupt_file_degrades_to_inline_data() {
	let fx = fixture();

	let record = fx
		.store
		.save("hero", ElementType::Component, json!({"title": "Welcome"}), None, true)
		.await
		.unwrap();

	std::fs::write(
		fx.dir.path().join(record.file_path.as_deref().unwrap()),
		b"not json {",
	)
	.unwrap();
	fx.cache
		.forget(&ElementStore::cache_key("hero", None))
		.await
		.unwrap();

	let resolved = fx.store.get("hero", None).await.unwrap().unwrap();
	assert_eq!(resolved.source, ResolvedSource::InlineFallback);
}

#[tokio::test]
async fn get_absent_key_is_none_not_error() {
	let fx = fixture();
	assert!(fx.store.get("ghost", None).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_document_is_distinct_from_absent() {
	let fx = fixture();

	fx.store
		.save("blank", ElementType::General, json!({}), None, false)
		.await
		.unwrap();

	let resolved = fx.store.get("blank", None).await.unwrap();
	assert_eq!(resolved.unwrap().data, json!({}));
}

#[tokio::test]
async fn string_payloads_decode_when_json() {
	let fx = fixture();

	fx.store
		.save("hero", ElementType::General, r#"{"title":"Welcome"}"#, None, false)
		.await
		.unwrap();
	let resolved = fx.store.get("hero", None).await.unwrap().unwrap();
	assert_eq!(resolved.data, json!({"title": "Welcome"}));

	fx.store
		.save("motto", ElementType::General, "just words", None, false)
		.await
		.unwrap();
	let resolved = fx.store.get("motto", None).await.unwrap().unwrap();
	assert_eq!(resolved.data, json!("just words"));
}

#[tokio::test]
async fn delete_by_type_removes_exactly_that_type() {
	let fx = fixture();

	fx.store
		.save("hero", ElementType::Component, json!({"a": 1}), None, true)
		.await
		.unwrap();
	fx.store
		.save("footer", ElementType::Component, json!({"b": 2}), None, false)
		.await
		.unwrap();
	fx.store
		.save("intro", ElementType::Page, json!({"c": 3}), Some("home"), false)
		.await
		.unwrap();

	let deleted = fx
		.store
		.delete_by_type(ElementType::Component, None)
		.await
		.unwrap();
	assert_eq!(deleted, 2);

	// Exactly the component cache entries are gone
	assert!(!fx.cache.has_key(&ElementStore::cache_key("hero", None)).await);
	assert!(!fx.cache.has_key(&ElementStore::cache_key("footer", None)).await);
	assert!(
		fx.cache
			.has_key(&ElementStore::cache_key("intro", Some("home")))
			.await
	);

	let remaining = fx.store.list_by_page("home").await.unwrap();
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0].key, "intro");
	assert_eq!(fx.repo.len().await, 1);
}

#[tokio::test]
async fn list_by_type_and_page_scope() {
	let fx = fixture();

	fx.store
		.save("hero", ElementType::Component, json!({}), Some("home"), false)
		.await
		.unwrap();
	fx.store
		.save("hero", ElementType::Component, json!({}), Some("about"), false)
		.await
		.unwrap();
	fx.store
		.save("nav", ElementType::Global, json!({}), None, false)
		.await
		.unwrap();

	let components = fx
		.store
		.list_by_type(ElementType::Component, None)
		.await
		.unwrap();
	assert_eq!(components.len(), 2);

	let scoped = fx
		.store
		.list_by_type(ElementType::Component, Some("home"))
		.await
		.unwrap();
	assert_eq!(scoped.len(), 1);
	assert_eq!(scoped[0].page_id.as_deref(), Some("home"));

	let on_home = fx.store.list_by_page("home").await.unwrap();
	assert_eq!(on_home.len(), 1);
}

#[tokio::test]
async fn concurrent_saves_to_one_key_serialize() {
	let fx = fixture();

	let mut handles = Vec::new();
	for i in 0..10 {
		let store = fx.store.clone();
		handles.push(tokio::spawn(async move {
			store
				.save("hero", ElementType::Component, json!({"v": i}), None, true)
				.await
				.unwrap();
		}));
	}
	for handle in handles {
		handle.await.unwrap();
	}

	// Last writer wins: one record, one file, consistent pointer
	assert_eq!(fx.repo.len().await, 1);
	let record = fx.repo.find("hero", None).await.unwrap().unwrap();
	let file = fx.dir.path().join(record.file_path.as_deref().unwrap());
	assert!(file.is_file());
}
