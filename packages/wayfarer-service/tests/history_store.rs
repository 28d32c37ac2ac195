use std::{collections::BTreeSet, sync::Arc};

use wayfarer_domain::{ErrorKind, PreferencesPatch, SearchPreferences};
use wayfarer_service::{Error, HistoryStore};
use wayfarer_storage::{FileRecordStore, MemoryRecordStore, RecordKey};
use wayfarer_testkit::{place, temp_dir};

async fn memory_store() -> (Arc<MemoryRecordStore>, HistoryStore) {
	let records = Arc::new(MemoryRecordStore::new());
	let store = HistoryStore::open(records.clone()).await;

	(records, store)
}

fn queries(store: &HistoryStore) -> Vec<String> {
	store.history().into_iter().map(|item| item.query).collect()
}

#[tokio::test]
async fn empty_records_open_with_defaults() {
	let (_, store) = memory_store().await;

	assert!(store.history().is_empty());
	assert!(store.recent_searches().is_empty());
	assert!(store.favorites().is_empty());
	assert_eq!(store.preferences(), SearchPreferences::default());
	assert_eq!(store.last_error(), None);
}

#[tokio::test]
async fn history_deduplicates_case_insensitively() {
	let (_, store) = memory_store().await;

	store.add_search_to_history("Istanbul", 3).await;
	store.add_search_to_history("Kapadokya", 1).await;
	store.add_search_to_history("istanbul", 2).await;

	let history = store.history();

	assert_eq!(queries(&store), vec!["istanbul".to_string(), "Kapadokya".to_string()]);
	assert_eq!(history[0].result_count, 2);
	assert_eq!(history[0].search_count, 2);
	assert_eq!(
		store.recent_searches(),
		vec!["istanbul".to_string(), "Kapadokya".to_string(), "Istanbul".to_string()]
	);
}

#[tokio::test]
async fn blank_queries_are_ignored() {
	let (records, store) = memory_store().await;

	assert_eq!(store.add_search_to_history("   ", 4).await, None);
	assert!(store.history().is_empty());
	assert_eq!(records.write_count(), 0);
}

#[tokio::test]
async fn lowering_the_history_cap_truncates_immediately() {
	let (records, store) = memory_store().await;

	for query in ["a1", "a2", "a3", "a4", "a5"] {
		store.add_search_to_history(query, 1).await;
	}

	let preferences = store
		.update_preferences(PreferencesPatch { max_history_items: Some(3), ..Default::default() })
		.await;

	assert_eq!(preferences.max_history_items, 3);
	assert_eq!(queries(&store), vec!["a5".to_string(), "a4".to_string(), "a3".to_string()]);

	let persisted = records.record(RecordKey::SearchHistory).expect("History must be persisted.");
	let persisted: Vec<serde_json::Value> =
		serde_json::from_str(&persisted).expect("Persisted history must be JSON.");

	assert_eq!(persisted.len(), 3);

	store.add_search_to_history("a6", 1).await;

	assert_eq!(store.history().len(), 3);
}

#[tokio::test]
async fn history_can_be_removed_and_cleared() {
	let (_, store) = memory_store().await;
	let kapadokya =
		store.add_search_to_history("Kapadokya", 1).await.expect("Query must be recorded.");

	store.add_search_to_history("Efes", 1).await;

	assert!(store.remove_search_from_history(kapadokya.id).await);
	assert!(!store.remove_search_from_history(kapadokya.id).await);
	assert_eq!(queries(&store), vec!["Efes".to_string()]);

	store.clear_search_history().await;

	assert!(store.history().is_empty());
	assert!(store.recent_searches().is_empty());
}

#[tokio::test]
async fn popular_searches_rank_by_frequency() {
	let (_, store) = memory_store().await;

	for query in ["Istanbul", "Efes", "Istanbul", "Kapadokya", "Efes", "Istanbul"] {
		store.add_search_to_history(query, 1).await;
	}

	assert_eq!(
		store.popular_searches(),
		vec!["Istanbul".to_string(), "Efes".to_string(), "Kapadokya".to_string()]
	);
}

#[tokio::test]
async fn history_suggestions_skip_empty_searches() {
	let (_, store) = memory_store().await;

	store.add_search_to_history("Istanbul", 2).await;
	store.add_search_to_history("Istiklal", 0).await;

	assert_eq!(store.history_based_suggestions("ist"), vec!["Istanbul".to_string()]);
	assert!(store.history_based_suggestions("").is_empty());
}

#[tokio::test]
async fn favorites_upsert_and_remove() {
	let (records, store) = memory_store().await;
	let galata = place("galata").expect("Sample place must exist.");

	assert!(store.add_to_favorites(galata.clone(), Some("Sunset".to_string())).await);
	assert!(!store.add_to_favorites(galata.clone(), None).await);
	assert!(store.is_favorite("galata"));

	let favorites = store.favorites();

	assert_eq!(favorites.len(), 1);
	assert_eq!(favorites[0].notes.as_deref(), Some("Sunset"));

	let writes = records.write_count();

	assert!(!store.remove_from_favorites("efes").await);
	assert_eq!(records.write_count(), writes);
	assert!(store.remove_from_favorites("galata").await);
	assert!(!store.is_favorite("galata"));
}

#[tokio::test]
async fn write_failures_keep_memory_and_record_the_error() {
	let (records, store) = memory_store().await;

	records.set_fail_writes(true);

	let pamukkale = place("pamukkale").expect("Sample place must exist.");

	assert!(store.add_to_favorites(pamukkale, None).await);
	assert!(store.is_favorite("pamukkale"));

	let failure = store.take_last_error().expect("Write failure must be recorded.");

	assert_eq!(failure.kind, ErrorKind::PersistenceWriteFailed);
	assert_eq!(failure.record, Some(RecordKey::FavoritePlaces));
	assert_eq!(failure.to_error().kind(), ErrorKind::PersistenceWriteFailed);
	assert_eq!(store.last_error(), None);

	records.set_fail_writes(false);
	store.add_search_to_history("Pamukkale", 1).await;

	assert_eq!(store.last_error(), None);
	assert!(records.record(RecordKey::SearchHistory).is_some());
}

#[tokio::test]
async fn unreadable_records_fall_back_to_defaults() {
	let galata = place("galata").expect("Sample place must exist.");
	let favorites = format!(
		r#"[{{"place":{},"added_at":"2026-05-01T11:00:00Z"}}]"#,
		serde_json::to_string(&galata).expect("Place must encode.")
	);
	let records = Arc::new(
		MemoryRecordStore::new()
			.with_record(RecordKey::SearchHistory, "not json")
			.with_record(RecordKey::FavoritePlaces, favorites),
	);
	let store = HistoryStore::open(records).await;
	let failure = store.last_error().expect("Read failure must be recorded.");

	assert!(store.history().is_empty());
	assert!(store.is_favorite("galata"));
	assert_eq!(failure.kind, ErrorKind::PersistenceReadFailed);
	assert_eq!(failure.record, Some(RecordKey::SearchHistory));
}

#[tokio::test]
async fn stored_history_drops_case_duplicates_on_open() {
	let history = r#"[
		{"id":"6f1c2a9e-3b7d-4c55-9a61-0d1f3e2b4c10","query":"ISTANBUL","timestamp":"2026-05-02T09:00:00Z","result_count":1,"search_count":1},
		{"id":"0b7e4d2c-91aa-4f6e-8c3d-5e2f1a6b7c80","query":"Efes","timestamp":"2026-05-01T12:00:00Z","result_count":2,"search_count":1},
		{"id":"c3a5e7f9-2d4b-4a6c-8e0f-1a3b5c7d9e21","query":"Istanbul","timestamp":"2026-05-01T10:00:00Z","result_count":4,"search_count":3}
	]"#;
	let preferences = r#"{"search_radius_km":-3.0}"#;
	let records = Arc::new(
		MemoryRecordStore::new()
			.with_record(RecordKey::SearchHistory, history)
			.with_record(RecordKey::Preferences, preferences),
	);
	let store = HistoryStore::open(records).await;

	assert_eq!(queries(&store), vec!["ISTANBUL".to_string(), "Efes".to_string()]);
	assert_eq!(store.popular_searches(), vec!["ISTANBUL".to_string(), "Efes".to_string()]);
	assert_eq!(store.preferences().search_radius_km, 50.0);
	assert_eq!(store.last_error(), None);
}

#[tokio::test]
async fn unavailable_storage_opens_empty() {
	let records = Arc::new(MemoryRecordStore::new());

	records.set_fail_reads(true);

	let store = HistoryStore::open(records.clone()).await;

	assert!(store.history().is_empty());
	assert_eq!(store.preferences(), SearchPreferences::default());
	assert_eq!(
		store.last_error().map(|failure| failure.kind),
		Some(ErrorKind::PersistenceReadFailed)
	);
}

#[tokio::test]
async fn records_survive_reopening_from_disk() {
	let dir = temp_dir("wayfarer_history").expect("Failed to create temp dir.");
	let store = HistoryStore::open(Arc::new(FileRecordStore::new(dir.path()))).await;

	store.add_search_to_history("Kapadokya", 1).await;
	store
		.add_to_favorites(place("efes").expect("Sample place must exist."), Some("Theatre".into()))
		.await;
	store
		.update_preferences(PreferencesPatch {
			search_radius_km: Some(25.0),
			preferred_categories: Some(BTreeSet::from(["museum".to_string()])),
			..Default::default()
		})
		.await;

	let reopened = HistoryStore::open(Arc::new(FileRecordStore::new(dir.path()))).await;

	assert_eq!(reopened.history(), store.history());
	assert_eq!(reopened.recent_searches(), vec!["Kapadokya".to_string()]);
	assert_eq!(reopened.favorites(), store.favorites());
	assert_eq!(reopened.preferences().search_radius_km, 25.0);
	assert_eq!(reopened.last_error(), None);
}

#[tokio::test]
async fn export_then_import_reproduces_state() {
	let (_, source) = memory_store().await;

	source.add_search_to_history("Istanbul", 4).await;
	source.add_search_to_history("Sumela", 1).await;
	source.add_to_favorites(place("sumela").expect("Sample place must exist."), None).await;
	source
		.update_preferences(PreferencesPatch { enable_suggestions: Some(false), ..Default::default() })
		.await;

	let exported = source.export_data().expect("Export must succeed.");
	let (records, target) = memory_store().await;

	target.import_data(&exported).await.expect("Import must succeed.");

	assert_eq!(target.history(), source.history());
	assert_eq!(target.recent_searches(), source.recent_searches());
	assert_eq!(target.favorites(), source.favorites());
	assert_eq!(target.preferences(), source.preferences());

	for key in RecordKey::ALL {
		assert!(records.record(key).is_some(), "Record {key} must be persisted.");
	}
}

#[tokio::test]
async fn invalid_radius_updates_keep_exports_importable() {
	let (_, source) = memory_store().await;

	for radius in [-5.0, f64::NAN, f64::INFINITY] {
		let preferences = source
			.update_preferences(PreferencesPatch {
				search_radius_km: Some(radius),
				max_history_items: Some(20),
				..Default::default()
			})
			.await;

		assert_eq!(preferences.search_radius_km, 50.0);
		assert_eq!(preferences.max_history_items, 20);
	}

	let exported = source.export_data().expect("Export must succeed.");
	let (_, target) = memory_store().await;

	target.import_data(&exported).await.expect("Import must succeed.");

	assert_eq!(target.preferences(), source.preferences());
}

#[tokio::test]
async fn rejected_import_leaves_state_untouched() {
	let (_, store) = memory_store().await;

	store.add_search_to_history("Antalya", 2).await;

	let before = store.history();
	let result = store.import_data(r#"{"version":2}"#).await;

	assert!(matches!(result, Err(Error::ImportValidation { .. })));
	assert_eq!(store.history(), before);
	assert_eq!(
		store.last_error().map(|failure| failure.kind),
		Some(ErrorKind::ImportValidationFailed)
	);
}

#[tokio::test]
async fn clear_all_data_resets_everything() {
	let (records, store) = memory_store().await;

	store.add_search_to_history("Antalya", 2).await;
	store.add_to_favorites(place("antalya").expect("Sample place must exist."), None).await;
	store
		.update_preferences(PreferencesPatch { max_history_items: Some(5), ..Default::default() })
		.await;
	store.clear_all_data().await;

	assert!(store.history().is_empty());
	assert!(store.favorites().is_empty());
	assert_eq!(store.preferences(), SearchPreferences::default());
	assert_eq!(records.record(RecordKey::FavoritePlaces).as_deref(), Some("[]"));
}
