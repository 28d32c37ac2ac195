use std::sync::Arc;

use serde_json::json;
use time::macros::datetime;

use wayfarer_domain::{FavoritePlace, HistoryItem, PlaceRef, SearchPreferences, history};
use wayfarer_storage::{
	Error, FileRecordStore, MemoryRecordStore, RecordKey, RecordStore, SNAPSHOT_VERSION, Snapshot,
	snapshot,
};
use wayfarer_testkit::temp_dir;

fn sample_history() -> Vec<HistoryItem> {
	let mut items = Vec::new();

	history::record_search(&mut items, "Kapadokya", 1, datetime!(2026-05-01 10:00 UTC), 50);
	history::record_search(&mut items, "Istanbul", 4, datetime!(2026-05-01 10:05 UTC), 50);

	items
}

fn sample_snapshot() -> Snapshot {
	Snapshot {
		version: SNAPSHOT_VERSION,
		exported_at: Some(datetime!(2026-05-02 08:30 UTC)),
		search_history: sample_history(),
		recent_searches: vec!["Istanbul".to_string(), "Kapadokya".to_string()],
		favorite_places: vec![FavoritePlace {
			place: PlaceRef::new("galata", "Galata Kulesi", "landmark").with_region("Istanbul"),
			added_at: datetime!(2026-05-01 11:00 UTC),
			notes: Some("Sunset".to_string()),
		}],
		preferences: SearchPreferences::default(),
	}
}

fn expect_invalid(raw: &str, needle: &str) {
	match snapshot::decode(raw) {
		Err(Error::InvalidSnapshot(message)) => assert!(
			message.contains(needle),
			"Expected message containing {needle:?}, got {message:?}."
		),
		other => panic!("Expected invalid snapshot, got {other:?}."),
	}
}

#[tokio::test]
async fn file_store_round_trips_records() {
	let dir = temp_dir("wayfarer_storage").expect("Failed to create temp dir.");
	let store = FileRecordStore::new(dir.path().join("data"));

	store
		.save(RecordKey::RecentSearches, r#"["Istanbul"]"#.to_string())
		.await
		.expect("Failed to save record.");

	let loaded = store.load(RecordKey::RecentSearches).await.expect("Failed to load record.");

	assert_eq!(loaded.as_deref(), Some(r#"["Istanbul"]"#));
	assert!(store.path_for(RecordKey::RecentSearches).ends_with("recent_searches.json"));
	assert!(!dir.path().join("data").join("recent_searches.json.tmp").exists());
}

#[tokio::test]
async fn file_store_reports_missing_records_as_absent() {
	let dir = temp_dir("wayfarer_storage").expect("Failed to create temp dir.");
	let store = FileRecordStore::new(dir.path());

	for key in RecordKey::ALL {
		assert_eq!(store.load(key).await.expect("Failed to load record."), None);
	}
}

#[tokio::test]
async fn file_store_overwrites_previous_payload() {
	let dir = temp_dir("wayfarer_storage").expect("Failed to create temp dir.");
	let store = FileRecordStore::new(dir.path());

	store.save(RecordKey::FavoritePlaces, "[]".to_string()).await.expect("Failed to save.");
	store
		.save(RecordKey::FavoritePlaces, r#"[{"x":1}]"#.to_string())
		.await
		.expect("Failed to save.");

	let loaded = store.load(RecordKey::FavoritePlaces).await.expect("Failed to load record.");

	assert_eq!(loaded.as_deref(), Some(r#"[{"x":1}]"#));
}

#[tokio::test]
async fn memory_store_injects_failures() {
	let store = Arc::new(
		MemoryRecordStore::new().with_record(RecordKey::SearchHistory, "[]".to_string()),
	);

	store.set_fail_reads(true);

	assert!(matches!(store.load(RecordKey::SearchHistory).await, Err(Error::Unavailable(_))));

	store.set_fail_reads(false);
	store.set_fail_writes(true);

	assert!(store.save(RecordKey::Preferences, "{}".to_string()).await.is_err());
	assert_eq!(store.write_count(), 0);
	assert_eq!(store.record(RecordKey::Preferences), None);

	store.set_fail_writes(false);
	store.save(RecordKey::Preferences, "{}".to_string()).await.expect("Failed to save.");

	assert_eq!(store.write_count(), 1);
	assert_eq!(store.record(RecordKey::SearchHistory).as_deref(), Some("[]"));
}

#[test]
fn snapshot_survives_encoding() {
	let original = sample_snapshot();
	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");
	let decoded = snapshot::decode(&raw).expect("Failed to decode snapshot.");

	assert_eq!(decoded, original);
}

#[test]
fn snapshot_without_exported_at_is_accepted() {
	let mut value = serde_json::to_value(sample_snapshot()).expect("Failed to encode snapshot.");

	value.as_object_mut().expect("Snapshot must be an object.").remove("exported_at");

	let decoded = snapshot::decode(&value.to_string()).expect("Failed to decode snapshot.");

	assert_eq!(decoded.exported_at, None);
}

#[test]
fn snapshot_rejects_non_json() {
	expect_invalid("not json", "not JSON");
}

#[test]
fn snapshot_requires_version() {
	let mut value = serde_json::to_value(sample_snapshot()).expect("Failed to encode snapshot.");

	value.as_object_mut().expect("Snapshot must be an object.").remove("version");

	expect_invalid(&value.to_string(), "Missing version");
}

#[test]
fn snapshot_rejects_unknown_version() {
	let mut value = serde_json::to_value(sample_snapshot()).expect("Failed to encode snapshot.");

	value["version"] = json!(2);

	expect_invalid(&value.to_string(), "Unsupported version 2");
}

#[test]
fn snapshot_rejects_unknown_fields() {
	let mut value = serde_json::to_value(sample_snapshot()).expect("Failed to encode snapshot.");

	value["theme"] = json!("dark");

	expect_invalid(&value.to_string(), "Malformed snapshot");
}

#[test]
fn snapshot_rejects_duplicate_history_ids() {
	let mut original = sample_snapshot();
	let duplicate = original.search_history[0].clone();

	original.search_history.push(duplicate);

	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");

	expect_invalid(&raw, "Duplicate history id");
}

#[test]
fn snapshot_rejects_case_duplicate_history() {
	let mut original = sample_snapshot();

	assert_eq!(original.search_history[0].query, "Istanbul");

	original.search_history[1].query = "ISTANBUL".to_string();

	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");

	expect_invalid(&raw, "Duplicate history query \"ISTANBUL\"");
}

#[test]
fn snapshot_rejects_duplicate_recent_searches() {
	let mut original = sample_snapshot();

	original.recent_searches.push("Istanbul".to_string());

	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");

	expect_invalid(&raw, "Duplicate recent search \"Istanbul\"");
}

#[test]
fn snapshot_rejects_blank_history_query() {
	let mut original = sample_snapshot();

	original.search_history[0].query = "  ".to_string();

	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");

	expect_invalid(&raw, "History query must be non-empty");
}

#[test]
fn snapshot_rejects_oversized_recent_searches() {
	let mut original = sample_snapshot();

	original.recent_searches = (0..11).map(|n| format!("query {n}")).collect();

	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");

	expect_invalid(&raw, "Recent searches exceed 10");
}

#[test]
fn snapshot_rejects_duplicate_favorites() {
	let mut original = sample_snapshot();
	let duplicate = original.favorite_places[0].clone();

	original.favorite_places.push(duplicate);

	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");

	expect_invalid(&raw, "Duplicate favorite place id galata");
}

#[test]
fn snapshot_rejects_negative_radius() {
	let mut original = sample_snapshot();

	original.preferences.search_radius_km = -1.0;

	let raw = snapshot::encode(&original).expect("Failed to encode snapshot.");

	expect_invalid(&raw, "search_radius_km");
}
