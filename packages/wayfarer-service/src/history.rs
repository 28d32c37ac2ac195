//! Durable search history, recent searches, favorites, and preferences.
//!
//! Reads are served from memory. Every mutation updates memory first and
//! then writes the affected records through to a [`RecordStore`]. Writes are
//! serialized and each one snapshots the state after taking the write gate,
//! so the last write to land always reflects the latest mutation.
//!
//! Persistence failures never surface as errors from mutations; they are
//! logged and recorded as the store's last error.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use uuid::Uuid;

use wayfarer_domain::{
	ErrorKind, FavoritePlace, HistoryItem, PlaceRef, PreferencesPatch, RecentSearches,
	SearchPreferences, favorites, history, preferences::is_valid_radius,
};
use wayfarer_storage::{RecordKey, RecordStore, SNAPSHOT_VERSION, Snapshot, snapshot};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceFailure {
	pub kind: ErrorKind,
	/// `None` for failures that are not tied to one record, such as a rejected
	/// import.
	pub record: Option<RecordKey>,
	pub message: String,
	pub at: OffsetDateTime,
}
impl PersistenceFailure {
	pub fn to_error(&self) -> Error {
		let record = self.record.map(|key| key.as_str()).unwrap_or("snapshot").to_string();
		let message = self.message.clone();

		match self.kind {
			ErrorKind::PersistenceReadFailed => Error::PersistenceRead { record, message },
			ErrorKind::ImportValidationFailed => Error::ImportValidation { message },
			ErrorKind::SearchFailed => Error::SearchFailed { message },
			ErrorKind::PersistenceWriteFailed => Error::PersistenceWrite { record, message },
		}
	}
}

#[derive(Debug, Clone, Default)]
struct StoreState {
	history: Vec<HistoryItem>,
	recent: RecentSearches,
	favorites: Vec<FavoritePlace>,
	preferences: SearchPreferences,
}

pub struct HistoryStore {
	records: Arc<dyn RecordStore>,
	state: Mutex<StoreState>,
	write_gate: tokio::sync::Mutex<()>,
	last_error: Mutex<Option<PersistenceFailure>>,
}
impl HistoryStore {
	/// Loads every record. A record that cannot be read or decoded falls back
	/// to its default and is reported through [`HistoryStore::last_error`].
	pub async fn open(records: Arc<dyn RecordStore>) -> Self {
		let mut failure = None;
		let mut history: Vec<HistoryItem> =
			load_record(records.as_ref(), RecordKey::SearchHistory, &mut failure).await;
		let recent = load_record(records.as_ref(), RecordKey::RecentSearches, &mut failure).await;
		let favorites: Vec<FavoritePlace> =
			load_record(records.as_ref(), RecordKey::FavoritePlaces, &mut failure).await;
		let mut preferences: SearchPreferences =
			load_record(records.as_ref(), RecordKey::Preferences, &mut failure).await;
		let duplicates = history::dedupe_history(&mut history);

		if duplicates > 0 {
			tracing::warn!(duplicates, "Dropped repeated queries from stored history.");
		}
		if !is_valid_radius(preferences.search_radius_km) {
			tracing::warn!(
				radius = preferences.search_radius_km,
				"Stored search radius is invalid; using the default."
			);

			preferences.search_radius_km = SearchPreferences::default().search_radius_km;
		}

		history.truncate(preferences.max_history_items);

		tracing::info!(
			history = history.len(),
			favorites = favorites.len(),
			degraded = failure.is_some(),
			"History store loaded."
		);

		Self {
			records,
			state: Mutex::new(StoreState { history, recent, favorites, preferences }),
			write_gate: tokio::sync::Mutex::new(()),
			last_error: Mutex::new(failure),
		}
	}

	pub fn history(&self) -> Vec<HistoryItem> {
		self.lock_state().history.clone()
	}

	pub fn recent_searches(&self) -> Vec<String> {
		self.lock_state().recent.as_slice().to_vec()
	}

	pub fn favorites(&self) -> Vec<FavoritePlace> {
		self.lock_state().favorites.clone()
	}

	pub fn preferences(&self) -> SearchPreferences {
		self.lock_state().preferences.clone()
	}

	pub fn is_favorite(&self, place_id: &str) -> bool {
		self.lock_state().favorites.iter().any(|favorite| favorite.place.id == place_id)
	}

	pub fn history_based_suggestions(&self, query: &str) -> Vec<String> {
		history::history_based_suggestions(
			&self.lock_state().history,
			query,
			history::MAX_HISTORY_SUGGESTIONS,
		)
	}

	pub fn popular_searches(&self) -> Vec<String> {
		history::popular_searches(&self.lock_state().history, history::MAX_POPULAR_SEARCHES)
	}

	/// The most recent persistence failure, if any.
	pub fn last_error(&self) -> Option<PersistenceFailure> {
		self.lock_last_error().clone()
	}

	pub fn take_last_error(&self) -> Option<PersistenceFailure> {
		self.lock_last_error().take()
	}

	/// Records a completed search. Blank queries are ignored.
	pub async fn add_search_to_history(&self, query: &str, result_count: u32) -> Option<HistoryItem> {
		let query = query.trim();

		if query.is_empty() {
			return None;
		}

		let item = {
			let mut state = self.lock_state();
			let max_items = state.preferences.max_history_items;
			let item = history::record_search(
				&mut state.history,
				query,
				result_count,
				OffsetDateTime::now_utc(),
				max_items,
			);

			state.recent.push(query);

			item
		};

		tracing::debug!(query = %item.query, result_count, "Search recorded.");

		self.persist(&[RecordKey::SearchHistory, RecordKey::RecentSearches]).await;

		Some(item)
	}

	pub async fn clear_search_history(&self) {
		{
			let mut state = self.lock_state();

			state.history.clear();
			state.recent.clear();
		}

		self.persist(&[RecordKey::SearchHistory, RecordKey::RecentSearches]).await;
	}

	/// Returns `false` when no entry has `id`.
	pub async fn remove_search_from_history(&self, id: Uuid) -> bool {
		let removed = {
			let mut state = self.lock_state();
			let before = state.history.len();

			state.history.retain(|item| item.id != id);

			state.history.len() != before
		};

		if removed {
			self.persist(&[RecordKey::SearchHistory]).await;
		}

		removed
	}

	/// Returns `true` when a new favorite was created; re-adding an existing
	/// place only updates its notes.
	pub async fn add_to_favorites(&self, place: PlaceRef, notes: Option<String>) -> bool {
		let notes = notes.map(|notes| notes.trim().to_string()).filter(|notes| !notes.is_empty());
		let inserted = favorites::upsert_favorite(
			&mut self.lock_state().favorites,
			place,
			notes,
			OffsetDateTime::now_utc(),
		);

		self.persist(&[RecordKey::FavoritePlaces]).await;

		inserted
	}

	/// Returns `false` when the place was not a favorite.
	pub async fn remove_from_favorites(&self, place_id: &str) -> bool {
		let removed = favorites::remove_favorite(&mut self.lock_state().favorites, place_id);

		if removed {
			self.persist(&[RecordKey::FavoritePlaces]).await;
		}

		removed
	}

	/// Merges `patch` into the current preferences. Lowering the history cap
	/// truncates history immediately. A negative or non-finite radius is
	/// ignored and the current radius is kept.
	pub async fn update_preferences(&self, mut patch: PreferencesPatch) -> SearchPreferences {
		if let Some(radius) = patch.search_radius_km
			&& !is_valid_radius(radius)
		{
			tracing::warn!(radius, "Invalid search radius ignored.");

			patch.search_radius_km = None;
		}

		let (preferences, truncated) = {
			let mut state = self.lock_state();
			let preferences = patch.apply(&state.preferences);
			let before = state.history.len();

			state.history.truncate(preferences.max_history_items);
			state.preferences = preferences.clone();

			(preferences, state.history.len() != before)
		};

		if truncated {
			self.persist(&[RecordKey::Preferences, RecordKey::SearchHistory]).await;
		} else {
			self.persist(&[RecordKey::Preferences]).await;
		}

		preferences
	}

	/// Serializes every record into a versioned snapshot.
	pub fn export_data(&self) -> Result<String> {
		let snapshot = {
			let state = self.lock_state();

			Snapshot {
				version: SNAPSHOT_VERSION,
				exported_at: Some(OffsetDateTime::now_utc()),
				search_history: state.history.clone(),
				recent_searches: state.recent.as_slice().to_vec(),
				favorite_places: state.favorites.clone(),
				preferences: state.preferences.clone(),
			}
		};

		snapshot::encode(&snapshot).map_err(|err| Error::Serialization { message: err.to_string() })
	}

	/// Replaces every record with the snapshot in `raw`. A rejected snapshot
	/// leaves the store untouched.
	pub async fn import_data(&self, raw: &str) -> Result<()> {
		let snapshot = match snapshot::decode(raw) {
			Ok(snapshot) => snapshot,
			Err(err) => {
				let message = err.to_string();

				tracing::warn!(error = %message, "Snapshot import rejected.");

				self.note_failure(ErrorKind::ImportValidationFailed, None, message.clone());

				return Err(Error::ImportValidation { message });
			},
		};

		{
			let mut state = self.lock_state();
			let mut history = snapshot.search_history;

			history.truncate(snapshot.preferences.max_history_items);

			*state = StoreState {
				history,
				recent: RecentSearches::from(snapshot.recent_searches),
				favorites: snapshot.favorite_places,
				preferences: snapshot.preferences,
			};
		}

		tracing::info!("Snapshot imported.");

		self.persist(&RecordKey::ALL).await;

		Ok(())
	}

	/// Resets every record to its default, preferences included.
	pub async fn clear_all_data(&self) {
		*self.lock_state() = StoreState::default();

		tracing::info!("All stored data cleared.");

		self.persist(&RecordKey::ALL).await;
	}

	async fn persist(&self, keys: &[RecordKey]) {
		let _gate = self.write_gate.lock().await;

		for &key in keys {
			let payload = match self.encode_record(key) {
				Ok(payload) => payload,
				Err(err) => {
					self.note_write_failure(key, err.to_string());

					continue;
				},
			};

			if let Err(err) = self.records.save(key, payload).await {
				self.note_write_failure(key, err.to_string());
			}
		}
	}

	fn encode_record(&self, key: RecordKey) -> serde_json::Result<String> {
		let state = self.lock_state();

		match key {
			RecordKey::SearchHistory => serde_json::to_string(&state.history),
			RecordKey::RecentSearches => serde_json::to_string(&state.recent),
			RecordKey::FavoritePlaces => serde_json::to_string(&state.favorites),
			RecordKey::Preferences => serde_json::to_string(&state.preferences),
		}
	}

	fn note_write_failure(&self, key: RecordKey, message: String) {
		tracing::warn!(record = key.as_str(), error = %message, "Record write failed.");

		self.note_failure(ErrorKind::PersistenceWriteFailed, Some(key), message);
	}

	fn note_failure(&self, kind: ErrorKind, record: Option<RecordKey>, message: String) {
		*self.lock_last_error() =
			Some(PersistenceFailure { kind, record, message, at: OffsetDateTime::now_utc() });
	}

	fn lock_state(&self) -> MutexGuard<'_, StoreState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn lock_last_error(&self) -> MutexGuard<'_, Option<PersistenceFailure>> {
		self.last_error.lock().unwrap_or_else(|err| err.into_inner())
	}
}

async fn load_record<T>(
	records: &dyn RecordStore,
	key: RecordKey,
	failure: &mut Option<PersistenceFailure>,
) -> T
where
	T: DeserializeOwned + Default,
{
	let message = match records.load(key).await {
		Ok(None) => return T::default(),
		Ok(Some(raw)) => match serde_json::from_str(&raw) {
			Ok(value) => return value,
			Err(err) => err.to_string(),
		},
		Err(err) => err.to_string(),
	};

	tracing::warn!(record = key.as_str(), error = %message, "Record unreadable; using defaults.");

	*failure = Some(PersistenceFailure {
		kind: ErrorKind::PersistenceReadFailed,
		record: Some(key),
		message,
		at: OffsetDateTime::now_utc(),
	});

	T::default()
}
