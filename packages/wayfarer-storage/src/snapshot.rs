//! Versioned export format covering every durable record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use wayfarer_domain::{
	FavoritePlace, HistoryItem, SearchPreferences, history::MAX_RECENT_SEARCHES,
	preferences::is_valid_radius, query::fold_query,
};

use crate::{Error, Result};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
	pub version: u32,
	#[serde(default, with = "wayfarer_domain::time_serde::option")]
	pub exported_at: Option<OffsetDateTime>,
	pub search_history: Vec<HistoryItem>,
	pub recent_searches: Vec<String>,
	pub favorite_places: Vec<FavoritePlace>,
	pub preferences: SearchPreferences,
}

pub fn encode(snapshot: &Snapshot) -> Result<String> {
	Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parses and validates a snapshot. Nothing partial is ever returned: any
/// version, shape, or consistency problem rejects the whole payload.
pub fn decode(raw: &str) -> Result<Snapshot> {
	let value: Value = serde_json::from_str(raw)
		.map_err(|err| Error::InvalidSnapshot(format!("Payload is not JSON: {err}.")))?;
	let version = value
		.get("version")
		.ok_or_else(|| Error::InvalidSnapshot("Missing version tag.".to_string()))?;

	if version.as_u64() != Some(u64::from(SNAPSHOT_VERSION)) {
		return Err(Error::InvalidSnapshot(format!("Unsupported version {version}.")));
	}

	let snapshot: Snapshot = serde_json::from_value(value)
		.map_err(|err| Error::InvalidSnapshot(format!("Malformed snapshot: {err}.")))?;

	validate(&snapshot)?;

	Ok(snapshot)
}

fn validate(snapshot: &Snapshot) -> Result<()> {
	let mut history_ids = HashSet::new();
	let mut history_queries = HashSet::new();

	for item in &snapshot.search_history {
		if item.query.trim().is_empty() {
			return Err(Error::InvalidSnapshot("History query must be non-empty.".to_string()));
		}
		if !history_ids.insert(item.id) {
			return Err(Error::InvalidSnapshot(format!("Duplicate history id {}.", item.id)));
		}
		if !history_queries.insert(fold_query(&item.query)) {
			return Err(Error::InvalidSnapshot(format!(
				"Duplicate history query {:?}.",
				item.query
			)));
		}
	}

	if snapshot.recent_searches.len() > MAX_RECENT_SEARCHES {
		return Err(Error::InvalidSnapshot(format!(
			"Recent searches exceed {MAX_RECENT_SEARCHES} entries."
		)));
	}

	let mut recent = HashSet::new();

	for query in &snapshot.recent_searches {
		if !recent.insert(query.as_str()) {
			return Err(Error::InvalidSnapshot(format!("Duplicate recent search {query:?}.")));
		}
	}

	let mut place_ids = HashSet::new();

	for favorite in &snapshot.favorite_places {
		if favorite.place.id.trim().is_empty() {
			return Err(Error::InvalidSnapshot("Favorite place id must be non-empty.".to_string()));
		}
		if !place_ids.insert(favorite.place.id.as_str()) {
			return Err(Error::InvalidSnapshot(format!(
				"Duplicate favorite place id {}.",
				favorite.place.id
			)));
		}
	}

	if !is_valid_radius(snapshot.preferences.search_radius_km) {
		return Err(Error::InvalidSnapshot(
			"Preferences search_radius_km must be a finite non-negative number.".to_string(),
		));
	}

	Ok(())
}
