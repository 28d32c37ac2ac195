use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::PlaceRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePlace {
	pub place: PlaceRef,
	#[serde(with = "crate::time_serde")]
	pub added_at: OffsetDateTime,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

/// Adds `place` to the front of the list, or updates the notes of an
/// existing entry with the same place id. Returns `true` when a new entry was
/// created.
///
/// Re-adding without notes keeps the existing notes.
pub fn upsert_favorite(
	favorites: &mut Vec<FavoritePlace>,
	place: PlaceRef,
	notes: Option<String>,
	now: OffsetDateTime,
) -> bool {
	if let Some(existing) = favorites.iter_mut().find(|favorite| favorite.place.id == place.id) {
		if notes.is_some() {
			existing.notes = notes;
		}

		return false;
	}

	favorites.insert(0, FavoritePlace { place, added_at: now, notes });

	true
}

pub fn remove_favorite(favorites: &mut Vec<FavoritePlace>, place_id: &str) -> bool {
	let before = favorites.len();

	favorites.retain(|favorite| favorite.place.id != place_id);

	favorites.len() != before
}
