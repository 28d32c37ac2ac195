use std::{fmt, future::Future, pin::Pin};

use crate::Result;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The independently stored durable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
	SearchHistory,
	RecentSearches,
	FavoritePlaces,
	Preferences,
}
impl RecordKey {
	pub const ALL: [Self; 4] =
		[Self::SearchHistory, Self::RecentSearches, Self::FavoritePlaces, Self::Preferences];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::SearchHistory => "search_history",
			Self::RecentSearches => "recent_searches",
			Self::FavoritePlaces => "favorite_places",
			Self::Preferences => "search_preferences",
		}
	}
}
impl fmt::Display for RecordKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Durable key/value storage for serialized records.
///
/// `load` yields `Ok(None)` when the record was never written.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn load<'a>(&'a self, key: RecordKey) -> BoxFuture<'a, Result<Option<String>>>;

	fn save<'a>(&'a self, key: RecordKey, payload: String) -> BoxFuture<'a, Result<()>>;
}
