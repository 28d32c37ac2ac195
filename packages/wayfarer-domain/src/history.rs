use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::query::fold_query;

pub const MAX_RECENT_SEARCHES: usize = 10;
pub const MAX_HISTORY_SUGGESTIONS: usize = 5;
pub const MAX_POPULAR_SEARCHES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
	pub id: Uuid,
	pub query: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
	pub result_count: u32,
	/// How many times the query was searched, folded case-insensitively.
	#[serde(default = "default_search_count")]
	pub search_count: u32,
}

/// Raw queries in newest-first order, deduplicated case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RecentSearches(Vec<String>);
impl RecentSearches {
	pub fn push(&mut self, query: &str) {
		self.0.retain(|existing| existing != query);
		self.0.insert(0, query.to_string());
		self.0.truncate(MAX_RECENT_SEARCHES);
	}

	pub fn clear(&mut self) {
		self.0.clear();
	}

	pub fn as_slice(&self) -> &[String] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<Vec<String>> for RecentSearches {
	fn from(queries: Vec<String>) -> Self {
		let mut seen = HashSet::new();
		let mut out: Vec<String> =
			queries.into_iter().filter(|query| seen.insert(query.clone())).collect();

		out.truncate(MAX_RECENT_SEARCHES);

		Self(out)
	}
}
impl From<RecentSearches> for Vec<String> {
	fn from(recent: RecentSearches) -> Self {
		recent.0
	}
}

/// Prepends a history entry for `query`, replacing any entry whose query
/// matches case-insensitively and carrying its search count forward.
///
/// The list stays newest-first and is truncated to `max_items`.
pub fn record_search(
	history: &mut Vec<HistoryItem>,
	query: &str,
	result_count: u32,
	now: OffsetDateTime,
	max_items: usize,
) -> HistoryItem {
	let query = query.trim();
	let key = fold_query(query);
	let mut previous_count = 0_u32;

	history.retain(|item| {
		if fold_query(&item.query) == key {
			previous_count = previous_count.max(item.search_count);

			false
		} else {
			true
		}
	});

	let item = HistoryItem {
		id: Uuid::new_v4(),
		query: query.to_string(),
		timestamp: now,
		result_count,
		search_count: previous_count.saturating_add(1),
	};

	history.insert(0, item.clone());
	history.truncate(max_items);

	item
}

/// Keeps the first entry of each case-insensitive query, which is the newest
/// in a newest-first list. Returns how many entries were dropped.
pub fn dedupe_history(history: &mut Vec<HistoryItem>) -> usize {
	let before = history.len();
	let mut seen = HashSet::new();

	history.retain(|item| seen.insert(fold_query(&item.query)));

	before - history.len()
}

/// Past queries containing `query` (case-insensitive) that produced results,
/// in list order.
pub fn history_based_suggestions(history: &[HistoryItem], query: &str, limit: usize) -> Vec<String> {
	let needle = fold_query(query);

	if needle.is_empty() {
		return Vec::new();
	}

	history
		.iter()
		.filter(|item| item.result_count > 0 && fold_query(&item.query).contains(&needle))
		.map(|item| item.query.clone())
		.take(limit)
		.collect()
}

/// Past queries ordered by how often they were searched; ties keep list
/// order, so the newer query wins.
pub fn popular_searches(history: &[HistoryItem], limit: usize) -> Vec<String> {
	let mut ranked: Vec<&HistoryItem> = history.iter().collect();

	ranked.sort_by(|a, b| b.search_count.cmp(&a.search_count));

	ranked.into_iter().take(limit).map(|item| item.query.clone()).collect()
}

/// Concatenates suggestion lists, dropping later case-insensitive duplicates.
pub fn merge_suggestions(
	primary: impl IntoIterator<Item = String>,
	secondary: impl IntoIterator<Item = String>,
	limit: usize,
) -> Vec<String> {
	let mut seen = HashSet::new();

	primary
		.into_iter()
		.chain(secondary)
		.filter(|suggestion| !suggestion.trim().is_empty() && seen.insert(fold_query(suggestion)))
		.take(limit)
		.collect()
}

fn default_search_count() -> u32 {
	1
}
