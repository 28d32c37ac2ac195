//! A JSON place catalog served as a [`SearchIndex`].

use std::path::Path;

use color_eyre::{Result, eyre::WrapErr};

use wayfarer_domain::{PlaceRef, query::fold_query};
use wayfarer_service::{BoxFuture, SearchIndex};

const SAMPLE_CATALOG: &str = include_str!("../data/places.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
	ExactName,
	NamePrefix,
	NameSubstring,
	CategoryOrRegion,
}

#[derive(Debug, Clone)]
struct Entry {
	place: PlaceRef,
	name: String,
	category: String,
	region: String,
}
impl Entry {
	fn new(place: PlaceRef) -> Self {
		let name = fold_query(&place.name);
		let category = fold_query(&place.category);
		let region = place.region.as_deref().map(fold_query).unwrap_or_default();

		Self { place, name, category, region }
	}

	fn tier(&self, needle: &str) -> Option<Tier> {
		if self.name == needle {
			Some(Tier::ExactName)
		} else if self.name.starts_with(needle) {
			Some(Tier::NamePrefix)
		} else if self.name.contains(needle) {
			Some(Tier::NameSubstring)
		} else if self.category.contains(needle) || self.region.contains(needle) {
			Some(Tier::CategoryOrRegion)
		} else {
			None
		}
	}
}

/// Places ranked by exact name, name prefix, name substring, then category or
/// region substring. Ties keep catalog order.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
	entries: Vec<Entry>,
}
impl CatalogIndex {
	pub fn new(places: Vec<PlaceRef>) -> Self {
		Self { entries: places.into_iter().map(Entry::new).collect() }
	}

	/// The catalog bundled with the binary.
	pub fn sample() -> Result<Self> {
		Self::from_json(SAMPLE_CATALOG)
	}

	pub fn from_json(raw: &str) -> Result<Self> {
		let places: Vec<PlaceRef> =
			serde_json::from_str(raw).wrap_err("Place catalog is not a JSON list of places.")?;

		Ok(Self::new(places))
	}

	pub async fn load(path: &Path) -> Result<Self> {
		let raw = tokio::fs::read_to_string(path)
			.await
			.wrap_err_with(|| format!("Failed to read place catalog at {path:?}."))?;

		Self::from_json(&raw)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn rank(&self, query: &str) -> Vec<PlaceRef> {
		let needle = fold_query(query);

		if needle.is_empty() {
			return Vec::new();
		}

		let mut ranked: Vec<(Tier, &Entry)> = self
			.entries
			.iter()
			.filter_map(|entry| entry.tier(&needle).map(|tier| (tier, entry)))
			.collect();

		ranked.sort_by_key(|(tier, _)| *tier);

		ranked.into_iter().map(|(_, entry)| entry.place.clone()).collect()
	}

	/// Names of ranked places whose name contains `partial_query`.
	pub fn complete(&self, partial_query: &str, limit: usize) -> Vec<String> {
		let needle = fold_query(partial_query);

		self.rank(partial_query)
			.into_iter()
			.filter(|place| fold_query(&place.name).contains(&needle))
			.map(|place| place.name)
			.take(limit)
			.collect()
	}
}
impl SearchIndex for CatalogIndex {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<PlaceRef>>> {
		Box::pin(async move { Ok(self.rank(query)) })
	}

	fn suggest<'a>(
		&'a self,
		partial_query: &'a str,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move { Ok(self.complete(partial_query, limit)) })
	}
}
