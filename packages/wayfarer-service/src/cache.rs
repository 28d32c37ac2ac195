//! Query-keyed memoization of index output.
//!
//! Keys are the trimmed query text, compared exactly. Values are the raw
//! index output; category filtering and truncation happen when a controller
//! publishes, so one cache can serve controllers with different options.

use std::{
	collections::HashMap,
	hash::Hash,
	num::NonZeroUsize,
	sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use lru::LruCache;

use wayfarer_config::SearchCache;
use wayfarer_domain::PlaceRef;

static GLOBAL: OnceLock<Arc<ResultCache>> = OnceLock::new();

#[derive(Debug)]
pub struct ResultCache {
	entries: Mutex<Entries>,
	capacity: Option<NonZeroUsize>,
}
impl ResultCache {
	/// A cache that never evicts.
	pub fn unbounded() -> Self {
		Self::with_capacity(None)
	}

	/// A cache that evicts the least recently used entry per map once
	/// `capacity` is reached.
	pub fn bounded(capacity: NonZeroUsize) -> Self {
		Self::with_capacity(Some(capacity))
	}

	pub fn from_config(cfg: &SearchCache) -> Self {
		Self::with_capacity(cfg.max_entries.and_then(NonZeroUsize::new))
	}

	/// The process-wide cache shared by every controller.
	///
	/// The first caller decides its bound; later configs are ignored.
	pub fn global(cfg: &SearchCache) -> Arc<Self> {
		GLOBAL.get_or_init(|| Arc::new(Self::from_config(cfg))).clone()
	}

	pub fn capacity(&self) -> Option<NonZeroUsize> {
		self.capacity
	}

	pub fn results(&self, query: &str) -> Option<Vec<PlaceRef>> {
		self.lock().results.get(query)
	}

	pub fn store_results(&self, query: impl Into<String>, places: Vec<PlaceRef>) {
		self.lock().results.put(query.into(), places);
	}

	pub fn suggestions(&self, query: &str) -> Option<Vec<String>> {
		self.lock().suggestions.get(query)
	}

	pub fn store_suggestions(&self, query: impl Into<String>, suggestions: Vec<String>) {
		self.lock().suggestions.put(query.into(), suggestions);
	}

	/// Number of cached result lists.
	pub fn len(&self) -> usize {
		self.lock().results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn clear(&self) {
		let mut entries = self.lock();

		entries.results.clear();
		entries.suggestions.clear();

		tracing::debug!("Result cache cleared.");
	}

	fn with_capacity(capacity: Option<NonZeroUsize>) -> Self {
		let entries = Entries {
			results: CacheMap::new(capacity),
			suggestions: CacheMap::new(capacity),
		};

		Self { entries: Mutex::new(entries), capacity }
	}

	fn lock(&self) -> MutexGuard<'_, Entries> {
		self.entries.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl Default for ResultCache {
	fn default() -> Self {
		Self::unbounded()
	}
}

#[derive(Debug)]
struct Entries {
	results: CacheMap<String, Vec<PlaceRef>>,
	suggestions: CacheMap<String, Vec<String>>,
}

#[derive(Debug)]
enum CacheMap<K, V>
where
	K: Hash + Eq,
{
	Unbounded(HashMap<K, V>),
	Bounded(LruCache<K, V>),
}
impl<V> CacheMap<String, V>
where
	V: Clone,
{
	fn new(capacity: Option<NonZeroUsize>) -> Self {
		match capacity {
			Some(capacity) => Self::Bounded(LruCache::new(capacity)),
			None => Self::Unbounded(HashMap::new()),
		}
	}

	fn get(&mut self, key: &str) -> Option<V> {
		match self {
			Self::Unbounded(map) => map.get(key).cloned(),
			Self::Bounded(lru) => lru.get(key).cloned(),
		}
	}

	fn put(&mut self, key: String, value: V) {
		match self {
			Self::Unbounded(map) => {
				map.insert(key, value);
			},
			Self::Bounded(lru) => {
				lru.put(key, value);
			},
		}
	}

	fn len(&self) -> usize {
		match self {
			Self::Unbounded(map) => map.len(),
			Self::Bounded(lru) => lru.len(),
		}
	}

	fn clear(&mut self) {
		match self {
			Self::Unbounded(map) => map.clear(),
			Self::Bounded(lru) => lru.clear(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn place(id: &str) -> PlaceRef {
		PlaceRef::new(id, id, "city")
	}

	#[test]
	fn keys_are_exact() {
		let cache = ResultCache::unbounded();

		cache.store_results("Istanbul", vec![place("ist")]);

		assert!(cache.results("Istanbul").is_some());
		assert!(cache.results("istanbul").is_none());
	}

	#[test]
	fn bounded_cache_evicts_least_recently_used() {
		let capacity = NonZeroUsize::new(2).expect("Capacity must be non-zero.");
		let cache = ResultCache::bounded(capacity);

		cache.store_results("a", vec![place("a")]);
		cache.store_results("b", vec![place("b")]);

		assert!(cache.results("a").is_some());

		cache.store_results("c", vec![place("c")]);

		assert_eq!(cache.len(), 2);
		assert!(cache.results("a").is_some());
		assert!(cache.results("b").is_none());
	}

	#[test]
	fn zero_max_entries_means_unbounded() {
		let cache = ResultCache::from_config(&SearchCache { max_entries: Some(0) });

		assert_eq!(cache.capacity(), None);
	}

	#[test]
	fn clear_drops_both_maps() {
		let cache = ResultCache::unbounded();

		cache.store_results("kap", Vec::new());
		cache.store_suggestions("kap", vec!["Kapadokya".to_string()]);
		cache.clear();

		assert!(cache.is_empty());
		assert!(cache.suggestions("kap").is_none());
	}
}
