mod error;

pub use error::{Error, Result};

use std::{
	sync::{
		Mutex,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use color_eyre::eyre;
use tokio::time;

use wayfarer_domain::{PlaceRef, query::fold_query};
use wayfarer_service::{BoxFuture, SearchIndex};

pub use tempfile::TempDir;

/// A scratch directory named after `prefix`, removed when dropped.
pub fn temp_dir(prefix: &str) -> Result<TempDir> {
	tempfile::Builder::new()
		.prefix(&format!("{prefix}_"))
		.tempdir()
		.map_err(|err| Error::Message(format!("Failed to create temp dir: {err}.")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
	Search(String),
	Suggest(String),
}

/// An in-memory [`SearchIndex`] that records every call it receives.
///
/// `search` matches places whose name or category contains the query,
/// ignoring case. `suggest` returns matching names, prefix matches first.
pub struct CountingIndex {
	places: Vec<PlaceRef>,
	latency: Option<Duration>,
	calls: Mutex<Vec<IndexCall>>,
	fail_search: AtomicBool,
	fail_suggest: AtomicBool,
}
impl CountingIndex {
	pub fn new(places: Vec<PlaceRef>) -> Self {
		Self {
			places,
			latency: None,
			calls: Mutex::new(Vec::new()),
			fail_search: AtomicBool::new(false),
			fail_suggest: AtomicBool::new(false),
		}
	}

	/// Every call sleeps for `latency` before answering.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);

		self
	}

	pub fn set_fail_search(&self, fail: bool) {
		self.fail_search.store(fail, Ordering::SeqCst);
	}

	pub fn set_fail_suggest(&self, fail: bool) {
		self.fail_suggest.store(fail, Ordering::SeqCst);
	}

	pub fn calls(&self) -> Vec<IndexCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn search_calls(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				IndexCall::Search(query) => Some(query),
				IndexCall::Suggest(_) => None,
			})
			.collect()
	}

	pub fn suggest_calls(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				IndexCall::Suggest(query) => Some(query),
				IndexCall::Search(_) => None,
			})
			.collect()
	}

	fn note(&self, call: IndexCall) {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(call);
	}

	async fn pause(&self) {
		if let Some(latency) = self.latency {
			time::sleep(latency).await;
		}
	}
}
impl SearchIndex for CountingIndex {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<Vec<PlaceRef>>> {
		self.note(IndexCall::Search(query.to_string()));

		Box::pin(async move {
			self.pause().await;

			if self.fail_search.load(Ordering::SeqCst) {
				return Err(eyre::eyre!("Injected search failure."));
			}

			let needle = fold_query(query);

			Ok(self
				.places
				.iter()
				.filter(|place| {
					fold_query(&place.name).contains(&needle)
						|| fold_query(&place.category).contains(&needle)
				})
				.cloned()
				.collect())
		})
	}

	fn suggest<'a>(
		&'a self,
		partial_query: &'a str,
		limit: usize,
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		self.note(IndexCall::Suggest(partial_query.to_string()));

		Box::pin(async move {
			self.pause().await;

			if self.fail_suggest.load(Ordering::SeqCst) {
				return Err(eyre::eyre!("Injected suggestion failure."));
			}

			let needle = fold_query(partial_query);
			let (mut prefixed, contained): (Vec<_>, Vec<_>) = self
				.places
				.iter()
				.filter(|place| fold_query(&place.name).contains(&needle))
				.map(|place| place.name.clone())
				.partition(|name| fold_query(name).starts_with(&needle));

			prefixed.extend(contained);
			prefixed.truncate(limit);

			Ok(prefixed)
		})
	}
}

/// A small set of Turkish destinations used across tests.
pub fn sample_places() -> Vec<PlaceRef> {
	vec![
		PlaceRef::new("kapadokya", "Kapadokya", "region").with_region("Nevşehir"),
		PlaceRef::new("istanbul", "Istanbul", "city").with_region("Marmara"),
		PlaceRef::new("ayasofya", "Ayasofya", "museum").with_region("Istanbul"),
		PlaceRef::new("galata", "Galata Kulesi", "landmark").with_region("Istanbul"),
		PlaceRef::new("istiklal", "Istiklal Caddesi", "street").with_region("Istanbul"),
		PlaceRef::new("efes", "Efes Antik Kenti", "archaeological site").with_region("İzmir"),
		PlaceRef::new("pamukkale", "Pamukkale", "natural wonder").with_region("Denizli"),
		PlaceRef::new("antalya", "Antalya", "city").with_region("Akdeniz"),
		PlaceRef::new("kaleici", "Kaleiçi", "district").with_region("Antalya"),
		PlaceRef::new("sumela", "Sumela Manastırı", "monastery").with_region("Trabzon"),
	]
}

pub fn place(id: &str) -> Option<PlaceRef> {
	sample_places().into_iter().find(|place| place.id == id)
}
