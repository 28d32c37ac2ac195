//! Incremental search over a [`SearchIndex`].
//!
//! A [`QueryController`] turns a stream of query edits into published
//! [`SearchState`] values. Typed queries are debounced; explicit searches
//! run at once. Every request bumps a generation counter and a lookup may
//! only publish while its generation is still current, so a slow answer to
//! an old query can never overwrite a newer one.
//!
//! Lookups for an exact query that is already in flight adopt the running
//! lookup instead of calling the index again.
//!
//! All methods that schedule work must be called from inside a Tokio
//! runtime.

use std::{
	collections::BTreeSet,
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use tokio::{
	sync::watch,
	task::JoinHandle,
	time::{self, Instant},
};

use wayfarer_config::Config;
use wayfarer_domain::{
	ErrorKind, PerformanceStats, PlaceRef, QueryBand, SearchPreferences, SearchState,
	history::merge_suggestions, query,
};

use crate::{ResultCache, SearchIndex, history::HistoryStore, telemetry::Telemetry};

const SUGGESTION_LOOKUP_MIN_LENGTH: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
	pub debounce: Duration,
	pub min_query_length: usize,
	pub suggestion_min_length: usize,
	pub max_results: usize,
	pub max_suggestions: usize,
	pub enable_suggestions: bool,
	/// Empty means every category is shown.
	pub category_filter: BTreeSet<String>,
	pub telemetry_window: usize,
}
impl ControllerOptions {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			debounce: Duration::from_millis(cfg.search.debounce_ms),
			min_query_length: cfg.search.min_query_length,
			suggestion_min_length: cfg.search.suggestion_min_length,
			max_results: cfg.search.max_results,
			max_suggestions: cfg.search.max_suggestions,
			enable_suggestions: cfg.search.enable_suggestions,
			category_filter: cfg.search.category_filter.iter().cloned().collect(),
			telemetry_window: cfg.telemetry.window,
		}
	}

	/// Applies user preferences on top of the configured options.
	///
	/// Suggestions stay on only when both sides allow them. Preferred
	/// categories become the filter when none is configured.
	pub fn with_preferences(mut self, preferences: &SearchPreferences) -> Self {
		self.enable_suggestions &= preferences.enable_suggestions;

		if self.category_filter.is_empty() {
			self.category_filter = preferences.preferred_categories.clone();
		}

		self
	}
}
impl Default for ControllerOptions {
	fn default() -> Self {
		Self {
			debounce: Duration::from_millis(300),
			min_query_length: 2,
			suggestion_min_length: 1,
			max_results: 20,
			max_suggestions: 8,
			enable_suggestions: true,
			category_filter: BTreeSet::new(),
			telemetry_window: crate::telemetry::DEFAULT_WINDOW,
		}
	}
}

pub struct QueryController {
	shared: Arc<Shared>,
}
impl QueryController {
	pub fn new(
		options: ControllerOptions,
		index: Arc<dyn SearchIndex>,
		cache: Arc<ResultCache>,
	) -> Self {
		Self::build(options, index, cache, None)
	}

	/// Like [`QueryController::new`], additionally reporting every published
	/// search to `history` and blending past queries into suggestions.
	pub fn with_history(
		options: ControllerOptions,
		index: Arc<dyn SearchIndex>,
		cache: Arc<ResultCache>,
		history: Arc<HistoryStore>,
	) -> Self {
		Self::build(options, index, cache, Some(history))
	}

	pub fn options(&self) -> &ControllerOptions {
		&self.shared.options
	}

	/// The latest published state.
	pub fn state(&self) -> SearchState {
		self.shared.state.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<SearchState> {
		self.shared.state.subscribe()
	}

	pub fn performance_stats(&self) -> PerformanceStats {
		self.shared.lock_control().telemetry.stats()
	}

	/// Records a query edit.
	///
	/// Searchable text schedules a debounced lookup. Shorter text clears the
	/// results and, when long enough, fetches suggestions immediately.
	pub fn set_query(&self, text: &str) {
		let shared = &self.shared;
		let options = &shared.options;
		let band = QueryBand::classify(text, options.min_query_length, options.suggestion_min_length);
		let mut control = shared.lock_control();

		if control.disposed {
			return;
		}

		let generation = control.supersede();

		match band {
			QueryBand::Searchable => {
				shared.publish(|state| {
					state.query = text.to_string();
					state.is_loading = true;
					state.error = None;
				});

				let task = debounced_lookup(shared.clone(), generation, text.trim().to_string());

				control.timer = Some(tokio::spawn(task));
			},
			QueryBand::SuggestOnly if options.enable_suggestions => {
				shared.publish(|state| reset_idle(state, text, false));

				let task = suggestion_lookup(shared.clone(), generation, text.trim().to_string());

				control.suggestion_task = Some(tokio::spawn(task));
			},
			_ => shared.publish(|state| reset_idle(state, text, false)),
		}
	}

	/// Runs a lookup immediately, bypassing the debounce.
	///
	/// Text shorter than the minimum query length publishes an empty,
	/// searched state.
	pub fn search(&self, text: &str) {
		let shared = &self.shared;
		let mut control = shared.lock_control();

		if control.disposed {
			return;
		}

		let generation = control.supersede();

		if query::query_len(text) < shared.options.min_query_length {
			shared.publish(|state| reset_idle(state, text, true));

			return;
		}

		shared.publish(|state| {
			state.query = text.to_string();
			state.is_loading = true;
			state.error = None;
		});
		shared.start_lookup(&mut control, generation, text.trim().to_string());
	}

	/// Cancels pending work and publishes the initial state.
	pub fn clear_search(&self) {
		let mut control = self.shared.lock_control();

		if control.disposed {
			return;
		}

		control.supersede();

		self.shared.state.send_replace(SearchState::default());
	}

	/// Publishes `place` as the single result for its own name.
	pub fn select_place(&self, place: PlaceRef) {
		let mut control = self.shared.lock_control();

		if control.disposed {
			return;
		}

		control.supersede();

		self.shared.publish(|state| {
			state.query = place.name.clone();
			state.results = vec![place];
			state.suggestions.clear();
			state.is_loading = false;
			state.has_searched = true;
			state.error = None;
		});
	}

	/// Cancels all pending work. No state is published afterwards.
	pub fn dispose(self) {
		drop(self);
	}

	fn build(
		options: ControllerOptions,
		index: Arc<dyn SearchIndex>,
		cache: Arc<ResultCache>,
		history: Option<Arc<HistoryStore>>,
	) -> Self {
		let (state, _) = watch::channel(SearchState::default());
		let control = Control {
			generation: 0,
			next_lookup_id: 0,
			disposed: false,
			timer: None,
			suggestion_task: None,
			in_flight: None,
			telemetry: Telemetry::new(options.telemetry_window),
		};
		let shared = Shared { options, index, cache, history, state, control: Mutex::new(control) };

		Self { shared: Arc::new(shared) }
	}
}
impl Drop for QueryController {
	fn drop(&mut self) {
		let mut control = self.shared.lock_control();

		control.disposed = true;
		control.supersede();

		if let Some(in_flight) = control.in_flight.take() {
			in_flight.handle.abort();
		}

		tracing::debug!("Query controller disposed.");
	}
}

struct Shared {
	options: ControllerOptions,
	index: Arc<dyn SearchIndex>,
	cache: Arc<ResultCache>,
	history: Option<Arc<HistoryStore>>,
	state: watch::Sender<SearchState>,
	control: Mutex<Control>,
}
impl Shared {
	fn lock_control(&self) -> MutexGuard<'_, Control> {
		self.control.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn publish(&self, apply: impl FnOnce(&mut SearchState)) {
		self.state.send_modify(apply);
	}

	/// Publishes only if `generation` is still the latest request.
	fn publish_if_current(&self, generation: u64, apply: impl FnOnce(&mut SearchState)) -> bool {
		let control = self.lock_control();

		if control.disposed || control.generation != generation {
			tracing::debug!(generation, "Stale suggestions discarded.");

			return false;
		}

		self.publish(apply);

		true
	}

	/// Starts a lookup for `query` or hands it to the running lookup for the
	/// same text. A running lookup for other text is aborted.
	fn start_lookup(self: &Arc<Self>, control: &mut Control, generation: u64, query: String) {
		if let Some(in_flight) = control.in_flight.as_mut()
			&& in_flight.query == query
			&& !in_flight.handle.is_finished()
		{
			in_flight.generation = generation;

			tracing::debug!(query = %query, generation, "Lookup joined in-flight request.");

			return;
		}

		control.next_lookup_id += 1;

		let id = control.next_lookup_id;
		let handle = tokio::spawn(run_lookup(self.clone(), id, query.clone()));

		if let Some(replaced) = control.in_flight.replace(InFlight { id, query, generation, handle }) {
			replaced.handle.abort();
		}
	}

	/// Retires lookup `id` and publishes its outcome if the request it
	/// currently answers is still the latest one.
	fn settle_lookup(&self, id: u64, apply: impl FnOnce(&mut SearchState)) -> bool {
		let mut control = self.lock_control();
		let generation = match control.in_flight.as_ref() {
			Some(in_flight) if in_flight.id == id => in_flight.generation,
			_ => {
				tracing::debug!(lookup = id, "Superseded lookup discarded.");

				return false;
			},
		};

		control.in_flight = None;

		if control.disposed || control.generation != generation {
			tracing::debug!(lookup = id, generation, "Stale lookup discarded.");

			return false;
		}

		self.publish(apply);

		true
	}

	fn record_duration(&self, elapsed: Duration) {
		let ms = self.lock_control().telemetry.record(elapsed);

		tracing::debug!(duration_ms = ms, "Index search timed.");
	}

	async fn fetch_suggestions(&self, query: &str) -> color_eyre::Result<Vec<String>> {
		let limit = self.options.max_suggestions;
		let from_index = match self.cache.suggestions(query) {
			Some(cached) => cached,
			None => {
				let fetched = self.index.suggest(query, limit).await?;

				self.cache.store_suggestions(query, fetched.clone());

				fetched
			},
		};
		let from_history = self
			.history
			.as_ref()
			.map(|history| history.history_based_suggestions(query))
			.unwrap_or_default();

		Ok(merge_suggestions(from_history, from_index, limit))
	}
}

struct Control {
	generation: u64,
	next_lookup_id: u64,
	disposed: bool,
	timer: Option<JoinHandle<()>>,
	suggestion_task: Option<JoinHandle<()>>,
	in_flight: Option<InFlight>,
	telemetry: Telemetry,
}
impl Control {
	/// Invalidates every earlier request and cancels its pending timers.
	fn supersede(&mut self) -> u64 {
		self.generation += 1;

		if let Some(timer) = self.timer.take() {
			timer.abort();
		}
		if let Some(task) = self.suggestion_task.take() {
			task.abort();
		}

		self.generation
	}
}

struct InFlight {
	id: u64,
	query: String,
	/// The newest request this lookup answers.
	generation: u64,
	handle: JoinHandle<()>,
}

async fn debounced_lookup(shared: Arc<Shared>, generation: u64, query: String) {
	time::sleep(shared.options.debounce).await;

	let mut control = shared.lock_control();

	if control.disposed || control.generation != generation {
		return;
	}

	shared.start_lookup(&mut control, generation, query);
}

async fn suggestion_lookup(shared: Arc<Shared>, generation: u64, query: String) {
	match shared.fetch_suggestions(&query).await {
		Ok(suggestions) => {
			shared.publish_if_current(generation, |state| state.suggestions = suggestions);
		},
		Err(err) => {
			tracing::warn!(error = %err, query = %query, "Suggestion lookup failed.");

			shared.publish_if_current(generation, |state| {
				state.results.clear();
				state.suggestions.clear();
				state.is_loading = false;
				state.error = Some(ErrorKind::SearchFailed);
			});
		},
	}
}

async fn run_lookup(shared: Arc<Shared>, id: u64, query: String) {
	let options = &shared.options;
	let places = match shared.cache.results(&query) {
		Some(cached) => {
			tracing::debug!(query = %query, entries = shared.cache.len(), "Result cache hit.");

			cached
		},
		None => {
			tracing::debug!(query = %query, entries = shared.cache.len(), "Result cache miss.");

			let started = Instant::now();
			let outcome = shared.index.search(&query).await;

			shared.record_duration(started.elapsed());

			match outcome {
				Ok(places) => {
					shared.cache.store_results(query.as_str(), places.clone());

					places
				},
				Err(err) => {
					tracing::warn!(error = %err, query = %query, "Index search failed.");

					shared.settle_lookup(id, publish_failure);

					return;
				},
			}
		},
	};
	let suggestions = if options.enable_suggestions
		&& query::query_len(&query) >= SUGGESTION_LOOKUP_MIN_LENGTH
	{
		match shared.fetch_suggestions(&query).await {
			Ok(suggestions) => suggestions,
			Err(err) => {
				tracing::warn!(error = %err, query = %query, "Suggestion lookup failed.");

				shared.settle_lookup(id, publish_failure);

				return;
			},
		}
	} else {
		Vec::new()
	};
	let results = visible_results(places, &options.category_filter, options.max_results);
	let result_count = u32::try_from(results.len()).unwrap_or(u32::MAX);
	let published = shared.settle_lookup(id, |state| {
		state.results = results;
		state.suggestions = suggestions;
		state.is_loading = false;
		state.has_searched = true;
		state.error = None;
	});

	if published {
		tracing::debug!(query = %query, result_count, "Search published.");

		if let Some(history) = shared.history.as_ref() {
			history.add_search_to_history(&query, result_count).await;
		}
	}
}

fn publish_failure(state: &mut SearchState) {
	state.results.clear();
	state.suggestions.clear();
	state.is_loading = false;
	state.has_searched = true;
	state.error = Some(ErrorKind::SearchFailed);
}

fn reset_idle(state: &mut SearchState, text: &str, has_searched: bool) {
	state.query = text.to_string();
	state.results.clear();
	state.suggestions.clear();
	state.is_loading = false;
	state.has_searched = has_searched;
	state.error = None;
}

fn visible_results(
	places: Vec<PlaceRef>,
	category_filter: &BTreeSet<String>,
	max_results: usize,
) -> Vec<PlaceRef> {
	places
		.into_iter()
		.filter(|place| category_filter.is_empty() || category_filter.contains(&place.category))
		.take(max_results)
		.collect()
}
