use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub search: Search,
	pub storage: Storage,
	#[serde(default)]
	pub telemetry: Telemetry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub debounce_ms: u64,
	pub min_query_length: usize,
	#[serde(default = "default_suggestion_min_length")]
	pub suggestion_min_length: usize,
	pub max_results: usize,
	pub max_suggestions: usize,
	pub enable_suggestions: bool,
	/// Optional. Results outside these categories are dropped before truncation.
	#[serde(default)]
	pub category_filter: Vec<String>,
	#[serde(default)]
	pub cache: SearchCache,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchCache {
	/// Optional. Absent keeps every entry for the process lifetime.
	pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Telemetry {
	pub window: usize,
}
impl Default for Telemetry {
	fn default() -> Self {
		Self { window: 10 }
	}
}

fn default_suggestion_min_length() -> usize {
	1
}
