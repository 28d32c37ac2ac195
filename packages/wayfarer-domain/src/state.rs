use serde::Serialize;

use crate::PlaceRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
	SearchFailed,
	PersistenceReadFailed,
	PersistenceWriteFailed,
	ImportValidationFailed,
}
impl ErrorKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SearchFailed => "search_failed",
			Self::PersistenceReadFailed => "persistence_read_failed",
			Self::PersistenceWriteFailed => "persistence_write_failed",
			Self::ImportValidationFailed => "import_validation_failed",
		}
	}
}

/// The value a search surface renders.
///
/// `results` and `suggestions` may both be populated; which one is shown is a
/// display decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
	pub query: String,
	pub results: Vec<PlaceRef>,
	pub suggestions: Vec<String>,
	pub is_loading: bool,
	pub has_searched: bool,
	pub error: Option<ErrorKind>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
	pub last_search_duration_ms: f64,
	pub average_search_duration_ms: f64,
}
