use serde::{Deserialize, Serialize};

/// A tourist-place record as returned by a search index.
///
/// Identity is the `id`; two references with the same id denote the same
/// place even if the remaining fields differ between index snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRef {
	pub id: String,
	pub name: String,
	pub category: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
}
impl PlaceRef {
	pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
		Self { id: id.into(), name: name.into(), category: category.into(), region: None }
	}

	pub fn with_region(mut self, region: impl Into<String>) -> Self {
		self.region = Some(region.into());

		self
	}

	pub fn display_name(&self) -> &str {
		&self.name
	}
}
