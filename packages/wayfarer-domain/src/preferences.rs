use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPreferences {
	pub max_history_items: usize,
	pub enable_suggestions: bool,
	pub enable_auto_complete: bool,
	pub search_radius_km: f64,
	pub preferred_categories: BTreeSet<String>,
}
impl Default for SearchPreferences {
	fn default() -> Self {
		Self {
			max_history_items: 50,
			enable_suggestions: true,
			enable_auto_complete: true,
			search_radius_km: 50.0,
			preferred_categories: BTreeSet::new(),
		}
	}
}

/// Whether `km` can be stored as a search radius.
pub fn is_valid_radius(km: f64) -> bool {
	km.is_finite() && km >= 0.0
}

/// A shallow partial update; `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesPatch {
	pub max_history_items: Option<usize>,
	pub enable_suggestions: Option<bool>,
	pub enable_auto_complete: Option<bool>,
	pub search_radius_km: Option<f64>,
	pub preferred_categories: Option<BTreeSet<String>>,
}
impl PreferencesPatch {
	pub fn apply(self, current: &SearchPreferences) -> SearchPreferences {
		SearchPreferences {
			max_history_items: self.max_history_items.unwrap_or(current.max_history_items),
			enable_suggestions: self.enable_suggestions.unwrap_or(current.enable_suggestions),
			enable_auto_complete: self.enable_auto_complete.unwrap_or(current.enable_auto_complete),
			search_radius_km: self.search_radius_km.unwrap_or(current.search_radius_km),
			preferred_categories: self
				.preferred_categories
				.unwrap_or_else(|| current.preferred_categories.clone()),
		}
	}
}
