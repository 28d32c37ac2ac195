use std::fmt::Write;

use wayfarer_domain::{FavoritePlace, HistoryItem, PerformanceStats, PlaceRef, SearchState};

pub fn place(place: &PlaceRef) -> String {
	match place.region.as_deref() {
		Some(region) => format!("{} [{}] ({region})", place.display_name(), place.category),
		None => format!("{} [{}]", place.display_name(), place.category),
	}
}

pub fn state(state: &SearchState) -> String {
	let mut out = String::new();

	if let Some(error) = state.error {
		let _ = writeln!(out, "! {} for {:?}.", error.as_str(), state.query.trim());
	} else if state.is_loading {
		let _ = writeln!(out, "… searching {:?}", state.query.trim());
	} else if state.has_searched && state.results.is_empty() {
		let _ = writeln!(out, "No places match {:?}.", state.query.trim());
	}

	for (position, result) in state.results.iter().enumerate() {
		let _ = writeln!(out, "{:>3}. {}", position + 1, place(result));
	}

	if !state.suggestions.is_empty() {
		let _ = writeln!(out, "  ~ {}", state.suggestions.join(" · "));
	}

	out
}

pub fn favorites(favorites: &[FavoritePlace]) -> String {
	if favorites.is_empty() {
		return "No favorites yet.\n".to_string();
	}

	favorites.iter().fold(String::new(), |mut out, favorite| {
		let _ = write!(out, "  {}  {}", favorite.place.id, place(&favorite.place));

		if let Some(notes) = favorite.notes.as_deref() {
			let _ = write!(out, " - {notes}");
		}

		out.push('\n');

		out
	})
}

pub fn history(history: &[HistoryItem]) -> String {
	if history.is_empty() {
		return "No searches yet.\n".to_string();
	}

	history.iter().fold(String::new(), |mut out, item| {
		let _ = writeln!(
			out,
			"  {}  {} ({} results, searched {}x)",
			item.id, item.query, item.result_count, item.search_count
		);

		out
	})
}

pub fn queries(queries: &[String]) -> String {
	if queries.is_empty() {
		return "Nothing here yet.\n".to_string();
	}

	queries.iter().enumerate().fold(String::new(), |mut out, (position, query)| {
		let _ = writeln!(out, "{:>3}. {query}", position + 1);

		out
	})
}

pub fn stats(stats: &PerformanceStats) -> String {
	format!(
		"Last search {:.1} ms, average {:.1} ms.\n",
		stats.last_search_duration_ms, stats.average_search_duration_ms
	)
}
