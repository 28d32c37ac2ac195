use unicode_segmentation::UnicodeSegmentation;

/// Where a piece of input text falls relative to the search thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryBand {
	/// Nothing but whitespace.
	Empty,
	/// Long enough to ask for suggestions, too short to search.
	SuggestOnly,
	/// Below both thresholds.
	TooShort,
	Searchable,
}
impl QueryBand {
	pub fn classify(text: &str, min_query_length: usize, suggestion_min_length: usize) -> Self {
		let len = query_len(text);

		if len == 0 {
			Self::Empty
		} else if len >= min_query_length {
			Self::Searchable
		} else if len >= suggestion_min_length {
			Self::SuggestOnly
		} else {
			Self::TooShort
		}
	}
}

/// Length of the trimmed text in extended grapheme clusters.
pub fn query_len(text: &str) -> usize {
	text.trim().graphemes(true).count()
}

/// Case-insensitive comparison key for a query.
pub fn fold_query(text: &str) -> String {
	text.trim().to_lowercase()
}
