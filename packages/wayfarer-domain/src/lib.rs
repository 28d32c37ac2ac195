//! Data model shared by the wayfarer search layer.
//!
//! Everything here is plain data plus pure helpers; nothing performs I/O or
//! schedules work. Persistence lives in `wayfarer-storage` and the request
//! pipeline in `wayfarer-service`.

pub mod favorites;
pub mod history;
pub mod place;
pub mod preferences;
pub mod query;
pub mod state;
pub mod time_serde;

pub use favorites::FavoritePlace;
pub use history::{HistoryItem, RecentSearches};
pub use place::PlaceRef;
pub use preferences::{PreferencesPatch, SearchPreferences};
pub use query::QueryBand;
pub use state::{ErrorKind, PerformanceStats, SearchState};
