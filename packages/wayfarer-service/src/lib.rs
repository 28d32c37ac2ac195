pub mod cache;
pub mod controller;
pub mod history;
pub mod telemetry;

mod error;

pub use cache::ResultCache;
pub use controller::{ControllerOptions, QueryController};
pub use error::{Error, Result};
pub use history::{HistoryStore, PersistenceFailure};
pub use telemetry::Telemetry;
pub use wayfarer_storage::BoxFuture;

use wayfarer_domain::PlaceRef;

/// The place index the search layer sits in front of.
///
/// Implementations must be deterministic for a given index snapshot and
/// return finite, already ranked lists. They may complete synchronously or
/// suspend; the controller treats every call as a suspension point.
pub trait SearchIndex
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<Vec<PlaceRef>>>;

	fn suggest<'a>(
		&'a self,
		partial_query: &'a str,
		limit: usize,
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>>;
}
