use std::sync::Arc;

use color_eyre::{Result, eyre};

use wayfarer_service::{HistoryStore, QueryController};

use crate::{
	command::{Command, HELP},
	render,
};

/// What the input loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Quit,
}

/// Binds finder commands to one controller and its history store.
pub struct Session {
	controller: QueryController,
	store: Arc<HistoryStore>,
}
impl Session {
	pub fn new(controller: QueryController, store: Arc<HistoryStore>) -> Self {
		Self { controller, store }
	}

	/// Runs `command` and returns the text to show, if any.
	///
	/// Search output is not returned here; it arrives through the
	/// controller's published state.
	pub async fn execute(&self, command: Command) -> Result<(Flow, Option<String>)> {
		let output = match command {
			Command::Type(text) => {
				self.controller.set_query(&text);

				None
			},
			Command::Go(text) => {
				let text = text.unwrap_or_else(|| self.controller.state().query);

				self.controller.search(&text);

				None
			},
			Command::Pick(position) => {
				let place = self.result_at(position)?;
				let line = format!("Selected {}.\n", render::place(&place));

				self.controller.select_place(place);

				Some(line)
			},
			Command::Favorite { position, notes } => {
				let place = self.result_at(position)?;
				let name = place.name.clone();
				let inserted = self.store.add_to_favorites(place, notes).await;

				Some(if inserted {
					format!("Added {name} to favorites.\n")
				} else {
					format!("Updated favorite {name}.\n")
				})
			},
			Command::Unfavorite(id) => Some(if self.store.remove_from_favorites(&id).await {
				format!("Removed {id} from favorites.\n")
			} else {
				format!("{id} is not a favorite.\n")
			}),
			Command::Favorites => Some(render::favorites(&self.store.favorites())),
			Command::History => Some(render::history(&self.store.history())),
			Command::Recent => Some(render::queries(&self.store.recent_searches())),
			Command::Popular => Some(render::queries(&self.store.popular_searches())),
			Command::Stats => Some(render::stats(&self.controller.performance_stats())),
			Command::Forget(id) => Some(if self.store.remove_search_from_history(id).await {
				"Search forgotten.\n".to_string()
			} else {
				format!("No search with id {id}.\n")
			}),
			Command::Export(path) => {
				let payload = self.store.export_data()?;

				tokio::fs::write(&path, payload).await?;

				Some(format!("Exported to {}.\n", path.display()))
			},
			Command::Import(path) => {
				let raw = tokio::fs::read_to_string(&path).await?;

				self.store.import_data(&raw).await?;

				Some(format!("Imported {}.\n", path.display()))
			},
			Command::Clear => {
				self.controller.clear_search();

				None
			},
			Command::Wipe => {
				self.store.clear_all_data().await;

				Some("All stored data deleted.\n".to_string())
			},
			Command::Help => Some(format!("{HELP}\n")),
			Command::Quit => return Ok((Flow::Quit, None)),
		};
		let output = match self.store.take_last_error() {
			Some(failure) => {
				let warning = format!("! {}\n", failure.to_error());

				Some(output.map_or_else(|| warning.clone(), |output| output + &warning))
			},
			None => output,
		};

		Ok((Flow::Continue, output))
	}

	fn result_at(&self, position: usize) -> Result<wayfarer_domain::PlaceRef> {
		let results = self.controller.state().results;

		position
			.checked_sub(1)
			.and_then(|index| results.get(index).cloned())
			.ok_or_else(|| eyre::eyre!("No result number {position}; {} shown.", results.len()))
	}
}
