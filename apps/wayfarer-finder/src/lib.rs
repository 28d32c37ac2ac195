pub mod catalog;
pub mod cli;
pub mod command;
pub mod render;
pub mod session;

pub use cli::Args;

use std::sync::Arc;

use tokio::{
	io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader},
	sync::watch,
};
use tracing_subscriber::EnvFilter;

use wayfarer_domain::SearchState;
use wayfarer_service::{ControllerOptions, HistoryStore, QueryController, ResultCache};
use wayfarer_storage::FileRecordStore;

use crate::{
	catalog::CatalogIndex,
	command::Command,
	session::{Flow, Session},
};

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = wayfarer_config::load(&args.config)?;
	init_tracing(&config)?;
	let catalog = match args.catalog.as_deref() {
		Some(path) => CatalogIndex::load(path).await?,
		None => CatalogIndex::sample()?,
	};
	tracing::info!(places = catalog.len(), "Place catalog loaded.");

	let records = Arc::new(FileRecordStore::new(&config.storage.data_dir));
	let store = Arc::new(HistoryStore::open(records).await);
	if let Some(failure) = store.take_last_error() {
		tracing::warn!(error = %failure.to_error(), "Starting with partially restored data.");
	}

	let options = ControllerOptions::from_config(&config).with_preferences(&store.preferences());
	let cache = ResultCache::global(&config.search.cache);
	let controller = QueryController::with_history(options, Arc::new(catalog), cache, store.clone());
	let renderer = tokio::spawn(render_states(controller.subscribe()));
	let session = Session::new(controller, store);
	let mut stdout = io::stdout();
	let mut lines = BufReader::new(io::stdin()).lines();

	stdout.write_all(command::HELP.as_bytes()).await?;
	stdout.write_all(b"\n").await?;
	stdout.flush().await?;

	while let Some(line) = lines.next_line().await? {
		let outcome = match Command::parse(&line) {
			Ok(command) => session.execute(command).await,
			Err(err) => Err(err),
		};
		let text = match outcome {
			Ok((Flow::Quit, _)) => break,
			Ok((Flow::Continue, text)) => text,
			Err(err) => Some(format!("! {err}\n")),
		};

		if let Some(text) = text {
			stdout.write_all(text.as_bytes()).await?;
			stdout.flush().await?;
		}
	}

	drop(session);
	renderer.abort();
	Ok(())
}

async fn render_states(mut updates: watch::Receiver<SearchState>) {
	let mut stdout = io::stdout();

	while updates.changed().await.is_ok() {
		let text = render::state(&updates.borrow_and_update());

		if text.is_empty() {
			continue;
		}
		if stdout.write_all(text.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
			break;
		}
	}
}

fn init_tracing(config: &wayfarer_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
	Ok(())
}
