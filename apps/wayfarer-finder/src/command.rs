use std::path::PathBuf;

use color_eyre::{Result, eyre};
use uuid::Uuid;

/// One line of finder input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Plain text; treated as a keystroke edit.
	Type(String),
	/// Submit immediately. `None` resubmits the current query.
	Go(Option<String>),
	/// 1-based index into the shown results.
	Pick(usize),
	Favorite { position: usize, notes: Option<String> },
	Unfavorite(String),
	Favorites,
	History,
	Recent,
	Popular,
	Stats,
	Forget(Uuid),
	Export(PathBuf),
	Import(PathBuf),
	Clear,
	Wipe,
	Help,
	Quit,
}
impl Command {
	pub fn parse(line: &str) -> Result<Self> {
		let Some(rest) = line.trim_start().strip_prefix(':') else {
			return Ok(Self::Type(line.trim_end_matches(['\r', '\n']).to_string()));
		};
		let rest = rest.trim();
		let (name, arg) = match rest.split_once(char::is_whitespace) {
			Some((name, arg)) => (name, arg.trim()),
			None => (rest, ""),
		};
		let command = match name {
			"go" => Self::Go((!arg.is_empty()).then(|| arg.to_string())),
			"pick" => Self::Pick(parse_position(arg)?),
			"fav" => {
				let (position, notes) = match arg.split_once(char::is_whitespace) {
					Some((position, notes)) => (position, Some(notes.trim().to_string())),
					None => (arg, None),
				};

				Self::Favorite { position: parse_position(position)?, notes }
			},
			"unfav" => Self::Unfavorite(required(arg, "unfav needs a place id.")?),
			"favs" => Self::Favorites,
			"history" => Self::History,
			"recent" => Self::Recent,
			"popular" => Self::Popular,
			"stats" => Self::Stats,
			"forget" => Self::Forget(
				Uuid::parse_str(arg).map_err(|_| eyre::eyre!("forget needs a history id."))?,
			),
			"export" => Self::Export(required(arg, "export needs a file path.")?.into()),
			"import" => Self::Import(required(arg, "import needs a file path.")?.into()),
			"clear" => Self::Clear,
			"wipe" => Self::Wipe,
			"help" | "h" => Self::Help,
			"quit" | "q" => Self::Quit,
			other => return Err(eyre::eyre!("Unknown command :{other}. Try :help.")),
		};

		Ok(command)
	}
}

pub const HELP: &str = "\
Type to search as you go. Commands:
  :go [text]        search now
  :pick N           select result N
  :fav N [notes]    add result N to favorites
  :unfav ID         remove a favorite
  :favs             list favorites
  :history          list search history
  :recent           list recent searches
  :popular          list most searched queries
  :stats            show search timings
  :forget ID        remove a history entry
  :export PATH      write all data to a file
  :import PATH      replace all data from a file
  :clear            clear the search
  :wipe             delete all stored data
  :quit             exit";

fn parse_position(arg: &str) -> Result<usize> {
	match arg.parse::<usize>() {
		Ok(position) if position > 0 => Ok(position),
		_ => Err(eyre::eyre!("Expected a result number starting at 1, got {arg:?}.")),
	}
}

fn required(arg: &str, message: &'static str) -> Result<String> {
	if arg.is_empty() {
		return Err(eyre::eyre!(message));
	}

	Ok(arg.to_string())
}
