use std::path::PathBuf;

use clap::{
	Parser,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};

/// Package version with the git revision and target it was built from.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	" (",
	env!("VERGEN_GIT_SHA"),
	", ",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
	")",
);

/// Interactive place finder over a JSON catalog.
#[derive(Debug, Parser)]
#[command(version = VERSION, rename_all = "kebab", styles = styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON list of places to search. Defaults to the bundled catalog.
	#[arg(long, value_name = "FILE")]
	pub catalog: Option<PathBuf>,
}

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Magenta.on_default() | Effects::BOLD | Effects::UNDERLINE)
		.usage(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::BrightBlack.on_default() | Effects::ITALIC)
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}
