use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = wayfarer_finder::Args::parse();
	wayfarer_finder::run(args).await
}
