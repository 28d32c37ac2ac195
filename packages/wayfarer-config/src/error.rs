use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read wayfarer config at {path:?}: {source}")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Config at {path:?} is not valid TOML: {source}")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	/// A rule violation; the message names the offending key.
	#[error("Invalid config: {message}")]
	Validation { message: String },
}
