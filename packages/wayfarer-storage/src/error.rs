#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to access record file at {path:?}.")]
	Io { path: std::path::PathBuf, source: std::io::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Record store unavailable: {0}")]
	Unavailable(String),
	#[error("Invalid snapshot: {0}")]
	InvalidSnapshot(String),
}
