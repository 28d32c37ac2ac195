use wayfarer_domain::ErrorKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Search failed: {message}")]
	SearchFailed { message: String },
	#[error("Failed to read record {record}: {message}")]
	PersistenceRead { record: String, message: String },
	#[error("Failed to write record {record}: {message}")]
	PersistenceWrite { record: String, message: String },
	#[error("Import validation failed: {message}")]
	ImportValidation { message: String },
	#[error("Serialization failed: {message}")]
	Serialization { message: String },
}
impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::SearchFailed { .. } => ErrorKind::SearchFailed,
			Self::PersistenceRead { .. } => ErrorKind::PersistenceReadFailed,
			Self::PersistenceWrite { .. } | Self::Serialization { .. } =>
				ErrorKind::PersistenceWriteFailed,
			Self::ImportValidation { .. } => ErrorKind::ImportValidationFailed,
		}
	}
}
