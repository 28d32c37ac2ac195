use std::{
	io::ErrorKind,
	path::{Path, PathBuf},
};

use tokio::fs;

use crate::{
	Error, Result,
	record::{BoxFuture, RecordKey, RecordStore},
};

/// One JSON file per record under a data directory.
///
/// Writes go to a sibling temporary file that is renamed into place, so a
/// crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
	dir: PathBuf,
}
impl FileRecordStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn path_for(&self, key: RecordKey) -> PathBuf {
		self.dir.join(format!("{}.json", key.as_str()))
	}

	async fn read(&self, key: RecordKey) -> Result<Option<String>> {
		let path = self.path_for(key);

		match fs::read_to_string(&path).await {
			Ok(raw) => Ok(Some(raw)),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
			Err(err) => Err(Error::Io { path, source: err }),
		}
	}

	async fn write(&self, key: RecordKey, payload: String) -> Result<()> {
		fs::create_dir_all(&self.dir)
			.await
			.map_err(|err| Error::Io { path: self.dir.clone(), source: err })?;

		let path = self.path_for(key);
		let tmp_path = self.dir.join(format!("{}.json.tmp", key.as_str()));

		fs::write(&tmp_path, payload.as_bytes())
			.await
			.map_err(|err| Error::Io { path: tmp_path.clone(), source: err })?;
		fs::rename(&tmp_path, &path)
			.await
			.map_err(|err| Error::Io { path: path.clone(), source: err })?;

		tracing::debug!(record = key.as_str(), path = %path.display(), "Record written.");

		Ok(())
	}
}
impl RecordStore for FileRecordStore {
	fn load<'a>(&'a self, key: RecordKey) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(self.read(key))
	}

	fn save<'a>(&'a self, key: RecordKey, payload: String) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.write(key, payload))
	}
}
