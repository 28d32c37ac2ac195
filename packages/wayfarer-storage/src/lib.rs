pub mod file;
pub mod memory;
pub mod record;
pub mod snapshot;

mod error;

pub use error::Error;
pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;
pub use record::{BoxFuture, RecordKey, RecordStore};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};

pub type Result<T, E = Error> = std::result::Result<T, E>;
