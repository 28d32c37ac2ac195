use std::{
	collections::HashMap,
	sync::{
		Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

use crate::{
	Error, Result,
	record::{BoxFuture, RecordKey, RecordStore},
};

/// Process-local record storage with failure injection.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
	records: Mutex<HashMap<RecordKey, String>>,
	fail_reads: AtomicBool,
	fail_writes: AtomicBool,
	writes: AtomicUsize,
}
impl MemoryRecordStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_record(self, key: RecordKey, payload: impl Into<String>) -> Self {
		self.lock().insert(key, payload.into());

		self
	}

	pub fn set_fail_reads(&self, fail: bool) {
		self.fail_reads.store(fail, Ordering::SeqCst);
	}

	pub fn set_fail_writes(&self, fail: bool) {
		self.fail_writes.store(fail, Ordering::SeqCst);
	}

	pub fn record(&self, key: RecordKey) -> Option<String> {
		self.lock().get(&key).cloned()
	}

	/// Successful writes so far.
	pub fn write_count(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RecordKey, String>> {
		self.records.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl RecordStore for MemoryRecordStore {
	fn load<'a>(&'a self, key: RecordKey) -> BoxFuture<'a, Result<Option<String>>> {
		let result = if self.fail_reads.load(Ordering::SeqCst) {
			Err(Error::Unavailable(format!("Injected read failure for {key}.")))
		} else {
			Ok(self.record(key))
		};

		Box::pin(async move { result })
	}

	fn save<'a>(&'a self, key: RecordKey, payload: String) -> BoxFuture<'a, Result<()>> {
		let result = if self.fail_writes.load(Ordering::SeqCst) {
			Err(Error::Unavailable(format!("Injected write failure for {key}.")))
		} else {
			self.lock().insert(key, payload);
			self.writes.fetch_add(1, Ordering::SeqCst);

			Ok(())
		};

		Box::pin(async move { result })
	}
}
