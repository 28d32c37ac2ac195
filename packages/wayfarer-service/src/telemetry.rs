use std::{collections::VecDeque, time::Duration};

use wayfarer_domain::PerformanceStats;

pub const DEFAULT_WINDOW: usize = 10;

/// Rolling window of index call durations for one controller.
#[derive(Debug, Clone)]
pub struct Telemetry {
	samples_ms: VecDeque<f64>,
	capacity: usize,
}
impl Telemetry {
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(1);

		Self { samples_ms: VecDeque::with_capacity(capacity), capacity }
	}

	/// Records one sample and returns it in milliseconds.
	pub fn record(&mut self, duration: Duration) -> f64 {
		let ms = duration.as_secs_f64() * 1_000.0;

		if self.samples_ms.len() == self.capacity {
			self.samples_ms.pop_front();
		}

		self.samples_ms.push_back(ms);

		ms
	}

	pub fn stats(&self) -> PerformanceStats {
		let Some(last) = self.samples_ms.back().copied() else {
			return PerformanceStats::default();
		};
		let average = self.samples_ms.iter().sum::<f64>() / self.samples_ms.len() as f64;

		PerformanceStats { last_search_duration_ms: last, average_search_duration_ms: average }
	}

	pub fn len(&self) -> usize {
		self.samples_ms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.samples_ms.is_empty()
	}
}
impl Default for Telemetry {
	fn default() -> Self {
		Self::new(DEFAULT_WINDOW)
	}
}
