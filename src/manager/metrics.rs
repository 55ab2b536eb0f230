// std
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
// self
use crate::_prelude::*;

/// Thread-safe counters for token endpoint refreshes.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	// Unix millis of the newest persisted fetch; zero until the first success.
	last_fetch_millis: AtomicI64,
}
impl RefreshMetrics {
	/// Returns the total number of refresh attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that fetched and persisted a token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refreshes.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the `lastFetchTime` of the newest token this manager persisted, if any.
	pub fn last_fetch_time(&self) -> Option<OffsetDateTime> {
		match self.last_fetch_millis.load(Ordering::Relaxed) {
			0 => None,
			millis => OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok(),
		}
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self, fetched_at: OffsetDateTime) {
		let millis = i64::try_from(fetched_at.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX);

		self.success.fetch_add(1, Ordering::Relaxed);
		self.last_fetch_millis.fetch_max(millis, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn last_fetch_time_tracks_newest_success() {
		let metrics = RefreshMetrics::default();

		assert_eq!(metrics.last_fetch_time(), None);

		let newer = macros::datetime!(2025-01-01 00:00:01.500 UTC);
		let older = macros::datetime!(2025-01-01 00:00:00 UTC);

		metrics.record_attempt();
		metrics.record_success(newer);
		metrics.record_attempt();
		metrics.record_success(older);
		metrics.record_attempt();
		metrics.record_failure();

		assert_eq!(metrics.attempts(), 3);
		assert_eq!(metrics.successes(), 2);
		assert_eq!(metrics.failures(), 1);
		assert_eq!(metrics.last_fetch_time(), Some(newer));
	}
}
