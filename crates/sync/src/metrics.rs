use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one coordinator.
///
/// Relaxed ordering throughout; counts are for observability, not control flow.
#[derive(Debug, Default)]
pub struct SyncMetrics {
	pushes_sent: AtomicU64,
	push_failures: AtomicU64,
	pulls_accepted: AtomicU64,
	pulls_rejected: AtomicU64,
	corruption_rejections: AtomicU64,
	probe_attempts: AtomicU64,
}

impl SyncMetrics {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn inc_push_sent(&self) {
		self.pushes_sent.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn inc_push_failure(&self) {
		self.push_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn inc_pull_accepted(&self) {
		self.pulls_accepted.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn inc_pull_rejected(&self, corrupt: bool) {
		self.pulls_rejected.fetch_add(1, Ordering::Relaxed);
		if corrupt {
			self.corruption_rejections.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub(crate) fn inc_probe_attempt(&self) {
		self.probe_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub fn pushes_sent(&self) -> u64 {
		self.pushes_sent.load(Ordering::Relaxed)
	}

	pub fn push_failures(&self) -> u64 {
		self.push_failures.load(Ordering::Relaxed)
	}

	pub fn pulls_accepted(&self) -> u64 {
		self.pulls_accepted.load(Ordering::Relaxed)
	}

	pub fn pulls_rejected(&self) -> u64 {
		self.pulls_rejected.load(Ordering::Relaxed)
	}

	pub fn corruption_rejections(&self) -> u64 {
		self.corruption_rejections.load(Ordering::Relaxed)
	}

	pub fn probe_attempts(&self) -> u64 {
		self.probe_attempts.load(Ordering::Relaxed)
	}
}
