use std::time::Duration;

use tokio::time::Instant;

/// Synchronization bookkeeping owned by one coordination context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
	/// Last content sent to or accepted from the surface.
	pub last_pushed_content: String,
	/// Set on every push attempt, before the surface confirms it.
	pub last_push_time: Option<Instant>,
	/// Set on every accepted pull.
	pub last_received_time: Option<Instant>,
	/// Written only by the readiness gate.
	pub is_ready: bool,
	/// Set once at teardown, never cleared.
	pub is_cleaned_up: bool,
}

impl SyncState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a push attempt optimistically.
	pub fn record_push(&mut self, content: &str, now: Instant) {
		content.clone_into(&mut self.last_pushed_content);
		self.last_push_time = Some(now);
	}

	/// Records an accepted pull.
	pub fn record_received(&mut self, content: &str, now: Instant) {
		content.clone_into(&mut self.last_pushed_content);
		self.last_received_time = Some(now);
	}

	pub fn pushed_within(&self, now: Instant, window: Duration) -> bool {
		within(self.last_push_time, now, window)
	}

	pub fn received_within(&self, now: Instant, window: Duration) -> bool {
		within(self.last_received_time, now, window)
	}

	/// Whether push and pull may run at all.
	pub fn is_live(&self) -> bool {
		self.is_ready && !self.is_cleaned_up
	}
}

fn within(at: Option<Instant>, now: Instant, window: Duration) -> bool {
	at.is_some_and(|t| now.saturating_duration_since(t) < window)
}
