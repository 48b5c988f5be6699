//! Surface-to-native acceptance decision.
//!
//! Checks run in a fixed order and short-circuit on the first rejection:
//! lifecycle, caller suppression, grace window after a push, convergence,
//! corruption heuristic.

use std::time::Duration;

use duet_primitives::ContentState;
use tokio::time::Instant;

use crate::config::{CorruptionConfig, Delivery, SyncConfig};
use crate::state::SyncState;

/// Channel a pull candidate arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PullSource {
	Poll,
	Notification,
}

impl PullSource {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Poll => "poll",
			Self::Notification => "notification",
		}
	}
}

/// Caller-owned flags read at decision time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Suppression {
	pub resetting: bool,
	pub content_state: ContentState,
}

/// Why a pull was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
	CleanedUp,
	NotReady,
	Resetting,
	Suppressed(ContentState),
	/// Differs from a push still inside its grace window.
	StaleAfterPush,
	/// Already equal to the last pushed content.
	Converged,
	CorruptFallback,
}

impl RejectReason {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::CleanedUp => "cleaned_up",
			Self::NotReady => "not_ready",
			Self::Resetting => "resetting",
			Self::Suppressed(_) => "content_state",
			Self::StaleAfterPush => "stale_after_push",
			Self::Converged => "converged",
			Self::CorruptFallback => "corrupt_fallback",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullVerdict {
	Accept,
	Reject(RejectReason),
}

/// Acceptance policy for surface-origin content and metadata.
#[derive(Debug, Clone)]
pub struct PullGuard {
	grace: Duration,
	corruption: CorruptionConfig,
}

impl PullGuard {
	pub fn new(config: &SyncConfig) -> Self {
		Self {
			grace: match config.delivery {
				Delivery::Poll => config.poll_grace(),
				Delivery::Notify => config.notify_grace(),
			},
			corruption: config.corruption.clone(),
		}
	}

	/// Window after a push during which a differing candidate is stale.
	///
	/// Fixed by the delivery mode, whichever channel a candidate arrives on.
	pub fn grace(&self) -> Duration {
		self.grace
	}

	/// Lifecycle and suppression checks shared by content and metadata pulls.
	pub fn admit(&self, state: &SyncState, suppression: Suppression) -> Result<(), RejectReason> {
		if state.is_cleaned_up {
			return Err(RejectReason::CleanedUp);
		}
		if !state.is_ready {
			return Err(RejectReason::NotReady);
		}
		if suppression.resetting {
			return Err(RejectReason::Resetting);
		}
		if !suppression.content_state.is_idle() {
			return Err(RejectReason::Suppressed(suppression.content_state));
		}
		Ok(())
	}

	pub fn evaluate(&self, state: &SyncState, suppression: Suppression, candidate: &str, now: Instant) -> PullVerdict {
		if let Err(reason) = self.admit(state, suppression) {
			return PullVerdict::Reject(reason);
		}
		let converged = candidate == state.last_pushed_content;
		if !converged && state.pushed_within(now, self.grace) {
			return PullVerdict::Reject(RejectReason::StaleAfterPush);
		}
		if converged {
			return PullVerdict::Reject(RejectReason::Converged);
		}
		if is_corrupt_fallback(&self.corruption, &state.last_pushed_content, candidate) {
			return PullVerdict::Reject(RejectReason::CorruptFallback);
		}
		PullVerdict::Accept
	}

	/// Records an accepted candidate in `state`.
	pub fn accept(&self, state: &mut SyncState, candidate: &str, now: Instant) {
		state.record_received(candidate, now);
	}
}

/// First-line shape check for a known rich-surface serialization defect.
///
/// Trips when the last pushed content opened with a heading and the
/// candidate opens with a bad-fallback marker instead. Best effort only.
pub fn is_corrupt_fallback(config: &CorruptionConfig, last_pushed: &str, candidate: &str) -> bool {
	let pushed_first = first_line(last_pushed);
	let candidate_first = first_line(candidate);
	pushed_first.starts_with(config.heading_marker.as_str())
		&& config.bad_fallback_markers.iter().any(|marker| candidate_first.starts_with(marker.as_str()))
}

fn first_line(text: &str) -> &str {
	text.lines().next().unwrap_or("")
}
