//! Native-to-surface forwarding decision.

use std::time::Duration;

use tokio::time::Instant;

use crate::state::SyncState;

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDecision {
	/// Forward to the surface.
	Send,
	/// Equal to what a pull just delivered; pushing it back would echo.
	EchoOfPull,
	/// The surface already holds this content.
	Unchanged,
}

impl PushDecision {
	pub const fn should_push(self) -> bool {
		matches!(self, Self::Send)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Send => "send",
			Self::EchoOfPull => "echo_of_pull",
			Self::Unchanged => "unchanged",
		}
	}
}

/// Decides whether `candidate` should be forwarded to the surface.
pub fn decide(state: &SyncState, candidate: &str, now: Instant, echo_window: Duration) -> PushDecision {
	let same = candidate == state.last_pushed_content;
	if same && state.received_within(now, echo_window) {
		return PushDecision::EchoOfPull;
	}
	if same {
		return PushDecision::Unchanged;
	}
	PushDecision::Send
}
