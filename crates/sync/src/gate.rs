//! Readiness gate.
//!
//! ```text
//! Uninitialized -> Probing -> Initializing -> Ready
//!                                   \-> Failed
//! ```
//!
//! A gate instance only moves forward. Reloading the surface replaces the
//! instance with a fresh one at a higher generation; `Ready` and `Failed`
//! are terminal for the instance they belong to.

use std::sync::Arc;
use std::time::Duration;

use duet_worker::GenerationToken;

use crate::metrics::SyncMetrics;
use crate::surface::RenderSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateState {
	Uninitialized,
	Probing,
	Initializing,
	Ready,
	Failed,
}

impl GateState {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Uninitialized => "uninitialized",
			Self::Probing => "probing",
			Self::Initializing => "initializing",
			Self::Ready => "ready",
			Self::Failed => "failed",
		}
	}

	const fn can_advance_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(Self::Uninitialized, Self::Probing) | (Self::Probing, Self::Initializing) | (Self::Initializing, Self::Ready) | (Self::Initializing, Self::Failed)
		)
	}
}

/// One gate instance, scoped to a surface load.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
	generation: u64,
	state: GateState,
}

impl ReadinessGate {
	pub const fn new(generation: u64) -> Self {
		Self {
			generation,
			state: GateState::Uninitialized,
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub const fn state(&self) -> GateState {
		self.state
	}

	pub const fn is_ready(&self) -> bool {
		matches!(self.state, GateState::Ready)
	}

	/// Moves to `next` if that is a forward edge. Returns false otherwise.
	pub fn advance(&mut self, next: GateState) -> bool {
		if !self.state.can_advance_to(next) {
			tracing::debug!(
				generation = self.generation,
				from = self.state.as_str(),
				to = next.as_str(),
				"sync.gate.invalid_transition"
			);
			return false;
		}
		tracing::debug!(generation = self.generation, from = self.state.as_str(), to = next.as_str(), "sync.gate.transition");
		self.state = next;
		true
	}
}

/// Probes until the surface API exists, retrying every `delay` without bound.
///
/// Returns false when `token` is cancelled first. Probe errors count as
/// "not yet available".
pub async fn probe_until_available(surface: Arc<dyn RenderSurface>, token: GenerationToken, delay: Duration, metrics: Arc<SyncMetrics>) -> bool {
	loop {
		if token.is_cancelled() {
			return false;
		}
		metrics.inc_probe_attempt();
		match surface.probe().await {
			Ok(true) => return !token.is_cancelled(),
			Ok(false) => tracing::trace!(generation = token.generation(), "sync.gate.probe_absent"),
			Err(err) => tracing::trace!(generation = token.generation(), error = %err, "sync.gate.probe_error"),
		}
		tokio::select! {
			biased;
			_ = token.cancelled() => return false,
			_ = tokio::time::sleep(delay) => {}
		}
	}
}
