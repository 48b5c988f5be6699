use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{GenerationToken, TaskClass};

/// Whether a repeating task keeps going after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
	Continue,
	Stop,
}

/// A cancellable periodic task.
///
/// The first tick fires one full `period` after start. The token is checked
/// before each tick body runs, so no tick executes after [`Self::cancel`]
/// returns. A slow body never queues a burst of catch-up ticks.
#[derive(Debug)]
pub struct RepeatingTask {
	name: &'static str,
	token: GenerationToken,
	handle: JoinHandle<()>,
}

impl RepeatingTask {
	pub fn start<F>(name: &'static str, period: Duration, token: GenerationToken, mut tick: F) -> Self
	where
		F: FnMut() -> TickFlow + Send + 'static,
	{
		let task_token = token.clone();
		let handle = crate::spawn(TaskClass::Timer, async move {
			let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
			interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				tokio::select! {
					biased;
					_ = task_token.cancelled() => break,
					_ = interval.tick() => {}
				}
				if task_token.is_cancelled() {
					break;
				}
				if tick() == TickFlow::Stop {
					tracing::trace!(task = name, "worker.repeat.stopped");
					break;
				}
			}
		});
		tracing::debug!(task = name, generation = token.generation(), period_ms = period.as_millis() as u64, "worker.repeat.start");
		Self { name, token, handle }
	}

	pub fn generation(&self) -> u64 {
		self.token.generation()
	}

	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}

	/// Requests cancellation. Does not wait for the task to exit.
	pub fn cancel(&self) {
		if !self.token.is_cancelled() {
			tracing::debug!(task = self.name, generation = self.token.generation(), "worker.repeat.cancel");
		}
		self.token.cancel();
	}
}

impl Drop for RepeatingTask {
	fn drop(&mut self) {
		self.token.cancel();
	}
}
