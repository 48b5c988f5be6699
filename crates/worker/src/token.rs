use tokio_util::sync::CancellationToken;

/// Counts load generations for one coordinator.
///
/// Generation 0 means nothing was loaded yet; the first [`advance`] yields 1.
///
/// [`advance`]: GenerationClock::advance
#[derive(Debug, Default)]
pub struct GenerationClock {
	current: u64,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	pub const fn current(&self) -> u64 {
		self.current
	}

	pub fn advance(&mut self) -> u64 {
		self.current = self.current.wrapping_add(1);
		self.current
	}
}

/// Cancellation scope for everything started under one load generation.
///
/// The probe and the poll loop each take a [`child`](Self::child); cancelling
/// the root on reload or teardown stops both, while a finished probe can drop
/// its own child without touching the poll loop.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	/// Opens the next generation on `clock`.
	pub fn fresh(clock: &mut GenerationClock) -> Self {
		Self {
			generation: clock.advance(),
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}

	pub fn child(&self) -> Self {
		Self {
			generation: self.generation,
			cancel: self.cancel.child_token(),
		}
	}
}
