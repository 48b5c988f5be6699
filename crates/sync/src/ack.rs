//! Single-slot, one-shot acknowledgement.
//!
//! Lets a caller tie a visible transition to the surface's paint-complete
//! signal, since it cannot otherwise tell when an asynchronous render is done.

/// Callback run when the surface reports that rendering settled.
pub type AckCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
pub struct AckSlot {
	pending: Option<AckCallback>,
}

impl std::fmt::Debug for AckSlot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AckSlot").field("armed", &self.is_armed()).finish()
	}
}

impl AckSlot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `callback`, dropping any previous uncalled one. Returns true if one was replaced.
	pub fn register(&mut self, callback: AckCallback) -> bool {
		self.pending.replace(callback).is_some()
	}

	/// Runs and clears the pending callback. Returns false when the slot was empty.
	pub fn fire(&mut self) -> bool {
		match self.pending.take() {
			Some(callback) => {
				callback();
				true
			}
			None => false,
		}
	}

	pub fn is_armed(&self) -> bool {
		self.pending.is_some()
	}

	/// Drops the pending callback without running it.
	pub fn clear(&mut self) {
		self.pending = None;
	}
}
