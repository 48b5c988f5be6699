//! Cursor handoff between surfaces.
//!
//! Saving happens on the outgoing surface right before a switch; restoring
//! happens on the incoming one after activation. A position that has been
//! set programmatically but not yet confirmed is "pending" and takes
//! precedence over any live read, since a read would race the in-flight set.

use duet_primitives::CursorPosition;

use crate::surface::SurfaceError;

/// Where a saved position comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSource {
	/// Not ready or already torn down: report start of document without blocking.
	Default,
	/// An unconfirmed restore is outstanding: report it as is.
	Pending(CursorPosition),
	/// Read the live position from the surface.
	Live,
}

#[derive(Debug, Clone, Default)]
pub struct CursorHandoffState {
	pending_restore: Option<CursorPosition>,
}

impl CursorHandoffState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn plan_save(&self, ready: bool, cleaned_up: bool) -> SaveSource {
		if !ready || cleaned_up {
			return SaveSource::Default;
		}
		match self.pending_restore {
			Some(position) => SaveSource::Pending(position),
			None => SaveSource::Live,
		}
	}

	pub fn pending(&self) -> Option<CursorPosition> {
		self.pending_restore
	}

	pub fn set_pending(&mut self, position: CursorPosition) {
		self.pending_restore = Some(position);
	}

	/// Clears the pending value if it is still `position`.
	///
	/// A newer restore issued meanwhile stays pending.
	pub fn settle(&mut self, position: CursorPosition) -> bool {
		if self.pending_restore == Some(position) {
			self.pending_restore = None;
			true
		} else {
			false
		}
	}
}

/// Maps a cursor read to a usable position, defaulting to start of document.
pub fn resolve_read(result: Result<CursorPosition, SurfaceError>) -> CursorPosition {
	match result {
		Ok(position) => position,
		Err(err) => {
			tracing::debug!(error = %err, "sync.cursor.read_fallback");
			CursorPosition::START
		}
	}
}
