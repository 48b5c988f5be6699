//! Switching between the source and rich surfaces.
//!
//! At most one coordinator is live at a time. A switch saves the cursor on
//! the outgoing coordinator, tears it down, brings up the incoming one and
//! hands it the saved position. Coordinators never share state; the position
//! travels by value and is announced on a broadcast bus.

use std::sync::Arc;

use duet_primitives::{CursorPosition, EditorMode};
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::{SettingsPatch, SurfaceSettings, SyncConfig};
use crate::coordinator::{SyncCoordinator, SyncHandle};
use crate::error::Result;
use crate::host::DocumentHost;
use crate::surface::RenderSurface;

const HANDOFF_BUS_CAPACITY: usize = 16;

/// Announcement of one completed cursor handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorHandoff {
	pub from: EditorMode,
	pub to: EditorMode,
	pub position: CursorPosition,
}

struct ActiveSurface {
	mode: EditorMode,
	handle: SyncHandle,
}

/// Owns the visible surface's coordinator across mode switches.
pub struct SurfaceSwitcher {
	host: Arc<dyn DocumentHost>,
	config: SyncConfig,
	settings: SurfaceSettings,
	active: Option<ActiveSurface>,
	handoffs: broadcast::Sender<CursorHandoff>,
}

impl SurfaceSwitcher {
	pub fn new(host: Arc<dyn DocumentHost>, config: SyncConfig, settings: SurfaceSettings) -> Self {
		let (handoffs, _) = broadcast::channel(HANDOFF_BUS_CAPACITY);
		Self {
			host,
			config,
			settings,
			active: None,
			handoffs,
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<CursorHandoff> {
		self.handoffs.subscribe()
	}

	pub fn active_mode(&self) -> Option<EditorMode> {
		self.active.as_ref().map(|a| a.mode)
	}

	pub fn active(&self) -> Option<&SyncHandle> {
		self.active.as_ref().map(|a| &a.handle)
	}

	/// Makes `surface` the visible one for `mode` and returns its coordinator.
	///
	/// The caller still reports the surface's load-complete through the
	/// returned handle; the handed-off cursor waits as a pending restore until then.
	pub async fn switch_to(&mut self, mode: EditorMode, surface: Arc<dyn RenderSurface>) -> SyncHandle {
		let handoff = match self.active.take() {
			Some(previous) => {
				let position = previous.handle.save_cursor_for_switch().await;
				previous.handle.teardown().await;
				Some(CursorHandoff {
					from: previous.mode,
					to: mode,
					position,
				})
			}
			None => None,
		};

		let handle = SyncCoordinator::spawn(surface, Arc::clone(&self.host), self.config.clone(), self.settings.clone());
		if let Some(handoff) = handoff {
			debug!(
				from = handoff.from.as_str(),
				to = handoff.to.as_str(),
				line = handoff.position.line,
				column = handoff.position.column,
				"sync.switch.handoff"
			);
			let _ = handle.restore_cursor(handoff.position);
			let _ = self.handoffs.send(handoff);
		} else {
			debug!(to = mode.as_str(), "sync.switch.activate");
		}

		self.active = Some(ActiveSurface {
			mode,
			handle: handle.clone(),
		});
		handle
	}

	/// Updates settings for the active surface and every later one.
	pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<()> {
		self.settings.apply(patch.clone());
		match &self.active {
			Some(active) => active.handle.update_settings(patch),
			None => Ok(()),
		}
	}

	/// Tears down the visible surface's coordinator, if any.
	pub async fn release(&mut self) {
		if let Some(active) = self.active.take() {
			active.handle.teardown().await;
		}
	}
}
