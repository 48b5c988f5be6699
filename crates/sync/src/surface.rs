//! Capability contract of an embedded render surface.
//!
//! A surface is an independently scheduled rendering engine. Every call is a
//! round trip with no timeout of its own; the coordinator runs each one in a
//! separate task so a hung call stalls only itself.

use async_trait::async_trait;
use duet_primitives::{CursorPosition, DocumentStats, PollData, ThemeVars};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of one surface round trip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
	/// The surface API object does not exist (yet).
	#[error("surface api unavailable")]
	Unavailable,
	/// The surface rejected or failed to evaluate the call.
	#[error("surface evaluation failed: {0}")]
	Evaluation(String),
	/// The reply could not be decoded.
	#[error("malformed surface reply: {0}")]
	Malformed(String),
	/// The surface has been released.
	#[error("surface closed")]
	Closed,
}

/// Batched initialization call issued once the surface API exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
	pub content: String,
	pub theme: Option<ThemeVars>,
	pub cursor_position: Option<CursorPosition>,
}

/// Request/response calls a render surface must support.
#[async_trait]
pub trait RenderSurface: Send + Sync + 'static {
	/// Whether the surface's API object exists yet.
	async fn probe(&self) -> Result<bool, SurfaceError>;

	async fn initialize(&self, payload: InitPayload) -> Result<(), SurfaceError>;

	async fn set_content(&self, text: String) -> Result<(), SurfaceError>;

	async fn get_content(&self) -> Result<String, SurfaceError>;

	async fn get_stats(&self) -> Result<DocumentStats, SurfaceError>;

	/// Stats plus the current section title, without the content itself.
	async fn get_poll_data(&self) -> Result<PollData, SurfaceError>;

	async fn set_cursor_position(&self, position: CursorPosition) -> Result<(), SurfaceError>;

	async fn get_cursor_position(&self) -> Result<CursorPosition, SurfaceError>;

	async fn set_theme(&self, theme: ThemeVars) -> Result<(), SurfaceError>;

	/// Re-centers the viewport on the cursor. Surfaces without a viewport can ignore it.
	async fn scroll_cursor_into_view(&self) -> Result<(), SurfaceError> {
		Ok(())
	}
}

/// Decodes a JSON reply returned by a script-evaluating surface.
pub fn decode_reply<T: DeserializeOwned>(raw: &str) -> Result<T, SurfaceError> {
	serde_json::from_str(raw).map_err(|e| SurfaceError::Malformed(e.to_string()))
}

/// Asynchronous messages a surface sends without being asked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceNotification {
	/// The user edited inside the surface; carries the full content.
	ContentChanged { text: String },
	/// Rendering has settled.
	PaintComplete,
}

impl SurfaceNotification {
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(raw)
	}

	pub const fn kind(&self) -> &'static str {
		match self {
			Self::ContentChanged { .. } => "content_changed",
			Self::PaintComplete => "paint_complete",
		}
	}
}
