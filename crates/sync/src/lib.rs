//! Bidirectional content synchronization between a native document model and
//! an embedded render surface.
//!
//! The native side owns the authoritative document. Each visible surface gets
//! one [`SyncCoordinator`], a single task that serializes every state change:
//!
//! * [`gate`]: probes until the surface API exists, then initializes it once.
//! * [`push`]: decides whether a native edit is forwarded to the surface.
//! * [`pull`]: decides whether a surface report is accepted into the document.
//! * [`delivery`]: poll loop and push-notification ingress feeding the pull path.
//! * [`cursor`]: two-phase cursor save/restore used when switching surfaces.
//! * [`ack`]: one-shot callback fired on the surface's paint-complete signal.
//!
//! Reconciliation is last-writer-wins with heuristic corruption rejection.
//! Nothing here surfaces errors to the user: failures are logged and the
//! coordinator keeps the last known-good state.

pub mod ack;
pub mod config;
mod coordinator;
pub mod cursor;
pub mod delivery;
mod error;
pub mod gate;
mod host;
mod metrics;
pub mod pull;
pub mod push;
mod state;
pub mod surface;
mod switch;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, CorruptionConfig, Delivery, SettingsPatch, SurfaceSettings, SyncConfig};
pub use coordinator::{SyncCoordinator, SyncHandle, SyncSnapshot};
pub use delivery::NotificationSink;
pub use error::{Result, SyncError};
pub use gate::GateState;
pub use host::DocumentHost;
pub use metrics::SyncMetrics;
pub use state::SyncState;
pub use surface::{InitPayload, RenderSurface, SurfaceError, SurfaceNotification};
pub use switch::{CursorHandoff, SurfaceSwitcher};
