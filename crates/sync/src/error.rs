use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned to callers of the coordinator handle.
///
/// Surface failures never show up here; they are absorbed by the coordinator.
#[derive(Debug, Error)]
pub enum SyncError {
	/// The coordination context has exited.
	#[error("coordinator closed")]
	CoordinatorClosed,
	/// Configuration could not be loaded.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// An inbound surface message could not be decoded.
	#[error("undecodable surface notification: {0}")]
	Notification(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
