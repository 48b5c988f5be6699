//! Coordinator configuration.
//!
//! Passed explicitly at construction. Loadable from TOML:
//!
//! ```toml
//! delivery = "poll"
//! poll_interval_ms = 500
//! poll_grace_ms = 600
//!
//! [corruption]
//! heading_marker = "#"
//! bad_fallback_markers = ["<br />"]
//! ```

use std::time::Duration;

use duet_primitives::{CursorPosition, Patch, ThemeVars};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a [`SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("config parse error: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("invalid config: {0}")]
	Invalid(String),
}

/// How surface-origin content reaches the native side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
	/// Full content is polled on a short fixed interval.
	Poll,
	/// The surface pushes content on edit; polling only fetches metadata.
	#[default]
	Notify,
}

/// Shape of the first-line corruption heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorruptionConfig {
	pub heading_marker: String,
	pub bad_fallback_markers: Vec<String>,
}

impl Default for CorruptionConfig {
	fn default() -> Self {
		Self {
			heading_marker: "#".to_string(),
			bad_fallback_markers: vec!["<br />".to_string()],
		}
	}
}

/// Timing and delivery policy for one coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
	pub delivery: Delivery,
	/// Full-content poll interval under [`Delivery::Poll`].
	pub poll_interval_ms: u64,
	/// Metadata poll interval under [`Delivery::Notify`].
	pub metadata_poll_interval_ms: u64,
	/// Grace window after a push for polled content.
	pub poll_grace_ms: u64,
	/// Grace window after a push for notified content.
	pub notify_grace_ms: u64,
	/// Window after an accepted pull during which pushing the same content is an echo.
	pub push_echo_window_ms: u64,
	/// Delay between readiness probes.
	pub probe_delay_ms: u64,
	/// Delay before a handed-off cursor is set on an already ready surface.
	pub cursor_settle_ms: u64,
	pub recenter_after_restore: bool,
	/// Upper bound on the final cursor read at teardown.
	pub teardown_cursor_timeout_ms: u64,
	pub corruption: CorruptionConfig,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			delivery: Delivery::Notify,
			poll_interval_ms: 500,
			metadata_poll_interval_ms: 3_000,
			poll_grace_ms: 600,
			notify_grace_ms: 200,
			push_echo_window_ms: 600,
			probe_delay_ms: 100,
			cursor_settle_ms: 50,
			recenter_after_restore: true,
			teardown_cursor_timeout_ms: 1_000,
			corruption: CorruptionConfig::default(),
		}
	}
}

impl SyncConfig {
	/// Poll-only delivery with its wider grace window.
	pub fn poll_only() -> Self {
		Self {
			delivery: Delivery::Poll,
			..Self::default()
		}
	}

	/// Parses and validates a TOML document. Missing keys take defaults.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		let positive = [
			("poll_interval_ms", self.poll_interval_ms),
			("metadata_poll_interval_ms", self.metadata_poll_interval_ms),
			("probe_delay_ms", self.probe_delay_ms),
		];
		if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
			return Err(ConfigError::Invalid(format!("{name} must be > 0")));
		}
		if self.corruption.heading_marker.is_empty() {
			return Err(ConfigError::Invalid("corruption.heading_marker must not be empty".into()));
		}
		if self.corruption.bad_fallback_markers.iter().any(String::is_empty) {
			return Err(ConfigError::Invalid("corruption.bad_fallback_markers must not contain empty markers".into()));
		}
		Ok(())
	}

	/// Interval of the poll loop for the configured delivery mode.
	pub fn poll_period(&self) -> Duration {
		match self.delivery {
			Delivery::Poll => Duration::from_millis(self.poll_interval_ms),
			Delivery::Notify => Duration::from_millis(self.metadata_poll_interval_ms),
		}
	}

	pub fn poll_grace(&self) -> Duration {
		Duration::from_millis(self.poll_grace_ms)
	}

	pub fn notify_grace(&self) -> Duration {
		Duration::from_millis(self.notify_grace_ms)
	}

	pub fn push_echo_window(&self) -> Duration {
		Duration::from_millis(self.push_echo_window_ms)
	}

	pub fn probe_delay(&self) -> Duration {
		Duration::from_millis(self.probe_delay_ms)
	}

	pub fn cursor_settle(&self) -> Duration {
		Duration::from_millis(self.cursor_settle_ms)
	}

	pub fn teardown_cursor_timeout(&self) -> Duration {
		Duration::from_millis(self.teardown_cursor_timeout_ms)
	}
}

/// Per-launch values handed to the surface at initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSettings {
	pub theme: Option<ThemeVars>,
	/// Cursor to open at when no handoff position is pending.
	pub initial_cursor: Option<CursorPosition>,
}

/// Partial update of [`SurfaceSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
	pub theme: Patch<ThemeVars>,
	pub initial_cursor: Patch<CursorPosition>,
}

impl SurfaceSettings {
	/// Applies `patch`. Returns true when the theme was touched.
	pub fn apply(&mut self, patch: SettingsPatch) -> bool {
		let theme_changed = patch.theme.apply_to(&mut self.theme);
		patch.initial_cursor.apply_to(&mut self.initial_cursor);
		theme_changed
	}
}
