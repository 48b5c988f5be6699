use serde::{Deserialize, Serialize};

/// Structural state of the caller's document.
///
/// Owned by the caller. While it is anything other than [`ContentState::Idle`]
/// pulled data is never applied to the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentState {
	#[default]
	Idle,
	/// The document is being replaced wholesale (project switch, restore).
	Resetting,
	/// A structural operation such as zoom or hierarchy enforcement is running.
	Transitioning,
}

impl ContentState {
	pub const fn is_idle(self) -> bool {
		matches!(self, Self::Idle)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Resetting => "resetting",
			Self::Transitioning => "transitioning",
		}
	}
}

/// Word and character counts reported by a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentStats {
	pub words: u64,
	pub characters: u64,
}

impl DocumentStats {
	pub const fn new(words: u64, characters: u64) -> Self {
		Self { words, characters }
	}
}

/// Lightweight metadata returned by a metadata-only poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollData {
	pub stats: DocumentStats,
	/// Title of the section the cursor currently sits in, if any.
	#[serde(default)]
	pub section_title: Option<String>,
}
