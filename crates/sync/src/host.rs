use duet_primitives::{ContentState, CursorPosition, DocumentStats};

/// Native side of the synchronization contract.
///
/// Implemented by the caller that owns the authoritative document. All
/// methods are invoked from the coordination context, never concurrently for
/// one coordinator.
pub trait DocumentHost: Send + Sync + 'static {
	/// Current authoritative content.
	fn content(&self) -> String;

	/// Replaces the authoritative content with an accepted pull.
	fn set_content(&self, text: String);

	/// Called once per accepted pull, after [`Self::set_content`].
	fn on_content_change(&self, text: &str);

	fn on_stats_change(&self, stats: DocumentStats);

	fn on_section_title_change(&self, _title: Option<&str>) {}

	/// Receives the final cursor read at teardown for persistence.
	fn on_cursor_position_saved(&self, position: CursorPosition);

	fn content_state(&self) -> ContentState;

	fn is_resetting_content(&self) -> bool;
}
