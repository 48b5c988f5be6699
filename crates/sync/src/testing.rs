//! Scriptable surface and host doubles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use duet_primitives::{ContentState, CursorPosition, DocumentStats, PollData, ThemeVars};
use parking_lot::Mutex;

use crate::host::DocumentHost;
use crate::surface::{InitPayload, RenderSurface, SurfaceError, decode_reply};

pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// One recorded call against a [`FakeSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SurfaceCall {
	Probe,
	Initialize(InitPayload),
	SetContent(String),
	GetContent,
	GetStats,
	GetPollData,
	SetCursor(CursorPosition),
	GetCursor,
	SetTheme(ThemeVars),
	ScrollIntoView,
}

#[derive(Debug)]
struct FakeState {
	absent_probes: u32,
	probes: u32,
	fail_init: bool,
	fail_set_content: bool,
	init_delay: Duration,
	hang_cursor_read: bool,
	content: String,
	stats: DocumentStats,
	poll_reply: String,
	cursor: CursorPosition,
	calls: Vec<SurfaceCall>,
}

/// In-memory surface. Immediate unless told otherwise; records every call.
#[derive(Debug)]
pub(crate) struct FakeSurface {
	state: Mutex<FakeState>,
}

impl FakeSurface {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(FakeState {
				absent_probes: 0,
				probes: 0,
				fail_init: false,
				fail_set_content: false,
				init_delay: Duration::ZERO,
				hang_cursor_read: false,
				content: String::new(),
				stats: DocumentStats::default(),
				poll_reply: r#"{"stats":{"words":0,"characters":0}}"#.to_string(),
				cursor: CursorPosition::START,
				calls: Vec::new(),
			}),
		}
	}

	/// The first `n` probes report the API as absent.
	pub fn available_after(self, n: u32) -> Self {
		self.state.lock().absent_probes = n;
		self
	}

	pub fn with_content(self, content: &str) -> Self {
		self.set_live_content(content);
		self
	}

	pub fn with_stats(self, stats: DocumentStats) -> Self {
		self.state.lock().stats = stats;
		self
	}

	pub fn with_poll_reply(self, raw: &str) -> Self {
		self.set_poll_reply(raw);
		self
	}

	pub fn with_cursor(self, position: CursorPosition) -> Self {
		self.set_live_cursor(position);
		self
	}

	pub fn with_init_delay(self, delay: Duration) -> Self {
		self.state.lock().init_delay = delay;
		self
	}

	pub fn failing_init(self) -> Self {
		self.set_fail_init(true);
		self
	}

	pub fn failing_push(self) -> Self {
		self.state.lock().fail_set_content = true;
		self
	}

	pub fn hanging_cursor_read(self) -> Self {
		self.state.lock().hang_cursor_read = true;
		self
	}

	pub fn set_fail_init(&self, fail: bool) {
		self.state.lock().fail_init = fail;
	}

	/// Simulates a user edit inside the surface.
	pub fn set_live_content(&self, content: &str) {
		content.clone_into(&mut self.state.lock().content);
	}

	pub fn set_poll_reply(&self, raw: &str) {
		raw.clone_into(&mut self.state.lock().poll_reply);
	}

	pub fn set_live_cursor(&self, position: CursorPosition) {
		self.state.lock().cursor = position;
	}

	pub fn live_content(&self) -> String {
		self.state.lock().content.clone()
	}

	pub fn calls(&self) -> Vec<SurfaceCall> {
		self.state.lock().calls.clone()
	}

	pub fn count(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
		self.state.lock().calls.iter().filter(|c| pred(c)).count()
	}

	pub fn init_payloads(&self) -> Vec<InitPayload> {
		self.state
			.lock()
			.calls
			.iter()
			.filter_map(|c| match c {
				SurfaceCall::Initialize(p) => Some(p.clone()),
				_ => None,
			})
			.collect()
	}

	fn record(&self, call: SurfaceCall) {
		self.state.lock().calls.push(call);
	}
}

#[async_trait]
impl RenderSurface for FakeSurface {
	async fn probe(&self) -> Result<bool, SurfaceError> {
		let mut state = self.state.lock();
		state.calls.push(SurfaceCall::Probe);
		state.probes = state.probes.saturating_add(1);
		Ok(state.probes > state.absent_probes)
	}

	async fn initialize(&self, payload: InitPayload) -> Result<(), SurfaceError> {
		let delay = self.state.lock().init_delay;
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		let mut state = self.state.lock();
		state.calls.push(SurfaceCall::Initialize(payload.clone()));
		if state.fail_init {
			return Err(SurfaceError::Evaluation("init rejected".into()));
		}
		state.content = payload.content;
		if let Some(cursor) = payload.cursor_position {
			state.cursor = cursor;
		}
		Ok(())
	}

	async fn set_content(&self, text: String) -> Result<(), SurfaceError> {
		let mut state = self.state.lock();
		state.calls.push(SurfaceCall::SetContent(text.clone()));
		if state.fail_set_content {
			return Err(SurfaceError::Evaluation("setContent threw".into()));
		}
		state.content = text;
		Ok(())
	}

	async fn get_content(&self) -> Result<String, SurfaceError> {
		let mut state = self.state.lock();
		state.calls.push(SurfaceCall::GetContent);
		Ok(state.content.clone())
	}

	async fn get_stats(&self) -> Result<DocumentStats, SurfaceError> {
		let mut state = self.state.lock();
		state.calls.push(SurfaceCall::GetStats);
		Ok(state.stats)
	}

	async fn get_poll_data(&self) -> Result<PollData, SurfaceError> {
		let raw = {
			let mut state = self.state.lock();
			state.calls.push(SurfaceCall::GetPollData);
			state.poll_reply.clone()
		};
		decode_reply(&raw)
	}

	async fn set_cursor_position(&self, position: CursorPosition) -> Result<(), SurfaceError> {
		let mut state = self.state.lock();
		state.calls.push(SurfaceCall::SetCursor(position));
		state.cursor = position;
		Ok(())
	}

	async fn get_cursor_position(&self) -> Result<CursorPosition, SurfaceError> {
		let (hang, cursor) = {
			let mut state = self.state.lock();
			state.calls.push(SurfaceCall::GetCursor);
			(state.hang_cursor_read, state.cursor)
		};
		if hang {
			std::future::pending::<()>().await;
		}
		Ok(cursor)
	}

	async fn set_theme(&self, theme: ThemeVars) -> Result<(), SurfaceError> {
		self.record(SurfaceCall::SetTheme(theme));
		Ok(())
	}

	async fn scroll_cursor_into_view(&self) -> Result<(), SurfaceError> {
		self.record(SurfaceCall::ScrollIntoView);
		Ok(())
	}
}

#[derive(Debug, Default)]
struct HostState {
	content: String,
	content_state: ContentState,
	resetting: bool,
	changes: Vec<String>,
	stats: Vec<DocumentStats>,
	titles: Vec<Option<String>>,
	saved_cursors: Vec<CursorPosition>,
}

/// Native document double recording every callback.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
	state: Mutex<HostState>,
}

impl RecordingHost {
	pub fn new(content: &str) -> Arc<Self> {
		let host = Self::default();
		content.clone_into(&mut host.state.lock().content);
		Arc::new(host)
	}

	/// A native-side edit of the authoritative content.
	pub fn edit(&self, content: &str) {
		content.clone_into(&mut self.state.lock().content);
	}

	pub fn set_content_state(&self, content_state: ContentState) {
		self.state.lock().content_state = content_state;
	}

	pub fn set_resetting(&self, resetting: bool) {
		self.state.lock().resetting = resetting;
	}

	pub fn current(&self) -> String {
		self.state.lock().content.clone()
	}

	pub fn changes(&self) -> Vec<String> {
		self.state.lock().changes.clone()
	}

	pub fn stats(&self) -> Vec<DocumentStats> {
		self.state.lock().stats.clone()
	}

	pub fn titles(&self) -> Vec<Option<String>> {
		self.state.lock().titles.clone()
	}

	pub fn saved_cursors(&self) -> Vec<CursorPosition> {
		self.state.lock().saved_cursors.clone()
	}
}

impl DocumentHost for RecordingHost {
	fn content(&self) -> String {
		self.current()
	}

	fn set_content(&self, text: String) {
		self.state.lock().content = text;
	}

	fn on_content_change(&self, text: &str) {
		self.state.lock().changes.push(text.to_string());
	}

	fn on_stats_change(&self, stats: DocumentStats) {
		self.state.lock().stats.push(stats);
	}

	fn on_section_title_change(&self, title: Option<&str>) {
		self.state.lock().titles.push(title.map(str::to_string));
	}

	fn on_cursor_position_saved(&self, position: CursorPosition) {
		self.state.lock().saved_cursors.push(position);
	}

	fn content_state(&self) -> ContentState {
		self.state.lock().content_state
	}

	fn is_resetting_content(&self) -> bool {
		self.state.lock().resetting
	}
}
