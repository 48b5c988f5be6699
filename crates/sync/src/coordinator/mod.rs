//! Per-surface coordination context.
//!
//! [`SyncCoordinator`] owns the [`SyncState`], the readiness gate, the pending
//! cursor restore and the acknowledgement slot, and runs on its own task.
//! Everything else reaches it through messages:
//!
//! * [`SyncHandle`] commands from the native side,
//! * surface notifications via [`NotificationSink`],
//! * completion events from spawned round trips and poll ticks.
//!
//! The context never awaits a surface call itself. Each round trip runs in
//! its own task and reports back as an [`Event`], tagged with the gate
//! generation it was issued under so completions from a previous load are
//! dropped. Teardown is the only cancellation path; completions arriving
//! afterwards are no-ops.

use std::future::Future;
use std::sync::Arc;

use duet_primitives::{CursorPosition, Patch, ThemeVars};
use duet_worker::{GenerationClock, GenerationToken, RepeatingTask, TaskClass};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::ack::{AckCallback, AckSlot};
use crate::config::{SettingsPatch, SurfaceSettings, SyncConfig};
use crate::cursor::{self, CursorHandoffState, SaveSource};
use crate::delivery::{self, NotificationSink, PollOutcome, PollPayload};
use crate::error::{Result, SyncError};
use crate::gate::{self, GateState, ReadinessGate};
use crate::host::DocumentHost;
use crate::metrics::SyncMetrics;
use crate::pull::{PullGuard, PullSource, PullVerdict, RejectReason, Suppression};
use crate::push;
use crate::state::SyncState;
use crate::surface::{InitPayload, RenderSurface, SurfaceError, SurfaceNotification};

/// Requests from the native side and the surface bridge.
pub(crate) enum Command {
	LoadComplete,
	Push(String),
	Notify(SurfaceNotification),
	SaveCursor(oneshot::Sender<CursorPosition>),
	RestoreCursor(CursorPosition),
	OnNextPaint(AckCallback),
	UpdateSettings(SettingsPatch),
	Snapshot(oneshot::Sender<SyncSnapshot>),
	Teardown(oneshot::Sender<()>),
}

/// Internal events: timer ticks and round-trip completions.
pub(crate) enum Event {
	PollTick,
	ProbeDone {
		generation: u64,
		available: bool,
	},
	Initialized {
		generation: u64,
		content: String,
		cursor: Option<CursorPosition>,
		result: std::result::Result<(), SurfaceError>,
	},
	PushDone {
		generation: u64,
		bytes: usize,
		result: std::result::Result<(), SurfaceError>,
	},
	Polled {
		generation: u64,
		outcome: PollOutcome,
	},
	CursorRead {
		result: std::result::Result<CursorPosition, SurfaceError>,
		reply: oneshot::Sender<CursorPosition>,
	},
	CursorRestored {
		generation: u64,
		position: CursorPosition,
		result: std::result::Result<(), SurfaceError>,
	},
	ThemeApplied {
		result: std::result::Result<(), SurfaceError>,
	},
	FinalCursor(Option<CursorPosition>),
}

/// Point-in-time view of a coordinator, taken on its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSnapshot {
	/// Gate generation; 0 before the first load-complete.
	pub generation: u64,
	pub gate: GateState,
	pub is_ready: bool,
	pub is_cleaned_up: bool,
	pub last_pushed_content: String,
	pub pending_cursor_restore: Option<CursorPosition>,
	pub ack_armed: bool,
}

/// Cloneable handle to one coordination context.
#[derive(Debug, Clone)]
pub struct SyncHandle {
	commands: mpsc::UnboundedSender<Command>,
	metrics: Arc<SyncMetrics>,
}

impl SyncHandle {
	fn send(&self, command: Command) -> Result<()> {
		self.commands.send(command).map_err(|_| SyncError::CoordinatorClosed)
	}

	/// The surface finished loading; (re)starts the readiness gate.
	pub fn load_complete(&self) -> Result<()> {
		self.send(Command::LoadComplete)
	}

	/// Native content changed. Forwarded if the push guard allows it.
	pub fn push(&self, content: impl Into<String>) -> Result<()> {
		self.send(Command::Push(content.into()))
	}

	/// Ingress for surface-originated messages.
	pub fn notifications(&self) -> NotificationSink {
		NotificationSink::new(&self.commands)
	}

	/// First phase of a surface switch: the position to hand to the next surface.
	///
	/// Never fails; a closed coordinator reports the start of the document.
	pub async fn save_cursor_for_switch(&self) -> CursorPosition {
		let (tx, rx) = oneshot::channel();
		if self.send(Command::SaveCursor(tx)).is_err() {
			return CursorPosition::START;
		}
		rx.await.unwrap_or(CursorPosition::START)
	}

	/// Second phase of a surface switch: place the handed-off cursor.
	pub fn restore_cursor(&self, position: CursorPosition) -> Result<()> {
		self.send(Command::RestoreCursor(position))
	}

	/// Runs `callback` once, on the next paint-complete signal.
	pub fn on_next_paint<F>(&self, callback: F) -> Result<()>
	where
		F: FnOnce() + Send + 'static,
	{
		self.send(Command::OnNextPaint(Box::new(callback)))
	}

	pub fn set_theme(&self, theme: ThemeVars) -> Result<()> {
		self.update_settings(SettingsPatch {
			theme: Patch::Set(theme),
			..SettingsPatch::default()
		})
	}

	pub fn update_settings(&self, patch: SettingsPatch) -> Result<()> {
		self.send(Command::UpdateSettings(patch))
	}

	pub async fn snapshot(&self) -> Result<SyncSnapshot> {
		let (tx, rx) = oneshot::channel();
		self.send(Command::Snapshot(tx))?;
		rx.await.map_err(|_| SyncError::CoordinatorClosed)
	}

	/// Releases the surface. Returns once the coordinator is marked cleaned up.
	///
	/// Idempotent; a no-op on an already closed coordinator.
	pub async fn teardown(&self) {
		let (tx, rx) = oneshot::channel();
		if self.send(Command::Teardown(tx)).is_ok() {
			let _ = rx.await;
		}
	}

	pub fn is_closed(&self) -> bool {
		self.commands.is_closed()
	}

	pub fn metrics(&self) -> &Arc<SyncMetrics> {
		&self.metrics
	}
}

/// Single-writer owner of one surface's synchronization state.
pub struct SyncCoordinator {
	surface: Arc<dyn RenderSurface>,
	host: Arc<dyn DocumentHost>,
	config: SyncConfig,
	settings: SurfaceSettings,
	pull_guard: PullGuard,
	poll_payload: PollPayload,
	metrics: Arc<SyncMetrics>,

	state: SyncState,
	gate: ReadinessGate,
	clock: GenerationClock,
	gate_token: Option<GenerationToken>,
	poll: Option<RepeatingTask>,
	cursor: CursorHandoffState,
	ack: AckSlot,
	last_stats: Option<duet_primitives::DocumentStats>,
	last_section_title: Option<String>,
	final_read_outstanding: bool,

	events_tx: mpsc::UnboundedSender<Event>,
}

impl SyncCoordinator {
	/// Spawns a coordination context for `surface` and returns its handle.
	///
	/// The gate stays uninitialized until [`SyncHandle::load_complete`].
	pub fn spawn(surface: Arc<dyn RenderSurface>, host: Arc<dyn DocumentHost>, config: SyncConfig, settings: SurfaceSettings) -> SyncHandle {
		let (commands_tx, commands_rx) = mpsc::unbounded_channel();
		let (events_tx, events_rx) = mpsc::unbounded_channel();
		let metrics = Arc::new(SyncMetrics::new());

		let coordinator = Self {
			surface,
			host,
			pull_guard: PullGuard::new(&config),
			poll_payload: PollPayload::for_delivery(config.delivery),
			config,
			settings,
			metrics: Arc::clone(&metrics),
			state: SyncState::new(),
			gate: ReadinessGate::new(0),
			clock: GenerationClock::new(),
			gate_token: None,
			poll: None,
			cursor: CursorHandoffState::new(),
			ack: AckSlot::new(),
			last_stats: None,
			last_section_title: None,
			final_read_outstanding: false,
			events_tx,
		};
		duet_worker::spawn(TaskClass::Context, coordinator.run(commands_rx, events_rx));

		SyncHandle {
			commands: commands_tx,
			metrics,
		}
	}

	async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>, mut events: mpsc::UnboundedReceiver<Event>) {
		let mut commands_open = true;
		loop {
			tokio::select! {
				biased;
				command = commands.recv(), if commands_open => match command {
					Some(command) => self.handle_command(command),
					None => {
						commands_open = false;
						self.teardown();
					}
				},
				Some(event) = events.recv() => self.handle_event(event),
			}
			if self.state.is_cleaned_up && !self.final_read_outstanding {
				break;
			}
		}
		debug!(generation = self.gate.generation(), "sync.context.exit");
	}

	fn handle_command(&mut self, command: Command) {
		match command {
			Command::LoadComplete => self.on_load_complete(),
			Command::Push(content) => self.on_push(content),
			Command::Notify(notification) => self.on_notification(notification),
			Command::SaveCursor(reply) => self.on_save_cursor(reply),
			Command::RestoreCursor(position) => self.on_restore_cursor(position),
			Command::OnNextPaint(callback) => {
				if self.state.is_cleaned_up {
					return;
				}
				if self.ack.register(callback) {
					debug!("sync.ack.replaced");
				}
			}
			Command::UpdateSettings(patch) => self.on_update_settings(patch),
			Command::Snapshot(reply) => {
				let _ = reply.send(self.snapshot());
			}
			Command::Teardown(reply) => {
				self.teardown();
				let _ = reply.send(());
			}
		}
	}

	fn handle_event(&mut self, event: Event) {
		match event {
			Event::PollTick => self.on_poll_tick(),
			Event::ProbeDone { generation, available } => self.on_probe_done(generation, available),
			Event::Initialized {
				generation,
				content,
				cursor,
				result,
			} => self.on_initialized(generation, content, cursor, result),
			Event::PushDone { generation, bytes, result } => {
				if let Err(err) = result {
					self.metrics.inc_push_failure();
					warn!(generation, bytes, error = %err, "sync.push.failed");
				} else {
					trace!(generation, bytes, "sync.push.done");
				}
			}
			Event::Polled { generation, outcome } => self.on_polled(generation, outcome),
			Event::CursorRead { result, reply } => {
				let position = cursor::resolve_read(result);
				debug!(line = position.line, column = position.column, source = "live", "sync.cursor.saved");
				let _ = reply.send(position);
			}
			Event::CursorRestored { generation, position, result } => {
				if generation != self.gate.generation() || self.state.is_cleaned_up {
					return;
				}
				if let Err(err) = result {
					warn!(generation, error = %err, "sync.cursor.restore_failed");
				}
				self.cursor.settle(position);
			}
			Event::ThemeApplied { result } => {
				if let Err(err) = result {
					warn!(error = %err, "sync.theme.failed");
				}
			}
			Event::FinalCursor(position) => {
				self.final_read_outstanding = false;
				match position {
					Some(position) => self.host.on_cursor_position_saved(position),
					None => debug!("sync.teardown.cursor_unavailable"),
				}
			}
		}
	}

	/// Runs `fut` as a detached round trip and feeds its event back to the context.
	fn round_trip<F>(&self, fut: F)
	where
		F: Future<Output = Event> + Send + 'static,
	{
		let events = self.events_tx.clone();
		duet_worker::spawn(TaskClass::RoundTrip, async move {
			let _ = events.send(fut.await);
		});
	}

	fn stop_gate_tasks(&mut self) {
		if let Some(poll) = self.poll.take() {
			poll.cancel();
		}
		if let Some(token) = self.gate_token.take() {
			token.cancel();
		}
	}

	fn on_load_complete(&mut self) {
		if self.state.is_cleaned_up {
			return;
		}
		self.stop_gate_tasks();

		let token = GenerationToken::fresh(&mut self.clock);
		let generation = token.generation();
		self.gate = ReadinessGate::new(generation);
		self.state.is_ready = false;
		self.gate.advance(GateState::Probing);

		let surface = Arc::clone(&self.surface);
		let metrics = Arc::clone(&self.metrics);
		let delay = self.config.probe_delay();
		let probe_token = token.child();
		self.round_trip(async move {
			let available = gate::probe_until_available(surface, probe_token, delay, metrics).await;
			Event::ProbeDone { generation, available }
		});
		self.gate_token = Some(token);
	}

	fn on_probe_done(&mut self, generation: u64, available: bool) {
		if !available || generation != self.gate.generation() || self.state.is_cleaned_up {
			return;
		}
		if !self.gate.advance(GateState::Initializing) {
			return;
		}

		let payload = InitPayload {
			content: self.host.content(),
			theme: self.settings.theme.clone(),
			cursor_position: self.cursor.pending().or(self.settings.initial_cursor),
		};
		let content = payload.content.clone();
		let cursor = payload.cursor_position;
		let surface = Arc::clone(&self.surface);
		debug!(generation, bytes = content.len(), has_cursor = cursor.is_some(), "sync.gate.initialize");
		self.round_trip(async move {
			let result = surface.initialize(payload).await;
			Event::Initialized {
				generation,
				content,
				cursor,
				result,
			}
		});
	}

	fn on_initialized(&mut self, generation: u64, content: String, cursor: Option<CursorPosition>, result: std::result::Result<(), SurfaceError>) {
		if generation != self.gate.generation() || self.state.is_cleaned_up {
			trace!(generation, "sync.gate.stale_init");
			return;
		}
		if let Err(err) = result {
			self.gate.advance(GateState::Failed);
			self.state.is_ready = false;
			warn!(generation, error = %err, "sync.gate.init_failed");
			return;
		}
		if !self.gate.advance(GateState::Ready) {
			return;
		}

		self.state.is_ready = true;
		self.state.record_push(&content, Instant::now());
		debug!(generation, "sync.gate.ready");

		if let Some(position) = cursor {
			self.cursor.settle(position);
			if self.config.recenter_after_restore {
				let surface = Arc::clone(&self.surface);
				duet_worker::spawn(TaskClass::Background, async move {
					let _ = surface.scroll_cursor_into_view().await;
				});
			}
		}

		if let Some(token) = &self.gate_token {
			self.poll = Some(delivery::start_poll_loop(self.config.poll_period(), token.child(), self.events_tx.clone()));
		}

		// Native edits made while the gate was initializing were not forwarded.
		let current = self.host.content();
		if current != content {
			self.on_push(current);
		}
	}

	fn on_push(&mut self, content: String) {
		if !self.state.is_live() {
			trace!(gate = self.gate.state().as_str(), "sync.push.deferred");
			return;
		}
		let now = Instant::now();
		let decision = push::decide(&self.state, &content, now, self.config.push_echo_window());
		if !decision.should_push() {
			trace!(reason = decision.as_str(), "sync.push.skipped");
			return;
		}

		self.state.record_push(&content, now);
		self.metrics.inc_push_sent();

		let generation = self.gate.generation();
		let bytes = content.len();
		let surface = Arc::clone(&self.surface);
		debug!(generation, bytes, "sync.push.send");
		self.round_trip(async move {
			let result = surface.set_content(content).await;
			Event::PushDone { generation, bytes, result }
		});
	}

	fn on_notification(&mut self, notification: SurfaceNotification) {
		if self.state.is_cleaned_up {
			return;
		}
		match notification {
			SurfaceNotification::ContentChanged { text } => {
				self.on_pulled(PullSource::Notification, text);
			}
			SurfaceNotification::PaintComplete => {
				if self.ack.fire() {
					debug!("sync.ack.fired");
				}
			}
		}
	}

	fn on_poll_tick(&mut self) {
		if !self.state.is_live() {
			return;
		}
		let generation = self.gate.generation();
		let surface = Arc::clone(&self.surface);
		let payload = self.poll_payload;
		self.round_trip(async move {
			let outcome = delivery::poll_once(surface, payload).await;
			Event::Polled { generation, outcome }
		});
	}

	fn on_polled(&mut self, generation: u64, outcome: PollOutcome) {
		if generation != self.gate.generation() {
			return;
		}
		match outcome {
			PollOutcome::Content { content, stats } => {
				let verdict = self.on_pulled(PullSource::Poll, content);
				let rejected_content = matches!(
					verdict,
					PullVerdict::Reject(RejectReason::StaleAfterPush | RejectReason::CorruptFallback)
				);
				if let Some(stats) = stats.filter(|_| !rejected_content) {
					self.on_metadata(stats, Patch::Unchanged);
				}
			}
			PollOutcome::Metadata(data) => self.on_metadata(data.stats, data.section_title.into()),
			PollOutcome::Dropped(err) => debug!(generation, error = %err, "sync.poll.dropped"),
		}
	}

	fn suppression(&self) -> Suppression {
		Suppression {
			resetting: self.host.is_resetting_content(),
			content_state: self.host.content_state(),
		}
	}

	fn on_pulled(&mut self, source: PullSource, candidate: String) -> PullVerdict {
		let now = Instant::now();
		let verdict = self.pull_guard.evaluate(&self.state, self.suppression(), &candidate, now);
		match verdict {
			PullVerdict::Accept => {
				self.pull_guard.accept(&mut self.state, &candidate, now);
				self.metrics.inc_pull_accepted();
				debug!(source = source.as_str(), bytes = candidate.len(), "sync.pull.accepted");
				self.host.set_content(candidate.clone());
				self.host.on_content_change(&candidate);
			}
			PullVerdict::Reject(reason) => {
				self.metrics.inc_pull_rejected(reason == RejectReason::CorruptFallback);
				if reason == RejectReason::Converged {
					trace!(source = source.as_str(), "sync.pull.converged");
				} else {
					debug!(source = source.as_str(), reason = reason.as_str(), "sync.pull.rejected");
				}
			}
		}
		verdict
	}

	fn on_metadata(&mut self, stats: duet_primitives::DocumentStats, title: Patch<String>) {
		if let Err(reason) = self.pull_guard.admit(&self.state, self.suppression()) {
			trace!(reason = reason.as_str(), "sync.metadata.rejected");
			return;
		}
		if self.last_stats != Some(stats) {
			self.last_stats = Some(stats);
			self.host.on_stats_change(stats);
		}
		let title = match title {
			Patch::Unchanged => return,
			Patch::Cleared => None,
			Patch::Set(title) => Some(title),
		};
		if self.last_section_title != title {
			self.host.on_section_title_change(title.as_deref());
			self.last_section_title = title;
		}
	}

	fn on_save_cursor(&mut self, reply: oneshot::Sender<CursorPosition>) {
		match self.cursor.plan_save(self.gate.is_ready(), self.state.is_cleaned_up) {
			SaveSource::Default => {
				debug!(source = "default", "sync.cursor.saved");
				let _ = reply.send(CursorPosition::START);
			}
			SaveSource::Pending(position) => {
				debug!(line = position.line, column = position.column, source = "pending", "sync.cursor.saved");
				let _ = reply.send(position);
			}
			SaveSource::Live => {
				let surface = Arc::clone(&self.surface);
				self.round_trip(async move {
					let result = surface.get_cursor_position().await;
					Event::CursorRead { result, reply }
				});
			}
		}
	}

	fn on_restore_cursor(&mut self, position: CursorPosition) {
		if self.state.is_cleaned_up {
			return;
		}
		self.cursor.set_pending(position);
		if !self.gate.is_ready() {
			// Carried in the initialize payload instead.
			return;
		}

		let generation = self.gate.generation();
		let surface = Arc::clone(&self.surface);
		let settle = self.config.cursor_settle();
		let recenter = self.config.recenter_after_restore;
		self.round_trip(async move {
			tokio::time::sleep(settle).await;
			let mut result = surface.set_cursor_position(position).await;
			if result.is_ok() && recenter {
				result = surface.scroll_cursor_into_view().await;
			}
			Event::CursorRestored { generation, position, result }
		});
	}

	fn on_update_settings(&mut self, patch: SettingsPatch) {
		if self.state.is_cleaned_up {
			return;
		}
		if !self.settings.apply(patch) || !self.state.is_live() {
			return;
		}
		let Some(theme) = self.settings.theme.clone() else {
			return;
		};
		let surface = Arc::clone(&self.surface);
		debug!(vars = theme.len(), "sync.theme.send");
		self.round_trip(async move {
			let result = surface.set_theme(theme).await;
			Event::ThemeApplied { result }
		});
	}

	fn teardown(&mut self) {
		if self.state.is_cleaned_up {
			return;
		}
		let was_ready = self.gate.is_ready();
		self.state.is_cleaned_up = true;
		self.stop_gate_tasks();
		self.ack.clear();
		debug!(generation = self.gate.generation(), was_ready, "sync.teardown");

		if !was_ready {
			return;
		}
		self.final_read_outstanding = true;
		let surface = Arc::clone(&self.surface);
		let limit = self.config.teardown_cursor_timeout();
		self.round_trip(async move {
			let position = match tokio::time::timeout(limit, surface.get_cursor_position()).await {
				Ok(Ok(position)) => Some(position),
				_ => None,
			};
			Event::FinalCursor(position)
		});
	}

	fn snapshot(&self) -> SyncSnapshot {
		SyncSnapshot {
			generation: self.gate.generation(),
			gate: self.gate.state(),
			is_ready: self.state.is_ready,
			is_cleaned_up: self.state.is_cleaned_up,
			last_pushed_content: self.state.last_pushed_content.clone(),
			pending_cursor_restore: self.cursor.pending(),
			ack_armed: self.ack.is_armed(),
		}
	}
}
