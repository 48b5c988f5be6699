//! Delivery channels feeding the pull path.
//!
//! Two producers reach the same acceptance logic:
//!
//! * a poll loop owned by the coordination context, fetching full content
//!   under [`Delivery::Poll`] or only metadata under [`Delivery::Notify`];
//! * a [`NotificationSink`] the surface bridge uses to hand over
//!   asynchronous messages, redelivered onto the coordination context.
//!
//! Acceptance is content-equality based, so overlapping or re-delivered
//! reports are harmless.

use std::sync::Arc;
use std::time::Duration;

use duet_primitives::{DocumentStats, PollData};
use duet_worker::{GenerationToken, RepeatingTask, TickFlow};
use tokio::sync::mpsc;

use crate::config::Delivery;
use crate::coordinator::{Command, Event};
use crate::error::{Result, SyncError};
use crate::surface::{RenderSurface, SurfaceError, SurfaceNotification};

/// What a poll tick asks the surface for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPayload {
	/// Full content plus stats.
	FullContent,
	/// Stats and section title only.
	Metadata,
}

impl PollPayload {
	pub const fn for_delivery(delivery: Delivery) -> Self {
		match delivery {
			Delivery::Poll => Self::FullContent,
			Delivery::Notify => Self::Metadata,
		}
	}
}

/// Result of one poll round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	Content { content: String, stats: Option<DocumentStats> },
	Metadata(PollData),
	/// The tick's update is dropped; prior state is kept.
	Dropped(SurfaceError),
}

pub(crate) async fn poll_once(surface: Arc<dyn RenderSurface>, payload: PollPayload) -> PollOutcome {
	match payload {
		PollPayload::FullContent => {
			let content = match surface.get_content().await {
				Ok(content) => content,
				Err(err) => return PollOutcome::Dropped(err),
			};
			let stats = match surface.get_stats().await {
				Ok(stats) => Some(stats),
				Err(err) => {
					tracing::debug!(error = %err, "sync.poll.stats_dropped");
					None
				}
			};
			PollOutcome::Content { content, stats }
		}
		PollPayload::Metadata => match surface.get_poll_data().await {
			Ok(data) => PollOutcome::Metadata(data),
			Err(err) => PollOutcome::Dropped(err),
		},
	}
}

/// Starts the poll timer. Each tick only enqueues [`Event::PollTick`]; the
/// round trip itself is issued by the context so a slow tick never blocks the timer.
pub(crate) fn start_poll_loop(period: Duration, token: GenerationToken, events: mpsc::UnboundedSender<Event>) -> RepeatingTask {
	RepeatingTask::start("sync.poll", period, token, move || {
		if events.send(Event::PollTick).is_ok() { TickFlow::Continue } else { TickFlow::Stop }
	})
}

/// Ingress for messages the surface sends on its own.
///
/// Cloneable and usable from any thread; every message is redelivered onto
/// the coordination context before it touches shared state.
///
/// A sink does not keep its coordinator alive: once every [`SyncHandle`]
/// is dropped the coordinator tears down and deliveries fail with
/// [`SyncError::CoordinatorClosed`].
///
/// [`SyncHandle`]: crate::SyncHandle
#[derive(Debug, Clone)]
pub struct NotificationSink {
	commands: mpsc::WeakUnboundedSender<Command>,
}

impl NotificationSink {
	pub(crate) fn new(commands: &mpsc::UnboundedSender<Command>) -> Self {
		Self {
			commands: commands.downgrade(),
		}
	}

	pub fn deliver(&self, notification: SurfaceNotification) -> Result<()> {
		tracing::trace!(kind = notification.kind(), "sync.notify.inbound");
		let commands = self.commands.upgrade().ok_or(SyncError::CoordinatorClosed)?;
		commands.send(Command::Notify(notification)).map_err(|_| SyncError::CoordinatorClosed)
	}

	/// Decodes and delivers one raw JSON message from the surface.
	pub fn deliver_json(&self, raw: &str) -> Result<()> {
		let notification = SurfaceNotification::from_json(raw)?;
		self.deliver(notification)
	}
}
