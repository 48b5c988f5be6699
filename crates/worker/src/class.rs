/// Execution classes used for spawned surface work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Coordination context loops. One per open surface.
	Context,
	/// A single surface round trip (initialize, push, pull, cursor get/set).
	RoundTrip,
	/// Periodic timers such as the poll loop or readiness probing.
	Timer,
	/// Fire-and-forget work whose outcome nobody waits on.
	Background,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Context => "context",
			Self::RoundTrip => "round_trip",
			Self::Timer => "timer",
			Self::Background => "background",
		}
	}
}
