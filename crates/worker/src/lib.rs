//! Worker primitives shared by surface coordinators.
//!
//! * [`TaskClass`] tags every spawned task for tracing.
//! * [`spawn`] is the single entrypoint for detached async work.
//! * [`GenerationClock`] and [`GenerationToken`] scope cancellation to one
//!   lifecycle instance so late completions from an older instance can be
//!   recognised and dropped.
//! * [`RepeatingTask`] is a cancellable periodic task whose token is checked
//!   before every tick body runs.

mod class;
mod repeat;
mod spawn;
mod token;

pub use class::TaskClass;
pub use repeat::{RepeatingTask, TickFlow};
pub use spawn::spawn;
pub use token::{GenerationClock, GenerationToken};
