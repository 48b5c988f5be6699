//! Basic data shared by the native document model and its render surfaces.
//!
//! Nothing in here talks to a surface. These are the values that cross the
//! boundary: cursor positions, document statistics, the caller-owned
//! [`ContentState`], theme variables and the three-state [`Patch`] used for
//! settings updates.

mod content;
mod cursor;
mod mode;
mod patch;
mod theme;

pub use content::{ContentState, DocumentStats, PollData};
pub use cursor::CursorPosition;
pub use mode::EditorMode;
pub use patch::Patch;
pub use theme::ThemeVars;
