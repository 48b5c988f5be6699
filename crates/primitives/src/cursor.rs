use serde::{Deserialize, Serialize};

/// Zero-based cursor location inside a surface's source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorPosition {
	pub line: u32,
	pub column: u32,
}

impl CursorPosition {
	/// Start of the document, used whenever a live position cannot be obtained.
	pub const START: Self = Self { line: 0, column: 0 };

	pub const fn new(line: u32, column: u32) -> Self {
		Self { line, column }
	}

	pub const fn is_start(self) -> bool {
		self.line == 0 && self.column == 0
	}
}
