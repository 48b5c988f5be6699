/// The two interchangeable editing surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorMode {
	/// Plain markdown source.
	Source,
	/// Richly rendered editing.
	Rich,
}

impl EditorMode {
	pub const fn other(self) -> Self {
		match self {
			Self::Source => Self::Rich,
			Self::Rich => Self::Source,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Source => "source",
			Self::Rich => "rich",
		}
	}
}
