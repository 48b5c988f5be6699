/// Update instruction for one optional field.
///
/// Distinguishes "leave as is" from "clear" without nesting options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
	#[default]
	Unchanged,
	Cleared,
	Set(T),
}

impl<T> Patch<T> {
	/// Applies this patch to `slot`. Returns true when the slot was touched.
	pub fn apply_to(self, slot: &mut Option<T>) -> bool {
		match self {
			Self::Unchanged => false,
			Self::Cleared => {
				*slot = None;
				true
			}
			Self::Set(value) => {
				*slot = Some(value);
				true
			}
		}
	}

	pub const fn is_unchanged(&self) -> bool {
		matches!(self, Self::Unchanged)
	}
}

impl<T> From<Option<T>> for Patch<T> {
	/// `Some` sets, `None` clears. Use [`Patch::Unchanged`] explicitly to skip.
	fn from(value: Option<T>) -> Self {
		match value {
			Some(v) => Self::Set(v),
			None => Self::Cleared,
		}
	}
}
