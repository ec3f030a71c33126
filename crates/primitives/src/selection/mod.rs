//! Single-range selections and the motion between two of them.

use crate::range::{CharIdx, Direction, Span};


/// The host's selection: a single half-open range of characters.
///
/// Unlike a multi-cursor editor selection, a marker-aware text field only
/// ever has one range. A zero-width selection is a caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
	/// Start of the selection (inclusive).
	pub start: CharIdx,
	/// End of the selection (exclusive).
	pub end: CharIdx,
}

/// How each end of a selection moved relative to a previous selection.
///
/// `None` means that end did not move (or there was no previous selection).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Motion {
	/// Movement of the start boundary.
	pub start: Option<Direction>,
	/// Movement of the end boundary.
	pub end: Option<Direction>,
}

impl Selection {
	/// Creates a selection, ordering the endpoints if needed.
	pub fn new(start: CharIdx, end: CharIdx) -> Self {
		Self {
			start: start.min(end),
			end: start.max(end),
		}
	}

	/// Creates a caret selection.
	pub fn point(pos: CharIdx) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns true if this selection is a caret.
	#[inline]
	pub fn is_caret(&self) -> bool {
		self.start == self.end
	}

	/// Returns the selected span.
	#[inline]
	pub fn span(&self) -> Span {
		Span {
			start: self.start,
			end: self.end,
		}
	}

	/// Returns the number of selected characters.
	#[inline]
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	/// Returns true if nothing is selected.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.is_caret()
	}

	/// Describes how this selection moved from `prev`.
	///
	/// With no previous selection, no end is considered to have moved.
	pub fn motion_from(&self, prev: Option<&Selection>) -> Motion {
		let Some(prev) = prev else {
			return Motion::default();
		};

		Motion {
			start: direction_between(prev.start, self.start),
			end: direction_between(prev.end, self.end),
		}
	}

	/// Clamps both ends to `[0, max_char]`.
	pub fn clamp(&self, max_char: CharIdx) -> Self {
		Self::new(self.start.min(max_char), self.end.min(max_char))
	}
}

impl Motion {
	/// Returns the direction of the caret or the moved end, preferring the start.
	pub fn primary(&self) -> Option<Direction> {
		self.start.or(self.end)
	}
}

impl From<Span> for Selection {
	fn from(span: Span) -> Self {
		Self {
			start: span.start,
			end: span.end,
		}
	}
}

fn direction_between(from: CharIdx, to: CharIdx) -> Option<Direction> {
	match to.cmp(&from) {
		std::cmp::Ordering::Less => Some(Direction::Backward),
		std::cmp::Ordering::Equal => None,
		std::cmp::Ordering::Greater => Some(Direction::Forward),
	}
}
