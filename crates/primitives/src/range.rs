/// Direction of a caret or selection boundary motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Toward the end of the buffer.
	Forward,
	/// Toward the start of the buffer.
	Backward,
}

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for inkmark.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A half-open character span `[start, end)`.
///
/// Markers, parts, selections and edit windows are all spans. A span with
/// `start == end` is a caret position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
	/// First character in the span (inclusive).
	pub start: CharIdx,
	/// One past the last character in the span (exclusive).
	pub end: CharIdx,
}

impl Span {
	/// Creates a span from two positions, ordering them if needed.
	pub fn new(a: CharIdx, b: CharIdx) -> Self {
		Self {
			start: a.min(b),
			end: a.max(b),
		}
	}

	/// Creates a zero-width span at the given position.
	pub fn point(pos: CharIdx) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns the length of the span in characters.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	/// Returns true if the span is a caret position.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if the position is within the span (exclusive of end).
	pub fn contains(&self, pos: CharIdx) -> bool {
		pos >= self.start && pos < self.end
	}

	/// Returns true if `other` lies entirely within this span.
	pub fn covers(&self, other: &Span) -> bool {
		self.start <= other.start && other.end <= self.end
	}

	/// Returns the smallest span containing both spans.
	pub fn merge(&self, other: &Span) -> Self {
		Self {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Returns the span moved by a signed character delta.
	pub fn shifted(&self, delta: isize) -> Self {
		Self {
			start: shift(self.start, delta),
			end: shift(self.end, delta),
		}
	}

	/// Clamps both ends to `[0, max_char]`.
	pub fn clamp(&self, max_char: CharIdx) -> Self {
		Self {
			start: self.start.min(max_char),
			end: self.end.min(max_char),
		}
	}
}

impl From<std::ops::Range<CharIdx>> for Span {
	fn from(range: std::ops::Range<CharIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

impl From<Span> for std::ops::Range<CharIdx> {
	fn from(span: Span) -> Self {
		span.start..span.end
	}
}

/// Moves a position by a signed delta, saturating at zero.
#[inline]
pub fn shift(pos: CharIdx, delta: isize) -> CharIdx {
	pos.saturating_add_signed(delta)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_span_basics() {
		let s = Span::new(5, 10);
		assert_eq!(s.start, 5);
		assert_eq!(s.end, 10);
		assert_eq!(s.len(), 5);
		assert!(!s.is_empty());
	}

	#[test]
	fn test_span_orders_endpoints() {
		let s = Span::new(10, 5);
		assert_eq!(s, Span::new(5, 10));
	}

	#[test]
	fn test_span_point() {
		let s = Span::point(5);
		assert!(s.is_empty());
		assert!(!s.contains(5));
	}

	#[test]
	fn test_span_contains() {
		let s = Span::new(5, 10);
		assert!(!s.contains(4));
		assert!(s.contains(5));
		assert!(s.contains(9));
		assert!(!s.contains(10));
	}

	#[test]
	fn test_span_covers_and_merge() {
		let a = Span::new(2, 12);
		assert!(a.covers(&Span::new(2, 12)));
		assert!(a.covers(&Span::new(4, 5)));
		assert!(!a.covers(&Span::new(1, 5)));
		assert_eq!(a.merge(&Span::new(10, 20)), Span::new(2, 20));
	}

	#[test]
	fn test_shift_saturates() {
		assert_eq!(shift(3, -5), 0);
		assert_eq!(shift(3, 4), 7);
		assert_eq!(Span::new(4, 6).shifted(-2), Span::new(2, 4));
	}
}
