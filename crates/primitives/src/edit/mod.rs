//! Single range-replace edits.
//!
//! A marker-aware text field only ever sees one contiguous change per input
//! event: the selection (possibly empty) is replaced by some text (possibly
//! empty). [`Edit`] models exactly that, and knows how to apply itself to a
//! [`Rope`], map positions through itself, and reconstruct itself from the
//! before/after buffers a host reports.

mod types;

#[cfg(test)]
mod tests;

pub use types::{Bias, EditKey, Insertion};

use crate::range::{CharIdx, CharLen, Span};
use crate::{Rope, RopeSlice};

/// Replacement of the characters in `span` with `insertion`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edit {
	/// The replaced range in the buffer before the edit.
	pub span: Span,
	/// The text written in place of `span`.
	pub insertion: Insertion,
}

impl Edit {
	/// Creates an edit replacing `span` with `text`.
	pub fn replace(span: impl Into<Span>, text: impl Into<Insertion>) -> Self {
		Self {
			span: span.into(),
			insertion: text.into(),
		}
	}

	/// Creates an insertion at `pos`.
	pub fn insert(pos: CharIdx, text: impl Into<Insertion>) -> Self {
		Self::replace(Span::point(pos), text)
	}

	/// Creates a deletion of `span`.
	pub fn delete(span: impl Into<Span>) -> Self {
		Self::replace(span, Insertion::default())
	}

	/// Returns the first replaced character.
	#[inline]
	pub fn start(&self) -> CharIdx {
		self.span.start
	}

	/// Returns one past the last replaced character.
	#[inline]
	pub fn end(&self) -> CharIdx {
		self.span.end
	}

	/// Returns the inserted text.
	#[inline]
	pub fn text(&self) -> &str {
		self.insertion.text()
	}

	/// Returns the inserted length in characters.
	#[inline]
	pub fn inserted_len(&self) -> CharLen {
		self.insertion.char_len()
	}

	/// Returns the signed change in buffer length.
	pub fn len_delta(&self) -> isize {
		self.inserted_len() as isize - self.span.len() as isize
	}

	/// Returns true if applying this edit changes nothing.
	pub fn is_identity(&self) -> bool {
		self.span.is_empty() && self.insertion.is_empty()
	}

	/// Returns the caret position right after the inserted text.
	pub fn caret_after(&self) -> CharIdx {
		self.span.start + self.inserted_len()
	}

	/// Returns the same insertion re-targeted at another span.
	pub fn with_span(&self, span: Span) -> Self {
		Self {
			span,
			insertion: self.insertion.clone(),
		}
	}

	/// Applies this edit to a document, modifying it in place.
	///
	/// The span is clamped to the document length.
	pub fn apply(&self, doc: &mut Rope) {
		let len = doc.len_chars();
		let span = self.span.clamp(len);
		debug_assert_eq!(span, self.span, "edit span out of document bounds");

		if !span.is_empty() {
			doc.remove(span.start..span.end);
		}
		if !self.insertion.is_empty() {
			doc.insert(span.start, self.insertion.text());
		}
	}

	/// Maps a position through this edit using the specified bias.
	///
	/// Positions inside the replaced span collapse onto the edit start (or the
	/// end of the insertion with [`Bias::Right`]).
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		if pos < self.span.start {
			pos
		} else if pos > self.span.end || (pos == self.span.end && !self.span.is_empty()) {
			crate::range::shift(pos, self.len_delta())
		} else {
			match bias {
				Bias::Left => self.span.start,
				Bias::Right => self.caret_after(),
			}
		}
	}

	/// Reconstructs the edit that turned `prev` into `next`.
	///
	/// `caret` is the host's caret in `next`, which sits right after whatever
	/// was typed or pasted. The replaced range is the common prefix (bounded by
	/// the caret) up to the position in `prev` that lines up with the caret.
	/// When the caret does not line up with the change (programmatic edits),
	/// the common prefix and suffix of the two buffers are used instead.
	///
	/// Returns `None` if the buffers are identical.
	pub fn infer(prev: RopeSlice, next: RopeSlice, caret: CharIdx) -> Option<Self> {
		if prev == next {
			return None;
		}

		let prev_len = prev.len_chars();
		let next_len = next.len_chars();

		let from_caret = (caret <= next_len)
			.then(|| next_len - caret)
			.and_then(|tail| prev_len.checked_sub(tail))
			.filter(|&prev_end| prev.slice(prev_end..) == next.slice(caret..))
			.map(|prev_end| {
				let start = common_prefix(prev, next, prev_end.min(caret));
				Self::replace(Span::new(start, prev_end), next.slice(start..caret).to_string())
			});

		from_caret.or_else(|| {
			let start = common_prefix(prev, next, prev_len.min(next_len));
			let max_suffix = (prev_len - start).min(next_len - start);
			let suffix = common_suffix(prev, next, max_suffix);
			Some(Self::replace(
				Span::new(start, prev_len - suffix),
				next.slice(start..next_len - suffix).to_string(),
			))
		})
	}
}

/// Length of the common prefix of two slices, capped at `limit`.
fn common_prefix(a: RopeSlice, b: RopeSlice, limit: CharLen) -> CharLen {
	a.chars().zip(b.chars()).take(limit).take_while(|(x, y)| x == y).count()
}

/// Length of the common suffix of two slices, capped at `limit`.
fn common_suffix(a: RopeSlice, b: RopeSlice, limit: CharLen) -> CharLen {
	a.chars_at(a.len_chars())
		.reversed()
		.zip(b.chars_at(b.len_chars()).reversed())
		.take(limit)
		.take_while(|(x, y)| x == y)
		.count()
}
