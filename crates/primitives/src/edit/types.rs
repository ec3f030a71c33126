use crate::range::CharLen;

/// Bias determines how positions at an edit boundary are mapped.
///
/// When mapping a position through an edit, bias determines whether the position
/// moves with an insertion or stays before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// The key (if any) that produced an edit.
///
/// Deletion keys get special treatment next to locked spans: instead of eating
/// into them, the caller is asked to select the span first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditKey {
	/// Delete backward from the caret.
	Backspace,
	/// Delete forward from the caret.
	Delete,
	/// Typing, paste, cut, or anything else.
	#[default]
	Other,
}

/// Inserted text with cached character length.
///
/// Storing the character count avoids repeated O(n) `.chars().count()` calls
/// while offsets are being shifted.
///
/// Fields are private to enforce the invariant that `char_len` always equals
/// `text.chars().count()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insertion {
	text: String,
	char_len: CharLen,
}

impl Insertion {
	/// Creates a new insertion, computing the character length once.
	#[inline]
	pub fn new(text: impl Into<String>) -> Self {
		let text = text.into();
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	/// Returns true if this insertion is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.char_len == 0
	}

	/// Returns the inserted text.
	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the cached character length.
	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}
}

impl From<&str> for Insertion {
	fn from(text: &str) -> Self {
		Self::new(text)
	}
}

impl From<String> for Insertion {
	fn from(text: String) -> Self {
		Self::new(text)
	}
}
