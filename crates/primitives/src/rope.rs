//! Rope utilities and extensions.

use ropey::RopeSlice;

use crate::range::CharIdx;

/// Characters that separate words and terminate markers.
pub const SEPARATORS: [char; 6] = [' ', '\t', '\u{b}', '\0', '\r', '\n'];

/// Returns true if `c` separates words (spaces, tabs, NUL and newlines).
#[inline]
pub fn is_separator(c: char) -> bool {
	SEPARATORS.contains(&c)
}

/// Returns true if the character before `pos` is a separator, or `pos` is 0.
pub fn at_word_start(text: RopeSlice, pos: CharIdx) -> bool {
	pos == 0 || text.get_char(pos - 1).is_some_and(is_separator)
}

/// Scans forward from `from` to the first separator, stopping at `limit`.
///
/// Returns the position of that separator (or `limit`).
pub fn word_end(text: RopeSlice, from: CharIdx, limit: CharIdx) -> CharIdx {
	let limit = limit.min(text.len_chars());
	if from >= limit {
		return from;
	}
	from + text.slice(from..limit).chars().take_while(|&c| !is_separator(c)).count()
}
