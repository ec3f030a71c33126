//! The marker model: typed, span-bound overlays on the buffer.

use std::collections::BTreeMap;
use std::sync::Arc;

use inkmark_primitives::{CharIdx, Rope, Span};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::config::PartConfig;
use crate::error::InvariantError;
use crate::ids::MarkerId;

/// Anything that occupies a span of the buffer.
pub trait Spanned {
	/// The occupied span.
	fn span(&self) -> Span;
}

impl Spanned for Span {
	fn span(&self) -> Span {
		*self
	}
}

/// One parsed segment of a marker body.
///
/// The span includes the part's delimiters when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
	/// Part key from the grammar.
	pub key: String,
	/// Start of the part, including its start delimiter.
	pub start: CharIdx,
	/// End of the part, including its end delimiter.
	pub end: CharIdx,
	/// Start delimiter present in the text.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_char: Option<char>,
	/// End delimiter present in the text.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub end_char: Option<char>,
	/// Whether the part has been resolved to an identity.
	#[serde(default)]
	pub locked: bool,
}

impl Part {
	/// Moves the part by `delta` characters.
	pub fn shift(&mut self, delta: isize) {
		let span = self.span().shifted(delta);
		self.start = span.start;
		self.end = span.end;
	}

	/// Renders the part text wrapped in the given delimiters.
	pub(crate) fn render(text: &str, start_char: Option<char>, end_char: Option<char>) -> String {
		let mut out = String::with_capacity(text.len() + 2);
		out.extend(start_char);
		out.push_str(text);
		out.extend(end_char);
		out
	}
}

impl Spanned for Part {
	fn span(&self) -> Span {
		Span {
			start: self.start,
			end: self.end,
		}
	}
}

/// How far along a marker is toward full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
	/// No part has an identity yet.
	Unresolved,
	/// Parts up to and including this index are locked.
	Partial(usize),
	/// Every part is resolved and the marker is atomic.
	Locked,
}

/// A typed overlay on a span of the buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
	/// Stable identifier.
	pub id: MarkerId,
	/// Anchor character that opened the marker.
	pub anchor: char,
	/// Marker kind from the grammar.
	pub kind: String,
	/// Grammar version the marker was parsed with.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<u32>,
	/// Span start (the anchor character).
	pub start: CharIdx,
	/// Span end, exclusive.
	pub end: CharIdx,
	/// The anchor's part configuration, shared between markers of one kind.
	pub parts_config: Arc<[PartConfig]>,
	/// Parsed parts, in order. Empty once the marker is locked.
	#[serde(default)]
	pub parts: SmallVec<[Part; 2]>,
	/// Part text without delimiters, by key.
	#[serde(default)]
	pub parts_text: BTreeMap<String, String>,
	/// Identities of resolved parts, by key.
	#[serde(default)]
	pub parts_ids: BTreeMap<String, Value>,
	/// Opaque data attached to parts, by key.
	#[serde(default)]
	pub parts_data: BTreeMap<String, Value>,
	/// Index of the last resolved part.
	#[serde(default)]
	pub last_resolved: Option<usize>,
	/// Whether the marker is atomic.
	#[serde(default)]
	pub locked: bool,
}

impl Spanned for Marker {
	fn span(&self) -> Span {
		Span {
			start: self.start,
			end: self.end,
		}
	}
}

impl Marker {
	/// Number of characters covered.
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	/// Returns true for a zero-width marker, which never survives validation.
	pub fn is_empty(&self) -> bool {
		self.start >= self.end
	}

	/// The marker's text in `buffer`.
	pub fn text(&self, buffer: &Rope) -> String {
		let span = self.span().clamp(buffer.len_chars());
		buffer.slice(span.start..span.end).to_string()
	}

	/// Index of `key` in the part configuration.
	pub fn part_index(&self, key: &str) -> Option<usize> {
		self.parts_config.iter().position(|p| p.key == key)
	}

	/// The parsed part with key `key`.
	pub fn part(&self, key: &str) -> Option<&Part> {
		self.parts.iter().find(|p| p.key == key)
	}

	/// Current resolution state.
	pub fn resolution(&self) -> Resolution {
		match (self.locked, self.last_resolved) {
			(true, _) => Resolution::Locked,
			(false, Some(k)) => Resolution::Partial(k),
			(false, None) => Resolution::Unresolved,
		}
	}

	/// Returns true if the marker is atomic.
	pub fn is_locked(&self) -> bool {
		self.locked
	}

	/// Configuration of the next part that may be resolved.
	pub fn next_unresolved(&self) -> Option<&PartConfig> {
		if self.locked {
			return None;
		}
		self.parts_config.get(self.last_resolved.map_or(0, |k| k + 1))
	}

	/// End of the locked part run, for a partially resolved marker.
	pub fn resolved_end(&self) -> Option<CharIdx> {
		if self.locked {
			return None;
		}
		self.last_resolved.and_then(|k| self.parts.get(k)).map(|p| p.end)
	}

	/// Moves the marker and its parts by `delta` characters.
	pub fn shift(&mut self, delta: isize) {
		if delta == 0 {
			return;
		}
		let span = self.span().shifted(delta);
		self.start = span.start;
		self.end = span.end;
		for part in &mut self.parts {
			part.shift(delta);
		}
	}

	/// Returns true if `pos` lies inside the span (end exclusive).
	pub fn contains(&self, pos: CharIdx) -> bool {
		self.span().contains(pos)
	}
}

/// Checks the structural invariants of a marker list against a buffer length.
///
/// Markers must be sorted, non-overlapping and non-empty, lie inside the
/// buffer, and carry parts that are ordered and inside their marker. A
/// locked marker has every part resolved.
pub fn validate_markers(markers: &[Marker], len: usize) -> Result<(), InvariantError> {
	for (index, marker) in markers.iter().enumerate() {
		if marker.start >= marker.end {
			return Err(InvariantError::EmptySpan {
				index,
				start: marker.start,
				end: marker.end,
			});
		}
		if marker.end > len {
			return Err(InvariantError::OutOfBounds {
				index,
				end: marker.end,
				len,
			});
		}
		if let Some(next) = markers.get(index + 1)
			&& next.start < marker.end
		{
			return Err(InvariantError::Overlap { index });
		}

		let mut cursor = marker.start;
		for part in &marker.parts {
			if part.end < part.start || !Span::new(cursor, marker.end).covers(&part.span()) {
				return Err(InvariantError::Parts { index });
			}
			cursor = part.end;
		}

		let fully_resolved = marker.last_resolved == marker.parts_config.len().checked_sub(1);
		if marker.locked != fully_resolved {
			return Err(InvariantError::LockState { index });
		}
		let locked_prefix = marker.parts.iter().take_while(|p| p.locked).count();
		if !marker.locked && marker.last_resolved.map_or(0, |k| k + 1) != locked_prefix {
			return Err(InvariantError::LockState { index });
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn marker(start: usize, end: usize) -> Marker {
		Marker {
			id: MarkerId::from_u128(1),
			anchor: '@',
			kind: "person".into(),
			version: None,
			start,
			end,
			parts_config: vec![PartConfig::new("person").with_end(':')].into(),
			parts: SmallVec::from_vec(vec![Part {
				key: "person".into(),
				start: start + 1,
				end,
				start_char: None,
				end_char: None,
				locked: false,
			}]),
			parts_text: BTreeMap::new(),
			parts_ids: BTreeMap::new(),
			parts_data: BTreeMap::new(),
			last_resolved: None,
			locked: false,
		}
	}

	#[test]
	fn shift_moves_parts() {
		let mut m = marker(3, 8);
		m.shift(2);
		assert_eq!(m.span(), Span::new(5, 10));
		assert_eq!(m.parts[0].span(), Span::new(6, 10));
		m.shift(-5);
		assert_eq!(m.span(), Span::new(0, 5));
	}

	#[test]
	fn text_reads_span() {
		let buffer = Rope::from("hi @john!");
		assert_eq!(marker(3, 8).text(&buffer), "@john");
	}

	#[test]
	fn resolution_states() {
		let mut m = marker(0, 5);
		assert_eq!(m.resolution(), Resolution::Unresolved);
		assert_eq!(m.next_unresolved().map(|p| p.key.as_str()), Some("person"));
		m.last_resolved = Some(0);
		m.locked = true;
		assert_eq!(m.resolution(), Resolution::Locked);
		assert_eq!(m.next_unresolved(), None);
		assert_eq!(m.resolved_end(), None);
	}

	#[test]
	fn render_wraps_delimiters() {
		assert_eq!(Part::render("x", Some('['), Some(']')), "[x]");
		assert_eq!(Part::render("x", None, Some(':')), "x:");
		assert_eq!(Part::render("", None, None), "");
	}

	#[test]
	fn validate_accepts_sorted_markers() {
		assert_eq!(validate_markers(&[marker(0, 3), marker(3, 6)], 6), Ok(()));
	}

	#[test]
	fn validate_checks_parts_stay_inside_marker() {
		let mut m = marker(0, 5);
		m.parts[0].end = 6;
		assert_eq!(validate_markers(&[m], 6), Err(InvariantError::Parts { index: 0 }));

		let mut m = marker(0, 5);
		m.parts.push(Part {
			key: "tail".into(),
			start: 5,
			end: 5,
			start_char: None,
			end_char: None,
			locked: false,
		});
		assert_eq!(validate_markers(&[m], 5), Ok(()));
	}

	#[test]
	fn validate_rejects_broken_lists() {
		assert_eq!(
			validate_markers(&[marker(0, 4), marker(3, 6)], 6),
			Err(InvariantError::Overlap { index: 0 })
		);
		assert_eq!(
			validate_markers(&[marker(0, 7)], 6),
			Err(InvariantError::OutOfBounds {
				index: 0,
				end: 7,
				len: 6
			})
		);
		let mut locked = marker(0, 3);
		locked.locked = true;
		assert_eq!(validate_markers(&[locked], 3), Err(InvariantError::LockState { index: 0 }));
	}
}
