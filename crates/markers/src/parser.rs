//! Marker parser.
//!
//! Scans a fragment of text for anchors at word starts and consumes each
//! marker's parts using the compiled terminator tables. Parsing is pure apart
//! from drawing fresh identifiers.

use std::collections::BTreeMap;
use std::sync::Arc;

use inkmark_primitives::{CharIdx, RopeSlice, is_separator};
use smallvec::SmallVec;
use tracing::trace;

use crate::grammar::{CompiledAnchor, Grammar, Termination};
use crate::ids::IdGenerator;
use crate::marker::{Marker, Part};

/// Parses marker text according to a [`Grammar`].
#[derive(Debug, Clone)]
pub struct MarkerParser {
	grammar: Arc<Grammar>,
}

impl MarkerParser {
	/// Creates a parser for `grammar`.
	pub fn new(grammar: Arc<Grammar>) -> Self {
		Self { grammar }
	}

	/// The grammar this parser follows.
	pub fn grammar(&self) -> &Arc<Grammar> {
		&self.grammar
	}

	/// Parses `text`, whose first character sits at buffer position `offset`.
	///
	/// The start of the fragment counts as a word boundary.
	pub fn parse<'a>(&self, text: impl Into<RopeSlice<'a>>, offset: CharIdx, ids: &mut dyn IdGenerator) -> Vec<Marker> {
		self.parse_with_boundary(text, offset, true, ids)
	}

	/// Like [`parse`](Self::parse), but an anchor at the very start of the
	/// fragment is only recognized when `start_is_boundary` is set.
	pub fn parse_with_boundary<'a>(
		&self,
		text: impl Into<RopeSlice<'a>>,
		offset: CharIdx,
		start_is_boundary: bool,
		ids: &mut dyn IdGenerator,
	) -> Vec<Marker> {
		let chars: Vec<char> = text.into().chars().collect();
		let mut markers = Vec::new();
		let mut i = 0;

		while i < chars.len() {
			let at_boundary = if i == 0 { start_is_boundary } else { is_separator(chars[i - 1]) };
			let anchor = at_boundary.then(|| self.grammar.anchor(chars[i])).flatten();
			let Some(anchor) = anchor else {
				i += 1;
				continue;
			};

			let (marker, next) = self.scan_marker(anchor, &chars, i, offset, ids);
			trace!(
				kind = %marker.kind,
				start = marker.start,
				end = marker.end,
				"parser.marker"
			);
			markers.push(marker);
			debug_assert!(next > i);
			i = next;
		}

		markers
	}

	/// Consumes one marker starting at the anchor at `start`.
	///
	/// Returns the marker and the index just past it.
	fn scan_marker(
		&self,
		anchor: &CompiledAnchor,
		chars: &[char],
		start: usize,
		offset: CharIdx,
		ids: &mut dyn IdGenerator,
	) -> (Marker, usize) {
		let mut parts = SmallVec::<[Part; 2]>::new();
		let mut parts_text = BTreeMap::new();
		let mut i = start + 1;

		for part in anchor.parts() {
			let config = part.config();
			let part_start = i;

			let mut start_char = None;
			if let Some(open) = config.start_char {
				if chars.get(i) != Some(&open) {
					break;
				}
				start_char = Some(open);
				i += 1;
			}

			let text_start = i;
			while i < chars.len() && part.termination(chars[i]).is_none() {
				i += 1;
			}
			let text: String = chars[text_start..i].iter().collect();

			let termination = chars.get(i).and_then(|&c| part.termination(c));
			let mut end_char = None;
			if termination == Some(Termination::EndOfPart) {
				end_char = Some(chars[i]);
				i += 1;
			}

			parts_text.insert(config.key.clone(), text);
			parts.push(Part {
				key: config.key.clone(),
				start: offset + part_start,
				end: offset + i,
				start_char,
				end_char,
				locked: false,
			});

			// After a consumed end delimiter the next part is scanned even when
			// text or the marker ends right there, leaving it empty.
			if matches!(termination, None | Some(Termination::EndOfMarker)) {
				break;
			}
		}

		let marker = Marker {
			id: ids.next(),
			anchor: anchor.anchor(),
			kind: anchor.kind().to_owned(),
			version: self.grammar.version(),
			start: offset + start,
			end: offset + i,
			parts_config: Arc::clone(anchor.parts_config()),
			parts,
			parts_text,
			parts_ids: BTreeMap::new(),
			parts_data: BTreeMap::new(),
			last_resolved: None,
			locked: false,
		};
		(marker, i)
	}
}
