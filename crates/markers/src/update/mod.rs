//! Incremental marker maintenance.
//!
//! Applies one edit to the buffer and brings the marker list up to date
//! without re-parsing the whole document. Markers before the edit are kept,
//! markers after it are shifted, markers the edit swallows are dropped, and
//! only the marker being typed into (or the newly typed text) is re-parsed.

use inkmark_primitives::rope::word_end;
use inkmark_primitives::{CharIdx, Edit, Rope, Span, at_word_start};
use tracing::{debug, trace};

use crate::classify::{Classification, Classifier, SortedScan};
use crate::constraint::{locked_marker_snap, locked_part_snap};
use crate::ids::IdGenerator;
use crate::marker::{Marker, Spanned};
use crate::parser::MarkerParser;


/// Buffer and markers after an edit.
#[derive(Debug, Clone)]
pub struct EditResult {
	/// The edited buffer.
	pub buffer: Rope,
	/// The updated marker list.
	pub markers: Vec<Marker>,
	/// Caret position after the inserted text.
	pub caret: CharIdx,
	/// The edit actually applied, after any protective redirect.
	pub applied: Edit,
	/// Whether `applied` differs from the requested edit.
	pub redirected: bool,
	/// The unlocked marker the caret is editing.
	pub in_edit: Option<usize>,
}

/// Applies edits and keeps markers consistent with the buffer.
#[derive(Debug, Clone)]
pub struct UpdateEngine<C = SortedScan> {
	parser: MarkerParser,
	classifier: C,
}

impl<C: Classifier> UpdateEngine<C> {
	/// Creates an engine.
	pub fn new(parser: MarkerParser, classifier: C) -> Self {
		Self { parser, classifier }
	}

	/// The parser used for re-parsing.
	pub fn parser(&self) -> &MarkerParser {
		&self.parser
	}

	/// The range classifier.
	pub fn classifier(&self) -> &C {
		&self.classifier
	}

	/// Applies `edit` to `buffer` and returns the updated state.
	///
	/// The edit never corrupts locked text: a range cutting into a locked
	/// marker is widened to delete the marker whole, typing inside one lands
	/// after it, and an edit reaching into a locked part run is moved to the
	/// end of that run.
	pub fn apply(&self, buffer: &Rope, markers: &[Marker], edit: &Edit, ids: &mut dyn IdGenerator) -> EditResult {
		let requested = edit.with_span(edit.span.clamp(buffer.len_chars()));
		let (edit, cls) = self.protect(markers, requested.clone());

		let delta = edit.len_delta();
		let mut next = buffer.clone();
		edit.apply(&mut next);

		let Span { start, end } = edit.span;
		let typed_end = start + edit.inserted_len();
		let owner = cls.in_edit().filter(|&i| !markers[i].locked);
		let affected = cls.intersecting();
		let keep = owner.map_or(affected.start, |i| i.min(affected.start));

		let dropped = affected.len() - usize::from(owner.is_some_and(|i| affected.contains(&i)));
		if dropped > 0 {
			debug!(dropped, ?edit.span, "update.drop_markers");
		}

		let mut out: Vec<Marker> = markers[..keep].to_vec();
		let suffix = markers[affected.end..].iter().cloned().map(|mut m| {
			m.shift(delta);
			m
		});
		let suffix: Vec<Marker> = suffix.collect();
		let limit = suffix.first().map_or(next.len_chars(), |m| m.start);

		match owner {
			Some(i) => {
				let old = &markers[i];
				let owner_end = if old.end > end {
					inkmark_primitives::range::shift(old.end, delta)
				} else {
					typed_end
				};
				let window_end = word_end(next.slice(..), owner_end, limit).max(owner_end);
				trace!(id = ?old.id, window_start = old.start, window_end, "update.reparse_owner");
				for parsed in self.parser.parse(next.slice(old.start..window_end), old.start, ids) {
					if parsed.start == old.start {
						out.push(merge_owner(old, parsed, buffer, &next));
					} else {
						out.push(parsed);
					}
				}
			}
			None => {
				let at_boundary = at_word_start(next.slice(..), start) || out.last().is_some_and(|m| m.end == start);
				let window_end = word_end(next.slice(..), typed_end, limit).max(typed_end);
				if window_end > start {
					trace!(window_start = start, window_end, at_boundary, "update.parse_window");
					out.extend(self.parser.parse_with_boundary(next.slice(start..window_end), start, at_boundary, ids));
				}
			}
		}
		out.extend(suffix);

		let caret = edit.caret_after();
		let in_edit = self
			.classifier
			.classify(&out, Span::point(caret))
			.in_edit()
			.filter(|&i| !out[i].locked);

		EditResult {
			buffer: next,
			markers: out,
			caret,
			redirected: edit != requested,
			applied: edit,
			in_edit,
		}
	}

	/// Moves or widens `edit` until it no longer cuts into locked text.
	fn protect(&self, markers: &[Marker], mut edit: Edit) -> (Edit, Classification) {
		loop {
			let cls = self.classifier.classify(markers, edit.span);

			if edit.span.is_empty()
				&& let Some(i) = cls.mid_selected()
				&& markers[i].locked
			{
				trace!(id = ?markers[i].id, "update.skip_locked");
				edit = edit.with_span(Span::point(markers[i].end));
				continue;
			}

			if let Some(span) = locked_marker_snap(markers, &cls) {
				debug!(from = ?edit.span, to = ?span, "update.widen_locked");
				edit = edit.with_span(span);
				continue;
			}

			if let Some(i) = cls.in_edit()
				&& let Some(span) = locked_part_snap(&self.classifier, &markers[i], edit.span)
				&& span != edit.span
			{
				debug!(id = ?markers[i].id, from = ?edit.span, to = ?span, "update.redirect_locked_parts");
				edit = edit.with_span(span);
				continue;
			}

			return (edit, cls);
		}
	}
}

/// Carries identity and the unchanged locked part prefix from `old` onto its
/// re-parsed replacement.
fn merge_owner(old: &Marker, mut parsed: Marker, prev: &Rope, next: &Rope) -> Marker {
	parsed.id = old.id;

	let mut last_resolved = None;
	for (i, part) in parsed.parts.iter_mut().enumerate() {
		let Some(old_part) = old.parts.get(i).filter(|p| p.locked) else {
			break;
		};
		let span = part.span();
		let unchanged = old_part.key == part.key
			&& !span.is_empty()
			&& prev.slice(old_part.start..old_part.end) == next.slice(span.start..span.end);
		if !unchanged {
			debug!(id = ?old.id, key = %part.key, "update.unlock_part");
			break;
		}

		part.locked = true;
		last_resolved = Some(i);
		if let Some(id) = old.parts_ids.get(&part.key) {
			parsed.parts_ids.insert(part.key.clone(), id.clone());
		}
		if let Some(data) = old.parts_data.get(&part.key) {
			parsed.parts_data.insert(part.key.clone(), data.clone());
		}
	}
	parsed.last_resolved = last_resolved;
	parsed
}
