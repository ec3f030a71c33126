//! Machine-checkable invariant proofs for marker maintenance.
//!
//! Each invariant is expressed as a `pub(crate) fn test_*()` that is both a
//! runnable test and an intra-doc link target for the crate-level docs.

use inkmark_primitives::{EditKey, Selection, Span};
use serde_json::json;

use crate::fixtures::{grammar, ids, parser};
use crate::ids::MarkerId;
use crate::marker::{Spanned, validate_markers};
use crate::resolve::PartUpdate;
use crate::seed::MarkerSeed;
use crate::session::Session;

fn locked_seed(start: usize, end: usize) -> MarkerSeed {
	MarkerSeed {
		id: Some(MarkerId::from_u128(1)),
		kind: Some("person".into()),
		start,
		end,
		parts_ids: [("name".to_owned(), json!(1))].into(),
		..MarkerSeed::default()
	}
}

/// Invariant: Markers MUST stay sorted and non-overlapping after every edit.
#[cfg_attr(test, test)]
pub(crate) fn test_markers_never_overlap() {
	let mut session = Session::new(grammar()).with_ids(ids());
	for c in "@a@b #c!d:e".chars() {
		session.insert(&c.to_string());
		assert_eq!(validate_markers(session.markers(), session.buffer().len_chars()), Ok(()));
	}

	// Joining two markers by deleting the space between them.
	session.select(Selection::point(5));
	session.backspace();
	assert_eq!(validate_markers(session.markers(), session.buffer().len_chars()), Ok(()));
}

/// Invariant: The text of a locked marker MUST NOT change except by deleting it
/// whole.
#[cfg_attr(test, test)]
pub(crate) fn test_locked_text_is_protected() {
	let mut session = Session::hydrate(grammar(), "a Ann b", [locked_seed(2, 5)]);

	for (start, end) in [(3, 3), (1, 3), (4, 6), (3, 4)] {
		session.select(Selection::new(start, end));
		session.insert("x");
		let text = session.text();
		match session.markers().first() {
			Some(m) => assert_eq!(m.text(session.buffer()), "Ann", "edit {start}..{end} gave {text:?}"),
			None => assert!(!text.contains("An") && !text.contains("nn"), "partial marker text left in {text:?}"),
		}
	}
}

/// Invariant: A marker's resolved part count MUST NOT decrease while it exists.
#[cfg_attr(test, test)]
pub(crate) fn test_resolution_is_monotonic() {
	let mut session = Session::new(grammar()).with_ids(ids());
	for c in "!type:it".chars() {
		session.insert(&c.to_string());
	}
	let id = session.markers()[0].id;
	session.resolve_part(id, "type", PartUpdate::resolve("t")).unwrap();

	for at in 0..=8 {
		session.select(Selection::point(at));
		session.insert("z");
		session.key_down(EditKey::Backspace);
		session.backspace();
		if let Some(m) = session.marker(id) {
			assert_eq!(m.last_resolved, Some(0), "caret {at} unlocked a part");
		}
	}
}

/// Invariant: Parsing the text of a parsed marker MUST reproduce the marker.
#[cfg_attr(test, test)]
pub(crate) fn test_parse_is_idempotent() {
	let text = "hi @jo, #x: and !a:b:c";
	let markers = parser().parse(text, 0, &mut ids());
	assert!(!markers.is_empty());
	for m in &markers {
		let again = parser().parse(&text[m.start..m.end], m.start, &mut ids());
		assert_eq!(again.len(), 1);
		assert_eq!(again[0].span(), m.span());
		assert_eq!(again[0].parts, m.parts);
	}
}

/// Invariant: Markers after an edit MUST shift by exactly the edit's length
/// delta.
#[cfg_attr(test, test)]
pub(crate) fn test_offsets_are_conserved() {
	let bo = MarkerSeed {
		kind: Some("person".into()),
		start: 6,
		end: 9,
		..MarkerSeed::default()
	};
	let mut session = Session::hydrate(grammar(), "x Ann @bo", [locked_seed(2, 5), bo]);
	let before: Vec<Span> = session.markers().iter().map(Spanned::span).collect();
	assert_eq!(before.len(), 2);

	session.select(Selection::new(0, 1));
	session.insert("long");
	let after: Vec<Span> = session.markers().iter().map(Spanned::span).collect();
	assert_eq!(after, before.iter().map(|s| s.shifted(3)).collect::<Vec<_>>());
}
