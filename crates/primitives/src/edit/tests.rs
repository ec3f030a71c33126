use proptest::prelude::*;

use super::*;

#[test]
fn test_edit_insert() {
	let mut doc = Rope::from("hello world");
	let edit = Edit::insert(5, ",");
	edit.apply(&mut doc);
	assert_eq!(doc.to_string(), "hello, world");
	assert_eq!(edit.len_delta(), 1);
	assert_eq!(edit.caret_after(), 6);
}

#[test]
fn test_edit_delete() {
	let mut doc = Rope::from("hello world");
	let edit = Edit::delete(5..6);
	edit.apply(&mut doc);
	assert_eq!(doc.to_string(), "helloworld");
	assert_eq!(edit.len_delta(), -1);
}

#[test]
fn test_edit_replace_multibyte() {
	let mut doc = Rope::from("héllo wörld");
	let edit = Edit::replace(6..11, "мир");
	edit.apply(&mut doc);
	assert_eq!(doc.to_string(), "héllo мир");
	assert_eq!(edit.inserted_len(), 3);
	assert_eq!(edit.len_delta(), -2);
}

#[test]
fn test_identity() {
	assert!(Edit::insert(3, "").is_identity());
	assert!(!Edit::insert(3, "x").is_identity());
	assert!(!Edit::delete(2..3).is_identity());
}

#[test]
fn test_map_pos() {
	let edit = Edit::replace(4..6, "abc");
	assert_eq!(edit.map_pos(2, Bias::Left), 2);
	assert_eq!(edit.map_pos(5, Bias::Left), 4);
	assert_eq!(edit.map_pos(5, Bias::Right), 7);
	assert_eq!(edit.map_pos(6, Bias::Left), 7);
	assert_eq!(edit.map_pos(9, Bias::Left), 10);

	let insert = Edit::insert(4, "xy");
	assert_eq!(insert.map_pos(4, Bias::Left), 4);
	assert_eq!(insert.map_pos(4, Bias::Right), 6);
}

#[test]
fn test_infer_typed_char() {
	let prev = Rope::from("hi @jo");
	let next = Rope::from("hi @joh");
	let edit = Edit::infer(prev.slice(..), next.slice(..), 7).unwrap();
	assert_eq!(edit, Edit::insert(6, "h"));
}

#[test]
fn test_infer_repeated_char_uses_caret() {
	// Typing a second "l" after "hel" is ambiguous without the caret.
	let prev = Rope::from("helo");
	let next = Rope::from("hello");
	let edit = Edit::infer(prev.slice(..), next.slice(..), 3).unwrap();
	assert_eq!(edit, Edit::insert(2, "l"));

	let edit = Edit::infer(prev.slice(..), next.slice(..), 4).unwrap();
	assert_eq!(edit, Edit::insert(3, "l"));
}

#[test]
fn test_infer_backspace() {
	let prev = Rope::from("abcd");
	let next = Rope::from("abd");
	let edit = Edit::infer(prev.slice(..), next.slice(..), 2).unwrap();
	assert_eq!(edit, Edit::delete(2..3));
}

#[test]
fn test_infer_paste_over_selection() {
	let prev = Rope::from("one two three");
	let next = Rope::from("one 2 three");
	let edit = Edit::infer(prev.slice(..), next.slice(..), 5).unwrap();
	assert_eq!(edit, Edit::replace(4..7, "2"));
}

#[test]
fn test_infer_identical() {
	let doc = Rope::from("same");
	assert_eq!(Edit::infer(doc.slice(..), doc.slice(..), 2), None);
}

#[test]
fn test_infer_caret_mismatch_falls_back_to_diff() {
	let prev = Rope::from("abcdef");
	let next = Rope::from("abXYef");
	let edit = Edit::infer(prev.slice(..), next.slice(..), 0).unwrap();
	assert_eq!(edit, Edit::replace(2..4, "XY"));
}

/// Generates a random document.
fn arb_document() -> impl Strategy<Value = String> {
	"[a-c @\n]{0,40}"
}

/// Generates a document together with a valid edit on it.
fn arb_doc_and_edit() -> impl Strategy<Value = (String, Edit)> {
	arb_document().prop_flat_map(|doc| {
		let len = doc.chars().count();
		(Just(doc), 0..=len)
			.prop_flat_map(move |(doc, start)| (Just(doc), Just(start), start..=len, "[a-c @]{0,6}"))
			.prop_map(|(doc, start, end, text)| (doc, Edit::replace(start..end, text)))
	})
}

proptest! {
	/// Inferring from the caret after an edit reproduces the resulting buffer.
	#[test]
	fn prop_infer_reproduces_edit((doc, edit) in arb_doc_and_edit()) {
		let prev = Rope::from(doc.as_str());
		let mut next = prev.clone();
		edit.apply(&mut next);

		match Edit::infer(prev.slice(..), next.slice(..), edit.caret_after()) {
			None => prop_assert_eq!(prev.to_string(), next.to_string()),
			Some(inferred) => {
				let mut replayed = prev.clone();
				inferred.apply(&mut replayed);
				prop_assert_eq!(replayed.to_string(), next.to_string());
				prop_assert_eq!(inferred.caret_after(), edit.caret_after());
			}
		}
	}

	/// Mapped positions stay inside the edited document.
	#[test]
	fn prop_map_pos_in_bounds((doc, edit) in arb_doc_and_edit(), bias_right in any::<bool>()) {
		let len = doc.chars().count();
		let new_len = (len as isize + edit.len_delta()) as usize;
		let bias = if bias_right { Bias::Right } else { Bias::Left };
		for pos in 0..=len {
			prop_assert!(edit.map_pos(pos, bias) <= new_len);
		}
	}
}
