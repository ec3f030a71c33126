//! Constraint resolution.
//!
//! Locked markers are atomic: an edit may delete one wholesale but never
//! change part of it. Partially resolved markers protect their locked part
//! run the same way. This module decides, for a proposed edit or selection,
//! whether it is allowed and where the selection should go instead.

use inkmark_primitives::{Direction, EditKey, Motion, Selection, Span};

use crate::classify::{Classification, Classifier};
use crate::marker::{Marker, Spanned};

/// What a snap protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapScope {
	/// A locked marker. The host should select the snapped range and let the
	/// user act again.
	Marker,
	/// The locked part run of a partially resolved marker. The edit can be
	/// re-issued at the snapped range without user involvement.
	Part,
}

/// A replacement range for a blocked edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snap {
	/// The range the selection should move to.
	pub span: Span,
	/// What triggered the snap.
	pub scope: SnapScope,
}

/// Outcome of checking an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
	/// The edit may proceed unchanged.
	Allow,
	/// The edit would corrupt a locked span.
	Block(Snap),
}

/// Range covering the edit plus every locked marker it cuts into.
///
/// Returns `None` when no locked marker is partially selected.
pub fn locked_marker_snap(markers: &[Marker], cls: &Classification) -> Option<Span> {
	if let Some(i) = cls.mid_selected()
		&& markers[i].locked
	{
		return Some(markers[i].span());
	}

	let span = [cls.end_selected(), cls.start_selected()]
		.into_iter()
		.flatten()
		.filter(|&i| markers[i].locked)
		.fold(cls.span, |span, i| span.merge(&markers[i].span()));
	(span != cls.span).then_some(span)
}

/// Range the edit must move to so it leaves `marker`'s locked parts intact.
///
/// Returns `None` when the range neither intersects a locked part nor ends
/// where one begins.
pub fn locked_part_snap(classifier: &impl Classifier, marker: &Marker, span: Span) -> Option<Span> {
	if marker.locked {
		return None;
	}
	let run_end = marker.resolved_end()?;
	let parts = classifier.classify(&marker.parts, span);
	parts
		.intersecting()
		.chain(parts.start_touched)
		.any(|j| marker.parts[j].locked)
		.then(|| Span::new(run_end, span.end.max(run_end)))
}

/// Checks an edit of `cls.span`, triggered by `key`, against `markers`.
pub fn resolve_edit(classifier: &impl Classifier, markers: &[Marker], cls: &Classification, key: EditKey) -> Verdict {
	if let Some(span) = locked_marker_snap(markers, cls) {
		return Verdict::Block(Snap {
			span,
			scope: SnapScope::Marker,
		});
	}

	if cls.span.is_empty() {
		let touched = match key {
			EditKey::Backspace => cls.end_touched,
			EditKey::Delete => cls.start_touched,
			EditKey::Other => None,
		};
		if let Some(i) = touched.filter(|&i| markers[i].locked) {
			return Verdict::Block(Snap {
				span: markers[i].span(),
				scope: SnapScope::Marker,
			});
		}
	}

	if let Some(i) = cls.in_edit()
		&& let Some(span) = locked_part_snap(classifier, &markers[i], cls.span)
	{
		return Verdict::Block(Snap {
			span,
			scope: SnapScope::Part,
		});
	}

	Verdict::Allow
}

/// Adjusts a selection so it never ends inside a locked marker.
///
/// Carets move out to the side they were travelling toward, and to the end
/// when the motion is unknown. Ranges inside a locked marker grow to
/// cover it. Ranges crossing a locked boundary grow when the crossing end
/// moved outward and shrink otherwise.
pub fn resolve_selection(markers: &[Marker], cls: &Classification, motion: Motion) -> Selection {
	let Span { start, end } = cls.span;

	if let Some(i) = cls.mid_selected()
		&& markers[i].locked
	{
		let m = &markers[i];
		if start != end {
			return Selection::new(m.start, m.end);
		}
		let pos = if motion.primary() == Some(Direction::Backward) { m.start } else { m.end };
		return Selection::point(pos);
	}

	let mut selection = Selection::new(start, end);
	if let Some(i) = cls.end_selected()
		&& markers[i].locked
	{
		let m = &markers[i];
		selection.start = if motion.start == Some(Direction::Backward) { m.start } else { m.end };
	}
	if let Some(i) = cls.start_selected()
		&& markers[i].locked
	{
		let m = &markers[i];
		selection.end = if motion.end == Some(Direction::Forward) { m.end } else { m.start };
	}
	Selection::new(selection.start, selection.end)
}
