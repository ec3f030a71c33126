//! Range classification.
//!
//! Given a sorted, non-overlapping list of spanned items and a query range,
//! determines how each item relates to the range. The same classification is
//! used for markers within the buffer and for parts within a marker.

use std::ops::Range;

use inkmark_primitives::Span;

use crate::marker::Spanned;


/// How the query range intersects the item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlap {
	/// No item intersects the range.
	Clear,
	/// The range lies strictly inside one item.
	Mid(usize),
	/// The range crosses item boundaries.
	Cross {
		/// Item whose tail is inside the range (`item.start < range.start`).
		end_selected: Option<usize>,
		/// Items entirely inside the range.
		covered: Option<Range<usize>>,
		/// Item whose head is inside the range (`item.end > range.end`).
		start_selected: Option<usize>,
	},
}

/// The result of classifying a range against a sorted item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
	/// The classified range.
	pub span: Span,
	/// Last item ending at or before the range start.
	pub prev: Option<usize>,
	/// First item starting at or after the range end.
	pub next: Option<usize>,
	/// `prev`, when it ends exactly at the range start.
	pub end_touched: Option<usize>,
	/// `next`, when it starts exactly at the range end.
	pub start_touched: Option<usize>,
	/// Items intersecting the range.
	pub overlap: Overlap,
}

impl Classification {
	/// The item strictly containing the range.
	pub fn mid_selected(&self) -> Option<usize> {
		match self.overlap {
			Overlap::Mid(i) => Some(i),
			_ => None,
		}
	}

	/// The item whose tail the range selects.
	pub fn end_selected(&self) -> Option<usize> {
		match self.overlap {
			Overlap::Cross { end_selected, .. } => end_selected,
			_ => None,
		}
	}

	/// The item whose head the range selects.
	pub fn start_selected(&self) -> Option<usize> {
		match self.overlap {
			Overlap::Cross { start_selected, .. } => start_selected,
			_ => None,
		}
	}

	/// Items fully covered by the range.
	pub fn covered(&self) -> Range<usize> {
		match &self.overlap {
			Overlap::Cross { covered: Some(r), .. } => r.clone(),
			_ => 0..0,
		}
	}

	/// Every item that intersects the range, in order.
	///
	/// When nothing intersects, this is the empty range at the position an
	/// item inserted at the range would take.
	pub fn intersecting(&self) -> Range<usize> {
		match &self.overlap {
			Overlap::Clear => {
				let at = self.prev.map_or(0, |p| p + 1);
				at..at
			}
			Overlap::Mid(i) => *i..*i + 1,
			Overlap::Cross {
				end_selected,
				covered,
				start_selected,
			} => {
				let first = end_selected
					.or(covered.as_ref().map(|r| r.start))
					.or(*start_selected)
					.unwrap_or(0);
				let last = start_selected
					.map(|i| i + 1)
					.or(covered.as_ref().map(|r| r.end))
					.or(end_selected.map(|i| i + 1))
					.unwrap_or(0);
				first..last
			}
		}
	}

	/// The item an edit at this range would modify in place.
	///
	/// That is the mid-selected item, else the end-selected one, else the
	/// item ending exactly where the range starts.
	pub fn in_edit(&self) -> Option<usize> {
		self.mid_selected().or(self.end_selected()).or(self.end_touched)
	}
}

/// Classifies ranges against sorted item lists.
///
/// Implementations must agree with [`SortedScan`]; the seam exists so the
/// lookup can be replaced by an interval index for large documents.
pub trait Classifier {
	/// Classifies `span` against `items`, which must be sorted and disjoint.
	fn classify<T: Spanned>(&self, items: &[T], span: Span) -> Classification;
}

/// Binary-search classifier over a sorted slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedScan;

impl Classifier for SortedScan {
	fn classify<T: Spanned>(&self, items: &[T], span: Span) -> Classification {
		let Span { start, end } = span;
		let lo = items.partition_point(|it| it.span().end <= start);
		// Zero-width items at a caret end before it and start at it.
		let hi = items.partition_point(|it| it.span().start < end).max(lo);

		let prev = lo.checked_sub(1);
		let next = (hi < items.len()).then_some(hi);
		let end_touched = prev.filter(|&i| items[i].span().end == start);
		let start_touched = next.filter(|&i| items[i].span().start == end);

		let overlap = if lo == hi {
			Overlap::Clear
		} else {
			let first = items[lo].span();
			let last = items[hi - 1].span();
			if hi - lo == 1 && first.start < start && first.end > end {
				Overlap::Mid(lo)
			} else {
				let end_selected = (first.start < start).then_some(lo);
				let start_selected = (last.end > end).then_some(hi - 1);
				let covered_lo = lo + usize::from(end_selected.is_some());
				let covered_hi = hi - usize::from(start_selected.is_some());
				Overlap::Cross {
					end_selected,
					covered: (covered_lo < covered_hi).then_some(covered_lo..covered_hi),
					start_selected,
				}
			}
		};

		Classification {
			span,
			prev,
			next,
			end_touched,
			start_touched,
			overlap,
		}
	}
}
