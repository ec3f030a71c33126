//! Core text types for marker overlays: spans, selections and edits.

/// Single range-replace edits and their inference from host buffers.
pub mod edit;
/// Text range types: character indices and half-open spans.
pub mod range;
/// Rope utilities and extensions.
pub mod rope;
/// The host's single-range selection.
pub mod selection;

pub use edit::{Bias, Edit, EditKey, Insertion};
pub use range::{CharIdx, CharLen, Direction, Span};
pub use rope::{at_word_start, is_separator};
pub use ropey::{Rope, RopeSlice};
pub use selection::{Motion, Selection};
