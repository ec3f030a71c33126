//! Host-facing session events and input outcomes.

use inkmark_primitives::{CharIdx, Selection};
use serde::Serialize;

use crate::ids::MarkerId;
use crate::marker::Marker;

/// Notifications for the host, drained with
/// [`Session::take_events`](super::Session::take_events).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
	/// The buffer or markers changed.
	MarkersChanged {
		/// Full buffer text.
		text: String,
		/// Current markers.
		markers: Vec<Marker>,
		/// Whether the marker list differs from before the operation.
		changed: bool,
		/// Set for the event emitted by hydration.
		init: bool,
	},
	/// The marker being edited changed.
	InEditChanged {
		/// The marker now being edited.
		in_edit: Option<MarkerId>,
		/// The marker edited before.
		previous: Option<MarkerId>,
	},
}

/// How the session handled an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
	/// The edit changed nothing.
	Unchanged,
	/// The edit was applied.
	Applied {
		/// Caret after the edit.
		caret: CharIdx,
		/// Whether the applied edit differs from the requested one. The host
		/// must then adopt the session's text.
		redirected: bool,
	},
	/// The edit was refused. The host should restore the session's text and
	/// apply `selection`.
	Blocked {
		/// Where the selection moved.
		selection: Selection,
	},
	/// The host buffer disagrees with the session after a faithful replay.
	/// The session keeps its own buffer.
	Diverged {
		/// Caret in the session's buffer.
		caret: CharIdx,
	},
}
