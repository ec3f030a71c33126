//! Editing sessions.
//!
//! A [`Session`] owns one buffer, its markers and the host selection. Every
//! operation takes the current state, runs it through classification,
//! constraint checks and the update engine, and stores the result. Hosts
//! observe changes through [`SessionEvent`]s.

mod events;

use std::sync::Arc;

pub use events::{InputOutcome, SessionEvent};
use inkmark_primitives::{Bias, CharIdx, Edit, EditKey, Rope, Selection, Span};
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::classify::{Classifier, SortedScan};
use crate::constraint::{Snap, SnapScope, Verdict, resolve_edit, resolve_selection};
use crate::error::ProtocolError;
use crate::grammar::Grammar;
use crate::ids::{IdGenerator, MarkerId, RandomIds};
use crate::marker::{Marker, Spanned, validate_markers};
use crate::parser::MarkerParser;
use crate::resolve::{self, PartUpdate};
use crate::seed::{MarkerSeed, hydrate};
use crate::update::{EditResult, UpdateEngine};

/// Everything a session knows about its document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
	/// The text.
	pub buffer: Rope,
	/// Markers, sorted and non-overlapping.
	pub markers: Vec<Marker>,
	/// Current host selection.
	pub selection: Selection,
	/// Selection used to derive motion for the next selection change.
	pub last_selection: Option<Selection>,
	/// The unlocked marker under the caret.
	pub in_edit: Option<MarkerId>,
	/// Whether a pointer drag is in progress.
	pub pointer_down: bool,
	/// Whether text edits are refused.
	pub read_only: bool,
}

/// A marker-aware editing session.
pub struct Session<C: Classifier = SortedScan> {
	engine: UpdateEngine<C>,
	ids: Box<dyn IdGenerator + Send>,
	state: SessionState,
	events: Vec<SessionEvent>,
}

impl Session {
	/// Creates an empty session.
	pub fn new(grammar: Arc<Grammar>) -> Self {
		Self::with_classifier(grammar, SortedScan)
	}

	/// Creates a session over `text` with stored markers.
	pub fn hydrate(grammar: Arc<Grammar>, text: &str, seeds: impl IntoIterator<Item = MarkerSeed>) -> Self {
		let mut session = Self::new(grammar);
		session.load(text, seeds);
		session
	}
}

impl<C: Classifier> Session<C> {
	/// Creates an empty session with a custom classifier.
	pub fn with_classifier(grammar: Arc<Grammar>, classifier: C) -> Self {
		Self {
			engine: UpdateEngine::new(MarkerParser::new(grammar), classifier),
			ids: Box::new(RandomIds),
			state: SessionState::default(),
			events: Vec::new(),
		}
	}

	/// Replaces the identifier generator.
	pub fn with_ids(mut self, ids: impl IdGenerator + Send + 'static) -> Self {
		self.ids = Box::new(ids);
		self
	}

	/// Replaces the document with `text` and stored markers.
	///
	/// The caret moves to the end of the text.
	pub fn load(&mut self, text: &str, seeds: impl IntoIterator<Item = MarkerSeed>) {
		let buffer = Rope::from(text);
		let markers = hydrate(self.engine.parser(), &buffer, seeds, self.ids.as_mut());
		let caret = Selection::point(buffer.len_chars());
		debug!(markers = markers.len(), len = buffer.len_chars(), "session.load");

		self.state = SessionState {
			buffer,
			markers,
			selection: caret,
			last_selection: Some(caret),
			in_edit: None,
			pointer_down: false,
			read_only: self.state.read_only,
		};
		self.emit_markers(true, true);
		self.refresh_in_edit();
	}

	/// The grammar in use.
	pub fn grammar(&self) -> &Arc<Grammar> {
		self.engine.parser().grammar()
	}

	/// The full session state.
	pub fn state(&self) -> &SessionState {
		&self.state
	}

	/// The buffer.
	pub fn buffer(&self) -> &Rope {
		&self.state.buffer
	}

	/// The buffer as a string.
	pub fn text(&self) -> String {
		self.state.buffer.to_string()
	}

	/// Current markers.
	pub fn markers(&self) -> &[Marker] {
		&self.state.markers
	}

	/// Current selection.
	pub fn selection(&self) -> Selection {
		self.state.selection
	}

	/// Whether the session refuses text edits.
	pub fn is_read_only(&self) -> bool {
		self.state.read_only
	}

	/// Looks up a marker by id.
	pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
		self.state.markers.iter().find(|m| m.id == id)
	}

	/// The marker covering character `pos`.
	pub fn marker_at(&self, pos: CharIdx) -> Option<&Marker> {
		let markers = &self.state.markers;
		let i = markers.partition_point(|m| m.end <= pos);
		markers.get(i).filter(|m| m.contains(pos))
	}

	/// The unlocked marker under the caret.
	pub fn in_edit_marker(&self) -> Option<&Marker> {
		self.state.in_edit.and_then(|id| self.marker(id))
	}

	/// Drains pending events.
	pub fn take_events(&mut self) -> Vec<SessionEvent> {
		std::mem::take(&mut self.events)
	}

	/// Enables or disables read-only mode.
	pub fn set_read_only(&mut self, read_only: bool) {
		self.state.read_only = read_only;
	}

	/// Tracks pointer drags. Motion is measured from where the drag began.
	pub fn set_pointer_down(&mut self, down: bool) {
		self.state.pointer_down = down;
		if !down {
			self.state.last_selection = Some(self.state.selection);
		}
	}

	/// Moves the selection, keeping it out of locked markers.
	///
	/// Returns the selection actually applied.
	pub fn select(&mut self, selection: Selection) -> Selection {
		let requested = selection.clamp(self.state.buffer.len_chars());
		let motion = requested.motion_from(self.state.last_selection.as_ref());
		let cls = self.engine.classifier().classify(&self.state.markers, requested.span());
		let resolved = resolve_selection(&self.state.markers, &cls, motion);
		if resolved != requested {
			debug!(?requested, ?resolved, "session.selection_snapped");
		}

		self.place_selection(resolved);
		let previous = self.state.in_edit;
		self.state.in_edit = self.in_edit_at(resolved);
		self.events.push(SessionEvent::InEditChanged {
			in_edit: self.state.in_edit,
			previous,
		});
		resolved
	}

	/// Checks a key press against the current selection before the host acts
	/// on it.
	///
	/// Returns the selection to apply instead when the key would damage a
	/// locked marker; the host should then swallow the key.
	pub fn key_down(&mut self, key: EditKey) -> Option<Selection> {
		self.check_edit(self.state.selection.span(), key)
	}

	/// Types `text` over the current selection.
	pub fn insert(&mut self, text: &str) -> InputOutcome {
		self.edit(Edit::replace(self.state.selection.span(), text), EditKey::Other)
	}

	/// Deletes the selection, or the character before the caret.
	pub fn backspace(&mut self) -> InputOutcome {
		self.delete_key(EditKey::Backspace)
	}

	/// Deletes the selection, or the character after the caret.
	pub fn delete(&mut self) -> InputOutcome {
		self.delete_key(EditKey::Delete)
	}

	/// Applies an edit requested by the host.
	pub fn edit(&mut self, edit: Edit, key: EditKey) -> InputOutcome {
		if self.state.read_only {
			warn!(?edit.span, "session.read_only_edit");
			return InputOutcome::Blocked {
				selection: self.state.selection,
			};
		}

		let edit = edit.with_span(edit.span.clamp(self.state.buffer.len_chars()));
		if edit.is_identity() {
			return InputOutcome::Unchanged;
		}
		if let Some(selection) = self.check_edit(edit.span, key) {
			return InputOutcome::Blocked { selection };
		}

		let result = self.engine.apply(&self.state.buffer, &self.state.markers, &edit, self.ids.as_mut());
		self.commit(result)
	}

	/// Reconciles the host's buffer after it applied user input itself.
	///
	/// `text` is the host's new buffer and `caret` its caret. The change is
	/// inferred, checked and replayed on the session's buffer. Unless the
	/// outcome is a plain `Applied { redirected: false }`, the host must adopt
	/// the session's text and selection.
	pub fn apply_host_input(&mut self, text: &str, caret: CharIdx, key: EditKey) -> InputOutcome {
		let next = Rope::from(text);
		let Some(edit) = Edit::infer(self.state.buffer.slice(..), next.slice(..), caret) else {
			return InputOutcome::Unchanged;
		};
		trace!(?edit.span, inserted = edit.inserted_len(), ?key, "session.host_input");

		let outcome = self.edit(edit, key);
		if let InputOutcome::Applied {
			caret,
			redirected: false,
		} = outcome && self.state.buffer != next
		{
			error!(host = %next, session = %self.state.buffer, "session.diverged");
			return InputOutcome::Diverged { caret };
		}
		outcome
	}

	/// Resolves part `key` of marker `id`. Returns the updated marker.
	///
	/// In read-only mode only data updates are accepted.
	pub fn resolve_part(&mut self, id: MarkerId, key: &str, update: PartUpdate) -> Result<Marker, ProtocolError> {
		let result = self.try_resolve_part(id, key, update);
		if let Err(err) = &result {
			warn!(?id, key, %err, "session.protocol_violation");
		}
		result
	}

	/// Attaches data to part `key` of marker `id`.
	pub fn set_part_data(&mut self, id: MarkerId, key: &str, data: Value) -> Result<(), ProtocolError> {
		self.resolve_part(id, key, PartUpdate::data(data)).map(|_| ())
	}

	/// Deletes marker `id` and its text.
	///
	/// Returns false when the marker no longer exists or the session is
	/// read-only.
	pub fn delete_marker(&mut self, id: MarkerId, move_caret: bool) -> bool {
		if self.state.read_only {
			warn!(?id, "session.read_only_delete");
			return false;
		}
		let Some(index) = self.index_of(id) else {
			debug!(?id, "session.delete_missing");
			return false;
		};

		let removed = Edit::delete(self.state.markers[index].span());
		let start = resolve::delete_marker(&mut self.state.buffer, &mut self.state.markers, index);
		let selection = if move_caret {
			Selection::point(start)
		} else {
			let sel = self.state.selection;
			Selection::new(removed.map_pos(sel.start, Bias::Left), removed.map_pos(sel.end, Bias::Left))
		};
		self.place_selection(selection);
		self.emit_markers(true, false);
		self.refresh_in_edit();
		true
	}

	fn try_resolve_part(&mut self, id: MarkerId, key: &str, update: PartUpdate) -> Result<Marker, ProtocolError> {
		if self.state.read_only && !update.is_data_only() {
			return Err(ProtocolError::ReadOnly);
		}
		let index = self.index_of(id).ok_or(ProtocolError::MarkerNotFound(id))?;

		let caret = resolve::resolve_part(&mut self.state.buffer, &mut self.state.markers, index, key, update)?;
		let selection = match caret {
			Some(caret) => Selection::point(caret),
			None => self.state.selection.clamp(self.state.buffer.len_chars()),
		};
		self.place_selection(selection);
		self.check_invariants();
		self.emit_markers(true, false);
		self.refresh_in_edit();
		Ok(self.state.markers[index].clone())
	}

	fn delete_key(&mut self, key: EditKey) -> InputOutcome {
		let selection = self.state.selection;
		if !selection.is_caret() {
			return self.edit(Edit::delete(selection.span()), key);
		}
		if !self.state.read_only
			&& let Some(selection) = self.check_edit(selection.span(), key)
		{
			return InputOutcome::Blocked { selection };
		}

		let pos = selection.start;
		let span = match key {
			EditKey::Delete => Span::new(pos, (pos + 1).min(self.state.buffer.len_chars())),
			_ => Span::new(pos.saturating_sub(1), pos),
		};
		self.edit(Edit::delete(span), key)
	}

	/// Runs the constraint resolver. Marker-level blocks move the selection;
	/// part-level ones are left for the update engine to redirect.
	fn check_edit(&mut self, span: Span, key: EditKey) -> Option<Selection> {
		let markers = &self.state.markers;
		let classifier = self.engine.classifier();
		let cls = classifier.classify(markers, span);
		match resolve_edit(classifier, markers, &cls, key) {
			Verdict::Block(Snap {
				span: snap,
				scope: SnapScope::Marker,
			}) => {
				debug!(?span, ?snap, ?key, "session.edit_blocked");
				let selection = Selection::from(snap);
				self.place_selection(selection);
				self.refresh_in_edit();
				Some(selection)
			}
			Verdict::Block(_) | Verdict::Allow => None,
		}
	}

	fn commit(&mut self, result: EditResult) -> InputOutcome {
		let EditResult {
			buffer,
			markers,
			caret,
			redirected,
			in_edit,
			..
		} = result;
		let changed = markers != self.state.markers;
		let in_edit = in_edit.map(|i| markers[i].id);

		self.state.buffer = buffer;
		self.state.markers = markers;
		self.check_invariants();
		self.place_selection(Selection::point(caret));
		self.emit_markers(changed, false);
		self.set_in_edit(in_edit);
		InputOutcome::Applied { caret, redirected }
	}

	fn place_selection(&mut self, selection: Selection) {
		self.state.selection = selection;
		if !self.state.pointer_down {
			self.state.last_selection = Some(selection);
		}
	}

	fn in_edit_at(&self, selection: Selection) -> Option<MarkerId> {
		let markers = &self.state.markers;
		self.engine
			.classifier()
			.classify(markers, selection.span())
			.in_edit()
			.filter(|&i| !markers[i].locked)
			.map(|i| markers[i].id)
	}

	fn refresh_in_edit(&mut self) {
		self.set_in_edit(self.in_edit_at(self.state.selection));
	}

	fn set_in_edit(&mut self, in_edit: Option<MarkerId>) {
		let previous = self.state.in_edit;
		if previous != in_edit {
			trace!(?in_edit, ?previous, "session.in_edit");
			self.state.in_edit = in_edit;
			self.events.push(SessionEvent::InEditChanged { in_edit, previous });
		}
	}

	fn check_invariants(&self) {
		if let Err(err) = validate_markers(&self.state.markers, self.state.buffer.len_chars()) {
			error!(%err, "session.invariant_violated");
		}
	}

	fn index_of(&self, id: MarkerId) -> Option<usize> {
		self.state.markers.iter().position(|m| m.id == id)
	}

	fn emit_markers(&mut self, changed: bool, init: bool) {
		self.events.push(SessionEvent::MarkersChanged {
			text: self.state.buffer.to_string(),
			markers: self.state.markers.clone(),
			changed,
			init,
		});
	}
}
