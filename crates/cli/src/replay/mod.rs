//! Scripted session replays.
//!
//! A script is a starting text, optional stored markers and a list of
//! session commands. Replaying it drives a [`Session`] with deterministic
//! ids and reports every command's outcome alongside the final state.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use inkmark_markers::{Grammar, InputOutcome, Marker, MarkerId, MarkerSeed, PartUpdate, SequentialIds, Session, SessionEvent};
use inkmark_primitives::{CharIdx, EditKey, Selection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

#[cfg(test)]
mod tests;

/// A replay script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Script {
	/// Initial buffer text.
	pub text: String,
	/// Stored markers for the initial text.
	pub markers: Vec<MarkerSeed>,
	/// Whether the session starts read-only.
	pub read_only: bool,
	/// Commands, applied in order.
	pub commands: Vec<ScriptCommand>,
}

impl Script {
	/// Reads a script from a JSON file.
	pub fn from_path(path: &Path) -> anyhow::Result<Self> {
		let input = std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
		serde_json::from_str(&input).with_context(|| format!("parsing script {}", path.display()))
	}
}

/// Key that produced host input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
	Backspace,
	Delete,
	#[default]
	Other,
}

impl From<Key> for EditKey {
	fn from(key: Key) -> Self {
		match key {
			Key::Backspace => EditKey::Backspace,
			Key::Delete => EditKey::Delete,
			Key::Other => EditKey::Other,
		}
	}
}

/// One session command. Markers are addressed by their index in the current
/// marker list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ScriptCommand {
	/// Moves the selection. A missing `end` places a caret.
	Select {
		start: CharIdx,
		#[serde(default)]
		end: Option<CharIdx>,
	},
	/// Types text over the selection.
	Insert { text: String },
	Backspace,
	Delete,
	/// Host-applied input: the host's full new text and caret.
	Input {
		text: String,
		caret: CharIdx,
		#[serde(default)]
		key: Key,
	},
	/// Resolves a part.
	Resolve {
		marker: usize,
		key: String,
		#[serde(flatten)]
		update: PartUpdate,
	},
	/// Attaches data to a part.
	SetData { marker: usize, key: String, data: Value },
	DeleteMarker {
		marker: usize,
		#[serde(default)]
		move_caret: bool,
	},
	ReadOnly { enabled: bool },
	PointerDown,
	PointerUp,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Step {
	Done,
	Unchanged,
	Applied { caret: CharIdx, redirected: bool },
	Blocked { start: CharIdx, end: CharIdx },
	Diverged { caret: CharIdx },
	Selected { start: CharIdx, end: CharIdx },
	Resolved { marker: Box<Marker> },
	Deleted { deleted: bool },
	Rejected { error: String },
}

impl From<InputOutcome> for Step {
	fn from(outcome: InputOutcome) -> Self {
		match outcome {
			InputOutcome::Unchanged => Self::Unchanged,
			InputOutcome::Applied { caret, redirected } => Self::Applied { caret, redirected },
			InputOutcome::Blocked { selection } => Self::Blocked {
				start: selection.start,
				end: selection.end,
			},
			InputOutcome::Diverged { caret } => Self::Diverged { caret },
		}
	}
}

/// Final state of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
	pub text: String,
	pub selection: [CharIdx; 2],
	pub markers: Vec<Marker>,
	pub steps: Vec<Step>,
	pub events: Vec<SessionEvent>,
}

/// Replays `script` against a fresh session.
pub fn run(grammar: Arc<Grammar>, script: Script) -> Report {
	let mut session = Session::new(grammar).with_ids(SequentialIds::default());
	session.load(&script.text, script.markers);
	session.set_read_only(script.read_only);
	debug!(markers = session.markers().len(), commands = script.commands.len(), "replay.start");

	let mut steps = Vec::with_capacity(script.commands.len());
	for (index, command) in script.commands.into_iter().enumerate() {
		let step = apply(&mut session, command).unwrap_or_else(|error| Step::Rejected { error });
		trace!(index, ?step, "replay.step");
		steps.push(step);
	}

	let selection = session.selection();
	Report {
		text: session.text(),
		selection: [selection.start, selection.end],
		markers: session.markers().to_vec(),
		steps,
		events: session.take_events(),
	}
}

fn apply(session: &mut Session, command: ScriptCommand) -> Result<Step, String> {
	let step = match command {
		ScriptCommand::Select { start, end } => {
			let selection = session.select(Selection::new(start, end.unwrap_or(start)));
			Step::Selected {
				start: selection.start,
				end: selection.end,
			}
		}
		ScriptCommand::Insert { text } => session.insert(&text).into(),
		ScriptCommand::Backspace => session.backspace().into(),
		ScriptCommand::Delete => session.delete().into(),
		ScriptCommand::Input { text, caret, key } => session.apply_host_input(&text, caret, key.into()).into(),
		ScriptCommand::Resolve { marker, key, update } => {
			let id = marker_id(session, marker)?;
			let marker = session.resolve_part(id, &key, update).map_err(|e| e.to_string())?;
			Step::Resolved {
				marker: Box::new(marker),
			}
		}
		ScriptCommand::SetData { marker, key, data } => {
			let id = marker_id(session, marker)?;
			session.set_part_data(id, &key, data).map_err(|e| e.to_string())?;
			Step::Done
		}
		ScriptCommand::DeleteMarker { marker, move_caret } => {
			let id = marker_id(session, marker)?;
			Step::Deleted {
				deleted: session.delete_marker(id, move_caret),
			}
		}
		ScriptCommand::ReadOnly { enabled } => {
			session.set_read_only(enabled);
			Step::Done
		}
		ScriptCommand::PointerDown => {
			session.set_pointer_down(true);
			Step::Done
		}
		ScriptCommand::PointerUp => {
			session.set_pointer_down(false);
			Step::Done
		}
	};
	Ok(step)
}

fn marker_id(session: &Session, index: usize) -> Result<MarkerId, String> {
	session
		.markers()
		.get(index)
		.map(|m| m.id)
		.ok_or_else(|| format!("no marker at index {index}"))
}
