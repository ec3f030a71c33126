//! Part resolution.
//!
//! A marker's parts are resolved to external identities one at a time, in
//! declared order. Resolving a part locks it; resolving the last part locks
//! the whole marker and lets the host replace its text with a display form.

use inkmark_primitives::range::shift;
use inkmark_primitives::{CharIdx, Rope, Span};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ProtocolError;
use crate::marker::{Marker, Part, Spanned};

/// Where the caret goes after a text-changing update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaretHint {
	/// Before the updated part (or marker).
	Start,
	/// After the updated part (or marker, including appended text).
	End,
}

/// Changes to one part of a marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartUpdate {
	/// Replacement text for the part, without delimiters.
	pub text: Option<String>,
	/// Identity that resolves (and locks) the part.
	pub id: Option<Value>,
	/// Opaque data to attach to the part.
	pub data: Option<Value>,
	/// Text inserted right after a marker being locked, outside its span.
	pub append_text: Option<String>,
	/// Caret placement after the update.
	pub caret: Option<CaretHint>,
}

impl PartUpdate {
	/// An update resolving the part to `id`.
	pub fn resolve(id: impl Into<Value>) -> Self {
		Self {
			id: Some(id.into()),
			..Self::default()
		}
	}

	/// An update replacing only the part text.
	pub fn text(text: impl Into<String>) -> Self {
		Self {
			text: Some(text.into()),
			..Self::default()
		}
	}

	/// An update attaching only data.
	pub fn data(data: impl Into<Value>) -> Self {
		Self {
			data: Some(data.into()),
			..Self::default()
		}
	}

	/// Sets the replacement text.
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	/// Sets the text appended after a locked marker.
	pub fn with_append(mut self, text: impl Into<String>) -> Self {
		self.append_text = Some(text.into());
		self
	}

	/// Sets the caret placement.
	pub fn with_caret(mut self, caret: CaretHint) -> Self {
		self.caret = Some(caret);
		self
	}

	/// Sets the attached data.
	pub fn with_data(mut self, data: impl Into<Value>) -> Self {
		self.data = Some(data.into());
		self
	}

	/// Returns true if the update only attaches data.
	pub fn is_data_only(&self) -> bool {
		self.text.is_none() && self.id.is_none() && self.append_text.is_none()
	}
}

/// Applies `update` to part `key` of `markers[index]`.
///
/// The buffer, the marker and every later marker are adjusted for any change
/// in text length. Returns the requested caret position, if any. On error
/// nothing is modified.
pub fn resolve_part(
	buffer: &mut Rope,
	markers: &mut [Marker],
	index: usize,
	key: &str,
	update: PartUpdate,
) -> Result<Option<CharIdx>, ProtocolError> {
	let marker = &markers[index];
	let part_index = check(marker, key, &update)?;

	let PartUpdate {
		text,
		id,
		data,
		append_text,
		caret: hint,
	} = update;
	let locks_part = id.is_some();
	let last = marker.parts_config.len() - 1;

	let mut delta = 0;
	let mut caret = None;
	let marker = &mut markers[index];

	if locks_part && part_index == last {
		if let Some(text) = text {
			let append = append_text.unwrap_or_default();
			let old = marker.span();
			let text_len = text.chars().count();
			let append_len = append.chars().count();

			buffer.remove(old.start..old.end);
			buffer.insert(old.start, &append);
			buffer.insert(old.start, &text);
			marker.end = old.start + text_len;
			delta = (text_len + append_len) as isize - old.len() as isize;
			caret = hint.map(|h| match h {
				CaretHint::Start => marker.start,
				CaretHint::End => marker.end + append_len,
			});
		}
		marker.locked = true;
		marker.last_resolved = Some(last);
		marker.parts.clear();
		marker.parts_text.clear();
		debug!(id = ?marker.id, kind = %marker.kind, "resolve.lock_marker");
	} else if text.is_some() || locks_part {
		if append_text.is_some() {
			debug!(id = ?marker.id, key, "resolve.append_ignored");
		}
		if part_index == marker.parts.len() {
			let at = marker.end;
			marker.parts.push(Part {
				key: key.to_owned(),
				start: at,
				end: at,
				start_char: None,
				end_char: None,
				locked: false,
			});
		}

		let config = &marker.parts_config[part_index];
		let part = &marker.parts[part_index];
		let (open, close) = if locks_part {
			(config.start_char, config.end_char)
		} else {
			(part.start_char, part.end_char)
		};
		let text = text.unwrap_or_else(|| marker.parts_text.get(key).cloned().unwrap_or_default());
		let rendered = Part::render(&text, open, close);
		let rendered_len = rendered.chars().count();
		let old = part.span();

		buffer.remove(old.start..old.end);
		buffer.insert(old.start, &rendered);
		delta = rendered_len as isize - old.len() as isize;

		let part = &mut marker.parts[part_index];
		part.end = old.start + rendered_len;
		part.start_char = open;
		part.end_char = close;
		part.locked |= locks_part;
		let part_span = part.span();
		for later in &mut marker.parts[part_index + 1..] {
			later.shift(delta);
		}
		marker.end = shift(marker.end, delta);
		marker.parts_text.insert(key.to_owned(), text);
		if locks_part {
			marker.last_resolved = Some(part_index);
			debug!(id = ?marker.id, key, "resolve.lock_part");
		}
		caret = hint.map(|h| match h {
			CaretHint::Start => part_span.start,
			CaretHint::End => part_span.end,
		});
	}

	if let Some(id) = id {
		marker.parts_ids.insert(key.to_owned(), id);
	}
	if let Some(data) = data {
		marker.parts_data.insert(key.to_owned(), data);
	}

	for later in &mut markers[index + 1..] {
		later.shift(delta);
	}
	Ok(caret)
}

/// Validates an update without applying it. Returns the part index.
fn check(marker: &Marker, key: &str, update: &PartUpdate) -> Result<usize, ProtocolError> {
	let unknown = || ProtocolError::UnknownPart {
		id: marker.id,
		key: key.to_owned(),
	};
	let part_index = marker.part_index(key).ok_or_else(unknown)?;

	if marker.locked {
		return if update.is_data_only() {
			Ok(part_index)
		} else {
			Err(ProtocolError::Locked(marker.id))
		};
	}

	let expected = marker.last_resolved.map_or(0, |k| k + 1);
	if update.id.is_some() || update.text.is_some() {
		if part_index < expected {
			return Err(ProtocolError::AlreadyResolved { key: key.to_owned() });
		}
		if update.id.is_some() && part_index > expected {
			return Err(ProtocolError::OutOfOrder {
				key: key.to_owned(),
				expected: marker.parts_config[expected].key.clone(),
			});
		}
		// A part that has not been typed yet can only be opened right after a
		// delimited predecessor.
		if part_index > marker.parts.len()
			|| (part_index == marker.parts.len()
				&& part_index > 0
				&& marker.parts[part_index - 1].end_char.is_none()
				&& marker.parts_config[part_index].start_char.is_none())
		{
			return Err(unknown());
		}
	}

	if update.id.is_some() && locks_empty(marker, key, part_index, update.text.as_deref()) {
		return Err(ProtocolError::EmptyText { key: key.to_owned() });
	}
	Ok(part_index)
}

/// Returns true if locking part `key` with `text` would leave a zero-width
/// locked span: the marker itself for the final part, the part otherwise.
fn locks_empty(marker: &Marker, key: &str, part_index: usize, text: Option<&str>) -> bool {
	if part_index + 1 == marker.parts_config.len() {
		return text == Some("");
	}
	let config = &marker.parts_config[part_index];
	let text = text.or_else(|| marker.parts_text.get(key).map(String::as_str));
	config.start_char.is_none() && config.end_char.is_none() && text.is_none_or(str::is_empty)
}

/// Removes `markers[index]` and its text. Returns where its span started.
pub fn delete_marker(buffer: &mut Rope, markers: &mut Vec<Marker>, index: usize) -> CharIdx {
	let marker = markers.remove(index);
	let Span { start, end } = marker.span().clamp(buffer.len_chars());
	buffer.remove(start..end);
	let delta = -((end - start) as isize);
	for later in &mut markers[index..] {
		later.shift(delta);
	}
	debug!(id = ?marker.id, start, end, "resolve.delete_marker");
	start
}
