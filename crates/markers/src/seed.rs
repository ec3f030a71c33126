//! Rehydration of stored markers.
//!
//! Hosts persist markers next to their text and hand them back when a
//! document is reopened. Stored entries are untrusted: anything that does
//! not fit the grammar or the buffer is dropped.

use std::collections::BTreeMap;

use inkmark_primitives::{CharIdx, Rope, Span};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::ids::{IdGenerator, MarkerId};
use crate::marker::{Marker, Spanned};
use crate::parser::MarkerParser;

/// A stored marker as persisted by a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSeed {
	/// Stored identifier. A fresh one is drawn when absent.
	pub id: Option<MarkerId>,
	/// Anchor character, used when `kind` is absent.
	pub anchor: Option<char>,
	/// Marker kind.
	#[serde(alias = "type")]
	pub kind: Option<String>,
	/// Span start.
	pub start: CharIdx,
	/// Span end, exclusive.
	pub end: CharIdx,
	/// Identities of resolved parts.
	pub parts_ids: BTreeMap<String, Value>,
	/// Data attached to parts.
	pub parts_data: BTreeMap<String, Value>,
	/// Whether the marker was stored locked.
	pub locked: bool,
}

impl From<&Marker> for MarkerSeed {
	fn from(marker: &Marker) -> Self {
		Self {
			id: Some(marker.id),
			anchor: Some(marker.anchor),
			kind: Some(marker.kind.clone()),
			start: marker.start,
			end: marker.end,
			parts_ids: marker.parts_ids.clone(),
			parts_data: marker.parts_data.clone(),
			locked: marker.locked,
		}
	}
}

/// Rebuilds markers for `buffer` from stored seeds.
///
/// Seeds are sorted by start. A seed is dropped when its kind or anchor is
/// unknown, its span is empty or out of bounds, it overlaps an earlier seed,
/// its id repeats, or (for unlocked seeds) its text no longer parses as a
/// single marker of its kind.
pub fn hydrate(
	parser: &MarkerParser,
	buffer: &Rope,
	seeds: impl IntoIterator<Item = MarkerSeed>,
	ids: &mut dyn IdGenerator,
) -> Vec<Marker> {
	let mut seeds: Vec<MarkerSeed> = seeds.into_iter().collect();
	seeds.sort_by_key(|s| s.start);

	let mut seen = FxHashSet::default();
	let mut markers: Vec<Marker> = Vec::with_capacity(seeds.len());
	for seed in seeds {
		let span = Span::new(seed.start, seed.end);
		let marker = match hydrate_one(parser, buffer, seed, ids) {
			Ok(marker) => marker,
			Err(reason) => {
				debug!(?span, reason, "hydrate.drop");
				continue;
			}
		};
		if markers.last().is_some_and(|prev| prev.end > marker.start) {
			debug!(?span, reason = "overlaps previous marker", "hydrate.drop");
			continue;
		}
		if !seen.insert(marker.id) {
			debug!(?span, id = ?marker.id, reason = "duplicate id", "hydrate.drop");
			continue;
		}
		markers.push(marker);
	}
	markers
}

fn hydrate_one(
	parser: &MarkerParser,
	buffer: &Rope,
	seed: MarkerSeed,
	ids: &mut dyn IdGenerator,
) -> Result<Marker, &'static str> {
	if seed.start >= seed.end || seed.end > buffer.len_chars() {
		return Err("invalid span");
	}

	let grammar = parser.grammar();
	let anchor = match (&seed.kind, seed.anchor) {
		(Some(kind), _) => grammar.by_kind(kind),
		(None, Some(c)) => grammar.anchor(c),
		(None, None) => None,
	}
	.ok_or("unknown kind or anchor")?;
	if seed.anchor.is_some_and(|c| c != anchor.anchor()) {
		return Err("anchor does not match kind");
	}

	let config = anchor.parts_config();
	let locked = seed.locked || config.iter().all(|p| seed.parts_ids.contains_key(&p.key));
	if locked {
		let id = match seed.id {
			Some(id) => id,
			None => ids.next(),
		};
		return Ok(Marker {
			id,
			anchor: anchor.anchor(),
			kind: anchor.kind().to_owned(),
			version: grammar.version(),
			start: seed.start,
			end: seed.end,
			parts_config: config.clone(),
			parts: SmallVec::new(),
			parts_text: BTreeMap::new(),
			parts_ids: seed.parts_ids,
			parts_data: seed.parts_data,
			last_resolved: Some(config.len() - 1),
			locked: true,
		});
	}

	let mut parsed = parser.parse(buffer.slice(seed.start..seed.end), seed.start, ids);
	if parsed.len() != 1 {
		return Err("text does not parse as one marker");
	}
	let mut marker = parsed.remove(0);
	if marker.span() != Span::new(seed.start, seed.end) || marker.kind != anchor.kind() {
		return Err("text does not parse as this marker");
	}
	if let Some(id) = seed.id {
		marker.id = id;
	}

	let mut last_resolved = None;
	for (i, part) in marker.parts.iter_mut().enumerate() {
		let Some(id) = seed.parts_ids.get(&part.key) else {
			break;
		};
		part.locked = true;
		last_resolved = Some(i);
		marker.parts_ids.insert(part.key.clone(), id.clone());
	}
	marker.last_resolved = last_resolved;
	marker.parts_data = seed.parts_data;
	Ok(marker)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::fixtures::{ids, parser};
	use crate::marker::{Resolution, validate_markers};

	fn seed(kind: &str, start: usize, end: usize) -> MarkerSeed {
		MarkerSeed {
			kind: Some(kind.into()),
			start,
			end,
			..MarkerSeed::default()
		}
	}

	#[test]
	fn round_trips_through_seeds() {
		let buffer = Rope::from("hi @jo and !person:mo");
		let markers = parser().parse(buffer.slice(..), 0, &mut ids());
		let seeds: Vec<MarkerSeed> = markers.iter().map(MarkerSeed::from).collect();

		let hydrated = hydrate(&parser(), &buffer, seeds, &mut ids());
		assert_eq!(hydrated, markers);
	}

	#[test]
	fn restores_lock_state() {
		let buffer = Rope::from("John Doe and !person:mo");
		let mut john = seed("person", 0, 8);
		john.parts_ids.insert("name".into(), json!(42));
		let mut combined = seed("combined", 13, 23);
		combined.parts_ids.insert("type".into(), json!("person"));
		combined.parts_data.insert("item".into(), json!({"hint": true}));

		let markers = hydrate(&parser(), &buffer, [combined, john], &mut ids());
		assert_eq!(validate_markers(&markers, buffer.len_chars()), Ok(()));
		assert_eq!(markers.len(), 2);
		assert_eq!(markers[0].resolution(), Resolution::Locked);
		assert_eq!(markers[0].text(&buffer), "John Doe");
		assert_eq!(markers[1].resolution(), Resolution::Partial(0));
		assert!(markers[1].parts[0].locked);
		assert_eq!(markers[1].parts_data["item"], json!({"hint": true}));
	}

	#[test]
	fn drops_invalid_seeds() {
		let buffer = Rope::from("@jo #x plain");
		let mut by_anchor = seed("", 4, 6);
		by_anchor.kind = None;
		by_anchor.anchor = Some('#');
		let mut wrong_anchor = seed("person", 4, 6);
		wrong_anchor.anchor = Some('#');

		let seeds = vec![
			seed("person", 0, 3),
			seed("person", 1, 3),
			seed("unknown", 7, 12),
			seed("thing", 7, 7),
			seed("thing", 7, 99),
			seed("thing", 7, 12),
			wrong_anchor,
			by_anchor,
		];
		let markers = hydrate(&parser(), &buffer, seeds, &mut ids());
		let kinds: Vec<(&str, Span)> = markers.iter().map(|m| (m.kind.as_str(), m.span())).collect();
		assert_eq!(kinds, vec![("person", Span::new(0, 3)), ("thing", Span::new(4, 6))]);
	}

	#[test]
	fn drops_duplicate_ids() {
		let buffer = Rope::from("@a @b");
		let mut a = seed("person", 0, 2);
		a.id = Some(MarkerId::from_u128(9));
		let mut b = seed("person", 3, 5);
		b.id = Some(MarkerId::from_u128(9));

		let markers = hydrate(&parser(), &buffer, [a, b], &mut ids());
		assert_eq!(markers.len(), 1);
	}

	#[test]
	fn deserializes_stored_json() {
		let stored = json!([
			{ "id": "00000000-0000-0000-0000-00000000002a", "type": "person", "start": 0, "end": 8, "parts_ids": { "name": 42 } }
		]);
		let seeds: Vec<MarkerSeed> = serde_json::from_value(stored).unwrap();
		let markers = hydrate(&parser(), &Rope::from("John Doe"), seeds, &mut ids());
		assert_eq!(markers[0].id, MarkerId::from_u128(42));
		assert!(markers[0].locked);
	}
}
