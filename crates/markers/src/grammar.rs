//! Compiled marker grammar.
//!
//! Compilation validates a [`GrammarConfig`] and precomputes, for every part,
//! which characters terminate it and how. The parser only ever consults the
//! compiled form.

use std::sync::Arc;

use inkmark_primitives::is_separator;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{GrammarConfig, PartConfig};
use crate::error::{ConfigError, GrammarError, Result};

/// What a terminating character does to the part being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
	/// The part's own end delimiter: consumed, then the next part begins.
	EndOfPart,
	/// The next part's start delimiter: not consumed, the next part begins on it.
	StartOfNextPart,
	/// A separator: not consumed, the part and the marker end.
	EndOfMarker,
}

/// A part with its terminator table.
#[derive(Debug, Clone)]
pub struct CompiledPart {
	config: PartConfig,
	terminators: FxHashMap<char, Termination>,
}

impl CompiledPart {
	/// The configured part.
	pub fn config(&self) -> &PartConfig {
		&self.config
	}

	/// Part key.
	pub fn key(&self) -> &str {
		&self.config.key
	}

	/// Returns how `c` terminates this part, if it does.
	///
	/// Separators take precedence over the part's own end delimiter, which
	/// takes precedence over the next part's start delimiter.
	pub fn termination(&self, c: char) -> Option<Termination> {
		if is_separator(c) {
			return Some(Termination::EndOfMarker);
		}
		self.terminators.get(&c).copied()
	}
}

/// A compiled anchor rule.
#[derive(Debug, Clone)]
pub struct CompiledAnchor {
	anchor: char,
	kind: String,
	parts_config: Arc<[PartConfig]>,
	parts: Vec<CompiledPart>,
}

impl CompiledAnchor {
	/// The anchor character.
	pub fn anchor(&self) -> char {
		self.anchor
	}

	/// The marker kind.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// The shared part configuration attached to every marker of this anchor.
	pub fn parts_config(&self) -> &Arc<[PartConfig]> {
		&self.parts_config
	}

	/// Compiled parts, in order.
	pub fn parts(&self) -> &[CompiledPart] {
		&self.parts
	}
}

/// A validated, immutable grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
	version: Option<u32>,
	anchors: Vec<CompiledAnchor>,
	by_char: FxHashMap<char, usize>,
	by_kind: FxHashMap<String, usize>,
}

impl Grammar {
	/// Validates and compiles a configuration.
	pub fn compile(config: &GrammarConfig) -> Result<Self> {
		let mut anchors = Vec::with_capacity(config.anchors.len());
		let mut by_char = FxHashMap::default();
		let mut by_kind = FxHashMap::default();

		for (index, anchor) in config.anchors.iter().enumerate() {
			if is_separator(anchor.anchor) {
				return Err(GrammarError::WhitespaceAnchor(anchor.anchor));
			}
			if by_char.insert(anchor.anchor, index).is_some() {
				return Err(GrammarError::DuplicateAnchor(anchor.anchor));
			}
			if by_kind.insert(anchor.kind.clone(), index).is_some() {
				return Err(GrammarError::DuplicateKind(anchor.kind.clone()));
			}
			if anchor.parts.is_empty() {
				return Err(GrammarError::NoParts(anchor.anchor));
			}

			let mut keys = FxHashSet::default();
			for (i, part) in anchor.parts.iter().enumerate() {
				if !keys.insert(part.key.as_str()) {
					return Err(GrammarError::DuplicatePart {
						anchor: anchor.anchor,
						key: part.key.clone(),
					});
				}
				let next_start = anchor.parts.get(i + 1).and_then(|next| next.start_char);
				if i + 1 < anchor.parts.len() && part.end_char.is_none() && next_start.is_none() {
					return Err(GrammarError::MissingSeparator {
						anchor: anchor.anchor,
						key: part.key.clone(),
					});
				}
			}

			anchors.push(CompiledAnchor {
				anchor: anchor.anchor,
				kind: anchor.kind.clone(),
				parts_config: anchor.parts.iter().cloned().collect(),
				parts: compile_parts(&anchor.parts),
			});
		}

		Ok(Self {
			version: config.version,
			anchors,
			by_char,
			by_kind,
		})
	}

	/// Parses and compiles a TOML grammar configuration.
	pub fn from_toml_str(input: &str) -> std::result::Result<Self, ConfigError> {
		GrammarConfig::from_toml_str(input)?.compile()
	}

	/// Grammar version stamped on markers.
	pub fn version(&self) -> Option<u32> {
		self.version
	}

	/// Looks up the anchor rule started by `c`.
	pub fn anchor(&self, c: char) -> Option<&CompiledAnchor> {
		self.by_char.get(&c).map(|&i| &self.anchors[i])
	}

	/// Looks up an anchor rule by marker kind.
	pub fn by_kind(&self, kind: &str) -> Option<&CompiledAnchor> {
		self.by_kind.get(kind).map(|&i| &self.anchors[i])
	}

	/// All anchor rules, in configuration order.
	pub fn anchors(&self) -> &[CompiledAnchor] {
		&self.anchors
	}
}

fn compile_parts(parts: &[PartConfig]) -> Vec<CompiledPart> {
	parts
		.iter()
		.enumerate()
		.map(|(i, part)| {
			let mut terminators = FxHashMap::default();
			if let Some(next_start) = parts.get(i + 1).and_then(|next| next.start_char) {
				terminators.insert(next_start, Termination::StartOfNextPart);
			}
			// Own end wins over the next start when they coincide.
			if let Some(end) = part.end_char {
				terminators.insert(end, Termination::EndOfPart);
			}
			CompiledPart {
				config: part.clone(),
				terminators,
			}
		})
		.collect()
}
