//! Grammar configuration.
//!
//! A grammar is an ordered list of anchors. Each anchor has a character that
//! starts a marker, a kind (the marker "type"), and an ordered list of parts
//! that make up the marker body. Configuration is usually written in TOML:
//!
//! ```toml
//! version = 1
//!
//! [[anchors]]
//! anchor = "@"
//! kind = "person"
//! parts = [{ key = "person", end = ":" }]
//!
//! [[anchors]]
//! anchor = "!"
//! kind = "combined"
//! parts = [
//!     { key = "type", end = ":" },
//!     { key = "item", end = ":" },
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grammar::Grammar;

/// One segment of a marker body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartConfig {
	/// Name of the part, used as a key in `parts_text`, `parts_ids` and `parts_data`.
	pub key: String,
	/// Delimiter that must open the part.
	#[serde(default, rename = "start", skip_serializing_if = "Option::is_none")]
	pub start_char: Option<char>,
	/// Delimiter that closes the part.
	#[serde(default, rename = "end", skip_serializing_if = "Option::is_none")]
	pub end_char: Option<char>,
}

impl PartConfig {
	/// Creates an undelimited part.
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			start_char: None,
			end_char: None,
		}
	}

	/// Sets the opening delimiter.
	pub fn with_start(mut self, c: char) -> Self {
		self.start_char = Some(c);
		self
	}

	/// Sets the closing delimiter.
	pub fn with_end(mut self, c: char) -> Self {
		self.end_char = Some(c);
		self
	}
}

/// A marker rule: the anchor character, its kind and its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorConfig {
	/// The character that begins a marker.
	pub anchor: char,
	/// Marker kind, e.g. `person` for `@`.
	#[serde(alias = "type")]
	pub kind: String,
	/// Ordered parts of the marker body.
	#[serde(default)]
	pub parts: Vec<PartConfig>,
}

impl AnchorConfig {
	/// Creates an anchor rule.
	pub fn new(anchor: char, kind: impl Into<String>, parts: impl IntoIterator<Item = PartConfig>) -> Self {
		Self {
			anchor,
			kind: kind.into(),
			parts: parts.into_iter().collect(),
		}
	}
}

/// Declarative grammar configuration, compiled by [`Grammar::compile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarConfig {
	/// Version stamped on every marker this grammar produces.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<u32>,
	/// Anchor rules, in priority order.
	#[serde(default)]
	pub anchors: Vec<AnchorConfig>,
}

impl GrammarConfig {
	/// Parses a configuration from TOML text.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses a TOML configuration file.
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	/// Compiles this configuration.
	pub fn compile(&self) -> Result<Grammar, ConfigError> {
		Ok(Grammar::compile(self)?)
	}
}
