//! Error types for grammar compilation, configuration loading and session
//! commands.

use std::path::PathBuf;

use thiserror::Error;

use crate::ids::MarkerId;

/// Fatal grammar configuration errors, raised before any parsing happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
	/// Two anchors share the same anchor character.
	#[error("duplicate anchor character {0:?}")]
	DuplicateAnchor(char),

	/// Two anchors share the same kind.
	#[error("duplicate anchor kind {0:?}")]
	DuplicateKind(String),

	/// An anchor declares no parts, so a marker would have no terminal part.
	#[error("anchor {0:?} declares no parts")]
	NoParts(char),

	/// A part key appears twice within one anchor.
	#[error("anchor {anchor:?} declares part {key:?} twice")]
	DuplicatePart {
		/// The anchor character.
		anchor: char,
		/// The repeated key.
		key: String,
	},

	/// A separator character was used as an anchor.
	#[error("anchor character {0:?} is whitespace")]
	WhitespaceAnchor(char),

	/// A non-final part has no end delimiter and the next part no start delimiter.
	#[error("part {key:?} of anchor {anchor:?} cannot be separated from the part after it")]
	MissingSeparator {
		/// The anchor character.
		anchor: char,
		/// The part whose text would run into the next part.
		key: String,
	},
}

/// Errors that can occur when loading a grammar configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {}: {error}", path.display())]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The configuration parsed but does not compile.
	#[error(transparent)]
	Grammar(#[from] GrammarError),
}

/// Rejected session commands.
///
/// These are reported to the caller and never modify state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
	/// The marker was deleted or never existed.
	#[error("marker {0} not found")]
	MarkerNotFound(MarkerId),

	/// The marker has no (parsed) part with that key.
	#[error("marker {id} has no part {key:?}")]
	UnknownPart {
		/// The marker addressed.
		id: MarkerId,
		/// The missing part key.
		key: String,
	},

	/// Parts must be resolved strictly in declared order.
	#[error("part {key:?} resolved out of order, expected {expected:?}")]
	OutOfOrder {
		/// The part the caller tried to resolve.
		key: String,
		/// The next part that may be resolved.
		expected: String,
	},

	/// The part already has an identity; resolution never goes backwards.
	#[error("part {key:?} is already resolved")]
	AlreadyResolved {
		/// The resolved part.
		key: String,
	},

	/// Locking the part would leave it (or its marker) with no text.
	#[error("part {key:?} cannot be locked with empty text")]
	EmptyText {
		/// The part the caller tried to lock.
		key: String,
	},

	/// The marker is locked; only its data can change.
	#[error("marker {0} is locked")]
	Locked(MarkerId),

	/// The session is read-only; only part data can change.
	#[error("session is read-only")]
	ReadOnly,
}

/// A broken marker-list invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
	/// A marker with `start >= end`.
	#[error("marker {index} has empty or inverted span {start}..{end}")]
	EmptySpan {
		/// Position in the marker list.
		index: usize,
		/// Span start.
		start: usize,
		/// Span end.
		end: usize,
	},

	/// Two neighbouring markers overlap or are out of order.
	#[error("markers {index} and {} overlap", index + 1)]
	Overlap {
		/// Position of the first marker.
		index: usize,
	},

	/// A marker reaches past the end of the buffer.
	#[error("marker {index} ends at {end}, past buffer length {len}")]
	OutOfBounds {
		/// Position in the marker list.
		index: usize,
		/// Span end.
		end: usize,
		/// Buffer length.
		len: usize,
	},

	/// Parts are out of order or leave the marker span.
	#[error("marker {index} has inconsistent parts")]
	Parts {
		/// Position in the marker list.
		index: usize,
	},

	/// `locked` disagrees with `last_resolved`.
	#[error("marker {index} lock state disagrees with its resolved parts")]
	LockState {
		/// Position in the marker list.
		index: usize,
	},
}

/// Result type for grammar operations.
pub type Result<T> = std::result::Result<T, GrammarError>;
