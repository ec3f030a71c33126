//! Typed marker overlays for plain-text buffers.
//!
//! A [`Grammar`] declares anchor characters and the ordered parts that follow
//! them (`@name`, `!type:item`). The [`MarkerParser`] finds markers in text,
//! the [`UpdateEngine`] keeps them consistent as the text is edited, and
//! collaborators resolve parts one by one until a marker locks. A
//! [`Session`] ties these together for a single document.
//!
//! # Invariants
//!
//! - Markers never overlap: `invariants::test_markers_never_overlap`
//! - Locked text changes only by whole deletion: `invariants::test_locked_text_is_protected`
//! - Resolution never goes backward: `invariants::test_resolution_is_monotonic`
//! - Parsing is idempotent: `invariants::test_parse_is_idempotent`
//! - Offsets after an edit shift by its delta: `invariants::test_offsets_are_conserved`

/// Range classification against sorted spans.
pub mod classify;
/// Grammar configuration as loaded from TOML.
pub mod config;
/// Edit and selection constraints around locked text.
pub mod constraint;
/// Error types.
pub mod error;
/// Compiled grammar.
pub mod grammar;
/// Marker identifiers.
pub mod ids;
/// The marker model.
pub mod marker;
/// The marker parser.
pub mod parser;
/// Part resolution and marker deletion.
pub mod resolve;
/// Rehydration of stored markers.
pub mod seed;
/// Editing sessions.
pub mod session;
/// Incremental marker maintenance.
pub mod update;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod invariants;

pub use classify::{Classification, Classifier, Overlap, SortedScan};
pub use config::{AnchorConfig, GrammarConfig, PartConfig};
pub use constraint::{Snap, SnapScope, Verdict};
pub use error::{ConfigError, GrammarError, InvariantError, ProtocolError};
pub use grammar::{CompiledAnchor, CompiledPart, Grammar, Termination};
pub use ids::{IdGenerator, MarkerId, RandomIds, SequentialIds};
pub use marker::{Marker, Part, Resolution, Spanned};
pub use parser::MarkerParser;
pub use resolve::{CaretHint, PartUpdate};
pub use seed::MarkerSeed;
pub use session::{InputOutcome, Session, SessionEvent, SessionState};
pub use update::{EditResult, UpdateEngine};
