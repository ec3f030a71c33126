//! Marker identifiers and their generators.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque marker identifier, stable from creation until deletion.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(Uuid);

impl MarkerId {
	/// Creates an identifier from a raw 128-bit value.
	pub const fn from_u128(value: u128) -> Self {
		Self(Uuid::from_u128(value))
	}
}

impl fmt::Debug for MarkerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "MarkerId({})", self.0.as_u128())
	}
}

impl fmt::Display for MarkerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

/// Source of fresh marker identifiers.
pub trait IdGenerator {
	/// Returns an identifier never returned before by this generator.
	fn next(&mut self) -> MarkerId;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
	fn next(&mut self) -> MarkerId {
		(**self).next()
	}
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
	fn next(&mut self) -> MarkerId {
		(**self).next()
	}
}

/// Deterministic generator counting up from 1. Used by tests and replays.
#[derive(Debug, Clone)]
pub struct SequentialIds {
	next: u128,
}

impl SequentialIds {
	/// Starts counting at `first`.
	pub fn starting_at(first: u128) -> Self {
		Self { next: first }
	}
}

impl Default for SequentialIds {
	fn default() -> Self {
		Self::starting_at(1)
	}
}

impl IdGenerator for SequentialIds {
	fn next(&mut self) -> MarkerId {
		let id = MarkerId::from_u128(self.next);
		self.next += 1;
		id
	}
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
	fn next(&mut self) -> MarkerId {
		MarkerId(Uuid::new_v4())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sequential_ids_count_up() {
		let mut ids = SequentialIds::default();
		assert_eq!(ids.next(), MarkerId::from_u128(1));
		assert_eq!(ids.next(), MarkerId::from_u128(2));

		let mut ids = SequentialIds::starting_at(40);
		assert_eq!(ids.next(), MarkerId::from_u128(40));
	}

	#[test]
	fn random_ids_are_distinct() {
		let mut ids = RandomIds;
		assert_ne!(ids.next(), ids.next());
	}

	#[test]
	fn generators_work_through_references() {
		let mut ids = SequentialIds::default();
		let mut dynamic: Box<dyn IdGenerator> = Box::new(SequentialIds::starting_at(7));
		assert_eq!((&mut ids).next(), MarkerId::from_u128(1));
		assert_eq!(dynamic.next(), MarkerId::from_u128(7));
	}
}
