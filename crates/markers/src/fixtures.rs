//! Shared grammar fixtures for unit tests.

use std::sync::Arc;

use crate::config::{AnchorConfig, GrammarConfig, PartConfig};
use crate::grammar::Grammar;
use crate::ids::SequentialIds;
use crate::parser::MarkerParser;

/// `@name`, `#name` and the two-part `!type:item` rule.
pub(crate) fn config() -> GrammarConfig {
	GrammarConfig {
		version: Some(1),
		anchors: vec![
			AnchorConfig::new('@', "person", [PartConfig::new("name").with_end(':')]),
			AnchorConfig::new('#', "thing", [PartConfig::new("name").with_end(':')]),
			AnchorConfig::new(
				'!',
				"combined",
				[
					PartConfig::new("type").with_end(':'),
					PartConfig::new("item").with_end(':'),
				],
			),
		],
	}
}

pub(crate) fn grammar() -> Arc<Grammar> {
	Arc::new(Grammar::compile(&config()).unwrap())
}

pub(crate) fn parser() -> MarkerParser {
	MarkerParser::new(grammar())
}

pub(crate) fn ids() -> SequentialIds {
	SequentialIds::default()
}
