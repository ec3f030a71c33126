//! Inkmark command-line driver.
//!
//! Parses text against a grammar file, or replays a scripted editing session,
//! and prints the result as JSON on stdout. Logs go to stderr.

mod cli;
mod replay;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use inkmark_markers::{Grammar, GrammarConfig, MarkerParser, SequentialIds};
use serde::Serialize;
use tracing::info;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::Parse { grammar, text } => {
			let parser = MarkerParser::new(load_grammar(&grammar)?);
			let markers = parser.parse(text.as_str(), 0, &mut SequentialIds::default());
			info!(markers = markers.len(), "parsed");
			print_json(&markers, cli.compact)
		}
		Command::Replay { grammar, script } => {
			let grammar = load_grammar(&grammar)?;
			let script = replay::Script::from_path(&script)?;
			let report = replay::run(grammar, script);
			info!(steps = report.steps.len(), markers = report.markers.len(), "replayed");
			print_json(&report, cli.compact)
		}
	}
}

fn load_grammar(path: &Path) -> anyhow::Result<Arc<Grammar>> {
	let grammar = GrammarConfig::from_path(path)
		.and_then(|config| config.compile())
		.with_context(|| format!("loading grammar {}", path.display()))?;
	Ok(Arc::new(grammar))
}

fn print_json(value: &impl Serialize, compact: bool) -> anyhow::Result<()> {
	let json = if compact {
		serde_json::to_string(value)?
	} else {
		serde_json::to_string_pretty(value)?
	};
	println!("{json}");
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("inkmark=debug,inkmark_markers=debug,warn")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
