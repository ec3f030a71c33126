//! CLI schema for the inkmark binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "inkmark")]
#[command(about = "Parse text into typed markers and replay marker editing sessions")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging (debug level on stderr)
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Print JSON on a single line
	#[arg(long, global = true)]
	pub compact: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Parse TEXT and print its markers as JSON
	Parse {
		/// Grammar configuration (TOML)
		#[arg(long, short = 'g', value_name = "FILE")]
		grammar: PathBuf,

		/// Text to parse
		text: String,
	},
	/// Replay a JSON script of session commands and print the final state
	Replay {
		/// Grammar configuration (TOML)
		#[arg(long, short = 'g', value_name = "FILE")]
		grammar: PathBuf,

		/// Script file (JSON)
		script: PathBuf,
	},
}
