use clap::Parser;

use super::*;

#[test]
fn parse_subcommand() {
	let cli = Cli::try_parse_from(["inkmark", "parse", "-g", "grammar.toml", "hi @jo"]).unwrap();
	assert!(!cli.verbose);
	let Command::Parse { grammar, text } = cli.command else {
		panic!("expected parse");
	};
	assert_eq!(grammar, PathBuf::from("grammar.toml"));
	assert_eq!(text, "hi @jo");
}

#[test]
fn replay_subcommand_with_global_flags() {
	let cli = Cli::try_parse_from(["inkmark", "replay", "--grammar", "g.toml", "script.json", "-v", "--compact"]).unwrap();
	assert!(cli.verbose);
	assert!(cli.compact);
	assert!(matches!(cli.command, Command::Replay { ref script, .. } if script == &PathBuf::from("script.json")));
}

#[test]
fn grammar_is_required() {
	assert!(Cli::try_parse_from(["inkmark", "parse", "hi"]).is_err());
	assert!(Cli::try_parse_from(["inkmark"]).is_err());
}
