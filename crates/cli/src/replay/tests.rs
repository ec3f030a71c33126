use inkmark_markers::{GrammarConfig, Resolution};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn grammar() -> Arc<Grammar> {
	let config = GrammarConfig::from_toml_str(include_str!("../../testdata/grammar.toml")).unwrap();
	Arc::new(config.compile().unwrap())
}

fn script(value: Value) -> Script {
	serde_json::from_value(value).unwrap()
}

#[test]
fn deserializes_every_command() {
	let script = script(json!({
		"text": "hi",
		"read_only": true,
		"commands": [
			{ "cmd": "select", "start": 1, "end": 2 },
			{ "cmd": "select", "start": 1 },
			{ "cmd": "insert", "text": "x" },
			{ "cmd": "backspace" },
			{ "cmd": "delete" },
			{ "cmd": "input", "text": "hix", "caret": 3 },
			{ "cmd": "input", "text": "h", "caret": 1, "key": "backspace" },
			{ "cmd": "resolve", "marker": 0, "key": "name", "id": 7, "caret": "start" },
			{ "cmd": "set_data", "marker": 0, "key": "name", "data": { "a": 1 } },
			{ "cmd": "delete_marker", "marker": 0, "move_caret": true },
			{ "cmd": "read_only", "enabled": false },
			{ "cmd": "pointer_down" },
			{ "cmd": "pointer_up" }
		]
	}));

	assert!(script.read_only);
	assert_eq!(script.commands.len(), 13);
	assert_eq!(script.commands[1], ScriptCommand::Select { start: 1, end: None });
	assert_eq!(
		script.commands[6],
		ScriptCommand::Input {
			text: "h".into(),
			caret: 1,
			key: Key::Backspace,
		}
	);
	assert_eq!(
		script.commands[7],
		ScriptCommand::Resolve {
			marker: 0,
			key: "name".into(),
			update: PartUpdate::resolve(7).with_caret(inkmark_markers::CaretHint::Start),
		}
	);
}

#[test]
fn mention_script_replays() {
	let script: Script = serde_json::from_str(include_str!("../../testdata/mention.json")).unwrap();
	let report = run(grammar(), script);

	assert_eq!(report.text, "hi !person:mo ");
	assert_eq!(
		report.steps,
		vec![
			Step::Applied {
				caret: 8,
				redirected: false
			},
			report.steps[1].clone(),
			Step::Selected { start: 11, end: 11 },
			Step::Blocked { start: 3, end: 11 },
			Step::Applied {
				caret: 3,
				redirected: false
			},
			Step::Applied {
				caret: 13,
				redirected: false
			},
			report.steps[6].clone(),
		]
	);
	let Step::Resolved { marker } = &report.steps[1] else {
		panic!("expected resolved step, got {:?}", report.steps[1]);
	};
	assert!(marker.is_locked());

	assert_eq!(report.markers.len(), 1);
	assert_eq!(report.markers[0].kind, "combined");
	assert_eq!(report.markers[0].resolution(), Resolution::Partial(0));
	assert_eq!(report.selection, [13, 13]);
}

#[test]
fn bad_references_are_rejected() {
	let report = run(
		grammar(),
		script(json!({
			"text": "@jo",
			"markers": [{ "type": "person", "start": 0, "end": 3 }],
			"commands": [
				{ "cmd": "resolve", "marker": 4, "key": "name", "id": 1 },
				{ "cmd": "resolve", "marker": 0, "key": "nope", "id": 1 },
				{ "cmd": "delete_marker", "marker": 0 },
				{ "cmd": "delete_marker", "marker": 0 }
			]
		})),
	);

	assert_eq!(
		report.steps[0],
		Step::Rejected {
			error: "no marker at index 4".into()
		}
	);
	assert!(matches!(&report.steps[1], Step::Rejected { error } if error.contains("nope")));
	assert_eq!(report.steps[2], Step::Deleted { deleted: true });
	assert!(matches!(&report.steps[3], Step::Rejected { .. }));
	assert_eq!(report.text, "");
}

#[test]
fn read_only_script_blocks_typing() {
	let report = run(
		grammar(),
		script(json!({
			"text": "hello",
			"read_only": true,
			"commands": [
				{ "cmd": "insert", "text": "x" },
				{ "cmd": "read_only", "enabled": false },
				{ "cmd": "insert", "text": "!" }
			]
		})),
	);

	assert_eq!(report.steps[0], Step::Blocked { start: 5, end: 5 });
	assert_eq!(report.text, "hello!");
}

#[test]
fn report_serializes_events() {
	let report = run(
		grammar(),
		script(json!({
			"commands": [{ "cmd": "insert", "text": "#x" }]
		})),
	);
	let value = serde_json::to_value(&report).unwrap();

	assert_eq!(value["text"], json!("#x"));
	assert_eq!(value["steps"][0]["result"], json!("applied"));
	let events = value["events"].as_array().unwrap();
	assert_eq!(events[0]["event"], json!("markers_changed"));
	assert_eq!(events[0]["init"], json!(true));
	assert_eq!(events[1]["event"], json!("markers_changed"));
	assert_eq!(events[1]["markers"][0]["kind"], json!("thing"));
	assert_eq!(events[2]["event"], json!("in_edit_changed"));
}
