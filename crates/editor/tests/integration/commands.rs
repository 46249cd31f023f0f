use pretty_assertions::assert_eq;
use quire_editor::fields::COMMANDS;
use quire_editor::{
	CORE_COMMANDS, Collision, CommandError, CommandMap, Editor, EditorConfig, EditorError, command,
};
use quire_registry::Field;
use quire_primitives::StepError;
use quire_schema::SchemaError;
use quire_schema::fields::{CONTENT, GROUP, INLINE};
use rstest::rstest;
use serde_json::{Value, json};

use crate::common::{self, counter, editor, extensions, sample};

fn select(editor: &mut Editor, from: usize, to: usize) {
	assert!(editor.command("set_text_selection", json!({ "from": from, "to": to })).unwrap());
}

#[test]
fn test_insert_text_at_cursor() {
	let mut editor = editor();
	assert_eq!(editor.state().selection().head, 1);

	assert!(editor.command("insert_text", json!("oh, ")).unwrap());
	assert_eq!(editor.get_html(), "<p>oh, hello world</p>");
	assert_eq!(editor.state().selection().head, 5);
}

#[test]
fn test_insert_replaces_selection() {
	let mut editor = editor();
	let applied = editor
		.chain()
		.command("set_text_selection", json!({ "from": 1, "to": 6 }))
		.command("insert_text", json!({ "text": "bye" }))
		.run()
		.unwrap();

	assert!(applied);
	assert_eq!(editor.get_html(), "<p>bye world</p>");
}

#[test]
fn test_chain_dispatches_once() {
	common::init_tracing();
	let mut list = extensions();
	list.push(counter());
	let mut editor = Editor::builder()
		.extensions(list)
		.content(sample())
		.build()
		.unwrap();

	editor
		.chain()
		.command("insert_text", json!("a"))
		.command("insert_text", json!("b"))
		.command("set_text_selection", json!({ "from": 1, "to": 3 }))
		.command("toggle_mark", json!("bold"))
		.run()
		.unwrap();

	assert_eq!(common::count(&editor, "transactions"), 1);
	assert_eq!(common::count(&editor, "updates"), 1);
	assert_eq!(common::count(&editor, "last_steps"), 3);
	assert_eq!(editor.get_html(), "<p><strong>ab</strong>hello world</p>");
}

#[test]
fn test_can_runs_without_dispatch() {
	let mut list = extensions();
	list.push(counter());
	let mut editor = Editor::builder()
		.extensions(list)
		.content(sample())
		.build()
		.unwrap();

	assert!(!editor.can().command("toggle_mark", json!("bold")).run().unwrap());
	assert!(!editor.chain().command("delete_selection", Value::Null).can().unwrap());

	select(&mut editor, 1, 6);
	let transactions = common::count(&editor, "transactions");
	assert!(editor.can().command("toggle_mark", json!("bold")).run().unwrap());
	assert!(editor.chain().command("delete_selection", Value::Null).can().unwrap());

	assert_eq!(common::count(&editor, "transactions"), transactions);
	assert_eq!(editor.get_html(), "<p>hello world</p>");
}

#[test]
fn test_toggle_mark() {
	let mut editor = editor();
	select(&mut editor, 1, 6);

	assert!(editor.command("toggle_mark", json!("bold")).unwrap());
	assert_eq!(editor.get_html(), "<p><strong>hello</strong> world</p>");

	assert!(editor.command("toggle_mark", json!({ "name": "bold" })).unwrap());
	assert_eq!(editor.get_html(), "<p>hello world</p>");
}

#[test]
fn test_set_and_unset_mark() {
	let mut editor = editor();
	assert!(!editor.command("set_mark", json!("bold")).unwrap());

	select(&mut editor, 7, 12);
	assert!(editor.command("set_mark", json!("bold")).unwrap());
	assert_eq!(editor.get_html(), "<p>hello <strong>world</strong></p>");

	select(&mut editor, 1, 12);
	assert!(editor.command("unset_mark", json!("bold")).unwrap());
	assert_eq!(editor.get_html(), "<p>hello world</p>");
}

#[test]
fn test_unknown_mark() {
	let mut editor = editor();
	select(&mut editor, 1, 6);
	let err = editor.command("set_mark", json!("code")).unwrap_err();

	assert!(matches!(
		err,
		EditorError::Command(CommandError::UnknownMark(ref name)) if name == "code"
	));
}

#[test]
fn test_update_attributes() {
	let mut editor = editor();
	let applied = editor
		.command("update_attributes", json!({ "name": "paragraph", "attrs": { "align": "center" } }))
		.unwrap();

	assert!(applied);
	assert_eq!(editor.get_html(), "<p align=\"center\">hello world</p>");
	assert_eq!(
		editor.get_json().unwrap()["content"][0]["attrs"],
		json!({ "align": "center" })
	);

	let err = editor
		.command("update_attributes", json!({ "name": "heading", "attrs": {} }))
		.unwrap_err();
	assert!(matches!(err, EditorError::Command(CommandError::UnknownNodeType(_))));
}

#[test]
fn test_set_content() {
	let mut editor = editor();
	let content = json!({
		"type": "doc",
		"content": [
			{ "type": "paragraph", "content": [{ "type": "text", "text": "one" }] },
			{ "type": "paragraph", "content": [{ "type": "text", "text": "two" }] }
		]
	});

	assert!(editor.command("set_content", content).unwrap());
	assert_eq!(editor.get_html(), "<p>one</p><p>two</p>");
	assert_eq!(editor.state().selection().head, 1);
}

#[test]
fn test_set_content_is_checked() {
	let mut editor = editor();
	let invalid = json!({ "type": "doc", "content": [{ "type": "text", "text": "loose" }] });
	let err = editor.command("set_content", invalid).unwrap_err();

	assert!(matches!(
		err,
		EditorError::Command(CommandError::Schema(SchemaError::ContentMismatch { .. }))
	));
	assert_eq!(editor.get_html(), "<p>hello world</p>");
}

#[test]
fn test_set_content_unchecked() {
	let config = EditorConfig {
		enable_content_check: false,
		..EditorConfig::default()
	};
	let mut editor = Editor::builder()
		.extensions(extensions())
		.config(config)
		.build()
		.unwrap();
	let invalid = json!({ "type": "doc", "content": [{ "type": "text", "text": "loose" }] });

	assert!(editor.command("set_content", invalid).unwrap());
	assert_eq!(editor.get_html(), "loose");
}

#[test]
fn test_clear_content() {
	let mut editor = editor();
	assert!(editor.command("clear_content", Value::Null).unwrap());

	assert_eq!(
		editor.get_json().unwrap(),
		json!({ "type": "doc", "content": [{ "type": "paragraph", "attrs": { "align": null } }] })
	);
	assert_eq!(editor.get_html(), "<p></p>");
	assert_eq!(editor.state().selection().head, 1);
}

#[rstest]
#[case::range("delete_range", json!({ "from": 6, "to": 12 }), None, "<p>hello</p>")]
#[case::selection("delete_selection", Value::Null, Some((1, 7)), "<p>world</p>")]
fn test_delete(
	#[case] name: &str,
	#[case] args: Value,
	#[case] selection: Option<(usize, usize)>,
	#[case] html: &str,
) {
	let mut editor = editor();
	if let Some((from, to)) = selection {
		select(&mut editor, from, to);
	}
	assert!(editor.command(name, args).unwrap());
	assert_eq!(editor.get_html(), html);
}

#[test]
fn test_delete_empty_selection() {
	let mut editor = editor();
	assert!(!editor.command("delete_selection", Value::Null).unwrap());
}

#[rstest]
#[case::missing_text("insert_text", json!({}))]
#[case::bad_range("delete_range", json!({ "from": "a" }))]
#[case::bad_attrs("update_attributes", json!({ "name": "paragraph", "attrs": 3 }))]
#[case::bad_content("set_content", json!({ "content": [] }))]
fn test_invalid_arguments(#[case] name: &str, #[case] args: Value) {
	let mut editor = editor();
	let err = editor.command(name, args).unwrap_err();
	assert!(matches!(
		err,
		EditorError::Command(CommandError::InvalidArgument { ref command, .. }) if command == name
	));
}

#[test]
fn test_user_command_wins_over_core() {
	let mut commands = CommandMap::new();
	commands.insert(
		"insert_text".into(),
		command(|props, args| {
			let text = args.as_str().unwrap_or_default().to_uppercase();
			let selection = props.tr.selection();
			props.tr.replace_text(selection.from(), selection.to(), &text)?;
			Ok(true)
		}),
	);
	let shout = quire_editor::Extension::behavior("shout").field(COMMANDS, Field::Static(commands));
	let mut list = extensions();
	list.push(shout);
	let mut editor = Editor::builder()
		.extensions(list)
		.content(sample())
		.build()
		.unwrap();

	assert_eq!(editor.commands().owner("insert_text"), Some("shout"));
	assert_eq!(
		editor.commands().collisions(),
		&[Collision {
			command: "insert_text".into(),
			winner: "shout".into(),
			loser: CORE_COMMANDS.into(),
		}]
	);

	assert!(editor.command("insert_text", json!("hey ")).unwrap());
	assert_eq!(editor.get_html(), "<p>HEY hello world</p>");
}

#[test]
fn test_nested_command_call() {
	let mut commands = CommandMap::new();
	commands.insert(
		"bold_all".into(),
		command(|props, _| {
			let size = props.tr.doc().content_size(props.tr.model());
			props.call("set_text_selection", &json!({ "from": 1, "to": size - 1 }))?;
			props.call("set_mark", &json!("bold"))
		}),
	);
	let mut list = extensions();
	list.push(quire_editor::Extension::behavior("bold_all").field(COMMANDS, Field::Static(commands)));
	let mut editor = Editor::builder()
		.extensions(list)
		.content(sample())
		.build()
		.unwrap();

	assert!(editor.command("bold_all", Value::Null).unwrap());
	assert_eq!(editor.get_html(), "<p><strong>hello world</strong></p>");
}

#[test]
fn test_core_extensions_disabled() {
	let config = EditorConfig {
		enable_core_extensions: false,
		..EditorConfig::default()
	};
	let mut editor = Editor::builder()
		.extensions(extensions())
		.config(config)
		.build()
		.unwrap();

	assert!(editor.commands().is_empty());
	let err = editor.command("insert_text", json!("x")).unwrap_err();
	assert!(matches!(err, EditorError::Command(CommandError::UnknownCommand(_))));
}

#[test]
fn test_inline_command() {
	let mut editor = editor();
	let applied = editor
		.chain()
		.with(|props| {
			props.tr.insert_text(12, "!")?;
			Ok(true)
		})
		.run()
		.unwrap();

	assert!(applied);
	assert_eq!(editor.get_html(), "<p>hello world!</p>");
}

fn with_mention() -> Editor {
	let mention = quire_editor::Extension::node("mention")
		.field(CONTENT, Field::Static("text*".into()))
		.field(GROUP, Field::Static("inline".into()))
		.field(INLINE, Field::Static(true));
	let mut list = extensions();
	list.push(mention);
	Editor::builder()
		.extensions(list)
		.content(json!({
			"type": "doc",
			"content": [{
				"type": "paragraph",
				"content": [
					{ "type": "text", "text": "ab" },
					{ "type": "mention", "content": [{ "type": "text", "text": "x" }] },
					{ "type": "text", "text": "cd" }
				]
			}]
		}))
		.build()
		.unwrap()
}

#[test]
fn test_insert_next_to_inline_node_with_content() {
	let mut editor = with_mention();
	select(&mut editor, 7, 7);

	assert!(editor.command("insert_text", json!("Z")).unwrap());
	assert_eq!(editor.get_html(), "<p>ab<mention>x</mention>cZd</p>");
	assert_eq!(editor.state().selection().head, 8);
}

#[test]
fn test_insert_inside_inline_node_fails() {
	let mut editor = with_mention();
	select(&mut editor, 4, 4);

	let err = editor.command("insert_text", json!("Z")).unwrap_err();
	assert!(matches!(
		err,
		EditorError::Command(CommandError::Step(StepError::InvalidRange { from: 4, to: 4 }))
	));
	assert_eq!(editor.get_html(), "<p>ab<mention>x</mention>cd</p>");
}

#[test]
fn test_toggle_mark_across_inline_node() {
	let mut editor = with_mention();
	select(&mut editor, 1, 8);

	assert!(editor.command("toggle_mark", json!("bold")).unwrap());
	assert_eq!(
		editor.get_html(),
		"<p><strong>ab</strong><mention>x</mention><strong>cd</strong></p>"
	);
}
