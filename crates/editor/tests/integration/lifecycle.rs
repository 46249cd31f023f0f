use std::sync::Arc;
use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;
use quire_editor::fields::PLUGINS;
use quire_editor::{Editor, EditorConfig, EditorError, EditorView, Extension, Plugin};
use quire_registry::Field;
use quire_schema::SchemaError;
use serde_json::{Value, json};

use crate::common::{RecordingView, count, counter, extensions, init_tracing, italic, sample};

fn with_counter() -> Editor {
	init_tracing();
	let mut list = extensions();
	list.push(counter());
	Editor::builder()
		.extensions(list)
		.content(sample())
		.build()
		.unwrap()
}

fn with_view(view: Arc<RecordingView>) -> Editor {
	Editor::builder()
		.extensions(extensions())
		.content(sample())
		.view(view)
		.build()
		.unwrap()
}

#[test]
fn test_hooks_track_events() {
	let mut editor = with_counter();
	assert_eq!(count(&editor, "created"), 1);

	editor
		.command("set_text_selection", json!({ "from": 2, "to": 4 }))
		.unwrap();
	assert_eq!(count(&editor, "transactions"), 1);
	assert_eq!(count(&editor, "updates"), 0);

	editor.command("insert_text", json!("x")).unwrap();
	assert_eq!(count(&editor, "transactions"), 2);
	assert_eq!(count(&editor, "updates"), 1);

	editor.destroy();
	assert_eq!(editor.storage().get("counter").unwrap()["destroyed"], json!(true));
	assert!(editor.is_destroyed());
	assert!(!editor.is_editable());
}

#[test]
fn test_commands_fail_after_destroy() {
	let mut editor = with_counter();
	editor.destroy();
	editor.destroy();

	assert!(matches!(
		editor.command("insert_text", json!("x")),
		Err(EditorError::Destroyed)
	));
	let tr = editor.state().tr();
	assert!(!editor.dispatch(tr));
}

#[test]
fn test_plugin_filters_transactions() {
	let blocker = Extension::behavior("read_only").field(
		PLUGINS,
		Field::Static(vec![Plugin::new("read_only").filter_transaction(|tr, _| {
			!tr.doc_changed() || tr.get_meta("force") == Some(&Value::Bool(true))
		})]),
	);
	let mut list = extensions();
	list.push(blocker);
	let mut editor = Editor::builder()
		.extensions(list)
		.content(sample())
		.build()
		.unwrap();

	assert!(editor.command("insert_text", json!("x")).unwrap());
	assert_eq!(editor.get_html(), "<p>hello world</p>");

	assert!(
		editor
			.chain()
			.command("set_meta", json!({ "key": "force" }))
			.command("insert_text", json!("x"))
			.run()
			.unwrap()
	);
	assert_eq!(editor.get_html(), "<p>xhello world</p>");

	editor
		.command("set_text_selection", json!({ "from": 3, "to": 3 }))
		.unwrap();
	assert_eq!(editor.state().selection().head, 3);
}

#[test]
fn test_focus_runs_on_next_frame() {
	let view = Arc::new(RecordingView::default());
	let mut editor = with_view(view.clone());

	assert!(editor.command("focus", Value::Null).unwrap());
	assert!(!view.has_focus());
	assert_eq!(editor.scheduler().pending_count(), 1);

	assert_eq!(editor.run_frame(), 1);
	assert!(view.has_focus());

	assert!(editor.command("blur", Value::Null).unwrap());
	assert_eq!(editor.run_frame(), 1);
	assert!(!view.has_focus());
	assert_eq!(view.focus_calls.load(Ordering::SeqCst), 1);
	assert_eq!(view.blur_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dry_run_does_not_schedule() {
	let view = Arc::new(RecordingView::default());
	let mut editor = with_view(view.clone());

	assert!(editor.can().command("focus", Value::Null).run().unwrap());
	assert_eq!(editor.scheduler().pending_count(), 0);
	assert_eq!(editor.run_frame(), 0);
	assert_eq!(view.focus_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_focus_without_view() {
	let mut editor = with_counter();
	assert!(!editor.command("focus", Value::Null).unwrap());
	assert!(!editor.command("blur", Value::Null).unwrap());
}

#[test]
fn test_destroy_cancels_frame_tasks() {
	let view = Arc::new(RecordingView::default());
	let mut editor = with_view(view.clone());

	editor.command("focus", Value::Null).unwrap();
	editor.destroy();

	assert_eq!(editor.run_frame(), 0);
	assert_eq!(view.focus_calls.load(Ordering::SeqCst), 0);
	assert!(editor.scheduler().is_cancelled());
	assert_eq!(editor.scheduler().dropped_total(), 1);
}

#[test]
fn test_invalid_initial_content() {
	let invalid = Editor::builder()
		.extensions(extensions())
		.content(json!({ "type": "paragraph" }))
		.build();
	assert!(matches!(
		invalid,
		Err(EditorError::Schema(SchemaError::WrongTopNode { .. }))
	));

	let malformed = Editor::builder()
		.extensions(extensions())
		.content(json!({ "content": [] }))
		.build();
	assert!(matches!(malformed, Err(EditorError::Content(_))));
}

#[test]
fn test_get_json_round_trips_content() {
	let editor = with_counter();
	let json = editor.get_json().unwrap();

	assert_eq!(json["content"][0]["content"], sample()["content"][0]["content"]);
	assert_eq!(json["content"][0]["attrs"], json!({ "align": null }));
}

#[test]
fn test_reconfigure_swaps_runtime() {
	let mut editor = with_counter();
	editor.command("insert_text", json!("x")).unwrap();
	assert_eq!(count(&editor, "updates"), 1);
	assert!(editor.schema().mark_type("italic").is_none());

	let mut list = extensions();
	list.push(italic());
	list.push(counter());
	editor.reconfigure(list, EditorConfig::default()).unwrap();

	assert!(editor.schema().mark_type("italic").is_some());
	assert_eq!(editor.get_html(), "<p>xhello world</p>");
	assert_eq!(editor.state().selection().head, 2);
	assert_eq!(count(&editor, "created"), 1);
	assert_eq!(count(&editor, "updates"), 0);
	assert_eq!(editor.extensions().len(), 6);

	editor
		.command("set_text_selection", json!({ "from": 1, "to": 2 }))
		.unwrap();
	editor.command("toggle_mark", json!("italic")).unwrap();
	assert_eq!(editor.get_html(), "<p><em>x</em>hello world</p>");
}

#[test]
fn test_reconfigure_rejects_invalid_document() {
	let mut editor = with_counter();
	let narrow = vec![
		Extension::node("doc").field(
			quire_schema::fields::CONTENT,
			Field::Static("heading+".into()),
		),
		Extension::node("heading").field(quire_schema::fields::CONTENT, Field::Static("text*".into())),
		crate::common::text(),
	];

	let err = editor
		.reconfigure(narrow, EditorConfig::default())
		.unwrap_err();
	assert!(matches!(err, EditorError::Schema(_)));
	assert!(editor.schema().node_type("paragraph").is_some());
	assert_eq!(editor.get_html(), "<p>hello world</p>");
}

#[test]
fn test_config_applies_at_build() {
	let config = quire_editor::parse_config_str(
		r#"
editable = false
disabled = ["bold"]

[extensions.strike]
"#,
	)
	.unwrap();
	let editor = Editor::builder()
		.extensions(extensions())
		.content(sample())
		.config(config)
		.build()
		.unwrap();

	assert!(!editor.is_editable());
	assert!(editor.schema().mark_type("bold").is_none());
	assert_eq!(editor.warnings().len(), 1);
	assert_eq!(
		editor.warnings()[0].to_string(),
		"'strike' in [extensions] matches no extension and will be ignored"
	);
}
