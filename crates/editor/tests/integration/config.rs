use pretty_assertions::assert_eq;
use quire_editor::{ConfigError, Editor, EditorError, load_config};
use serde_json::json;

use crate::common::{extensions, init_tracing, italic, sample};

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("quire.toml");
	std::fs::write(&path, contents).unwrap();
	(dir, path)
}

#[test]
fn test_editor_from_config_file() {
	init_tracing();
	let (_dir, path) = write_config(
		r#"
disabled = ["bold"]

[[specialize]]
name = "emphasis"
extends = "italic"
priority = 200
"#,
	);
	let config = load_config(&path).unwrap();

	let mut list = extensions();
	list.push(italic());
	let mut editor = Editor::builder()
		.extensions(list)
		.content(sample())
		.config(config)
		.build()
		.unwrap();

	let marks: Vec<_> = editor.schema().mark_types().map(|m| m.name().to_string()).collect();
	assert_eq!(marks, vec!["emphasis", "italic"]);
	assert!(editor.warnings().is_empty());

	editor
		.command("set_text_selection", json!({ "from": 1, "to": 6 }))
		.unwrap();
	editor.command("toggle_mark", json!("emphasis")).unwrap();
	assert_eq!(editor.get_html(), "<p><em>hello</em> world</p>");
}

#[test]
fn test_specialization_cycle_fails_build() {
	let (_dir, path) = write_config(
		r#"
[[specialize]]
name = "loud"
extends = "louder"

[[specialize]]
name = "louder"
extends = "loud"
"#,
	);
	let config = load_config(&path).unwrap();
	let result = Editor::builder().extensions(extensions()).config(config).build();

	assert!(matches!(
		result,
		Err(EditorError::Config(ConfigError::ParentCycle { ref path })) if path == "loud -> louder -> loud"
	));
}

#[test]
fn test_malformed_config_file() {
	let (_dir, path) = write_config("disabled = [");
	assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
}
