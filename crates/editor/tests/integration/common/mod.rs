//! Common fixtures for editor integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use quire_editor::fields::{ON_CREATE, ON_DESTROY, ON_TRANSACTION, ON_UPDATE};
use quire_editor::{Editor, EditorView, Extension, HookContext, HookFn};
use quire_primitives::Attrs;
use quire_registry::Field;
use quire_registry::fields::STORAGE;
use quire_schema::fields::{ATTRIBUTES, CONTENT, GROUP, PARSE_HTML, RENDER_HTML};
use quire_schema::{Attribute, AttributeMap, DomOutputSpec, ParseRule, RenderContext, RenderFn};
use serde_json::{Value, json};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

fn render(tag: &'static str) -> RenderFn {
	Arc::new(move |cx: &RenderContext<'_>| DomOutputSpec::wrap(tag, cx.html_attributes.clone()))
}

pub fn doc() -> Extension {
	Extension::node("doc").field(CONTENT, Field::Static("block+".into()))
}

pub fn paragraph() -> Extension {
	let attributes: AttributeMap = [("align".to_string(), Attribute::new())].into_iter().collect();
	Extension::node("paragraph")
		.field(CONTENT, Field::Static("inline*".into()))
		.field(GROUP, Field::Static("block".into()))
		.field(ATTRIBUTES, Field::Static(attributes))
		.field(PARSE_HTML, Field::Static(vec![ParseRule::tag("p")]))
		.field(RENDER_HTML, Field::Static(render("p")))
}

pub fn text() -> Extension {
	Extension::node("text").field(GROUP, Field::Static("inline".into()))
}

pub fn bold() -> Extension {
	Extension::mark("bold").field(RENDER_HTML, Field::Static(render("strong")))
}

pub fn italic() -> Extension {
	Extension::mark("italic").field(RENDER_HTML, Field::Static(render("em")))
}

pub fn extensions() -> Vec<Extension> {
	vec![doc(), paragraph(), text(), bold()]
}

/// `<p>hello world</p>`: text positions 1..=12.
pub fn sample() -> Value {
	json!({
		"type": "doc",
		"content": [
			{ "type": "paragraph", "content": [{ "type": "text", "text": "hello world" }] }
		]
	})
}

pub fn editor() -> Editor {
	init_tracing();
	Editor::builder()
		.extensions(extensions())
		.content(sample())
		.build()
		.unwrap()
}

pub fn attrs(value: Value) -> Attrs {
	match value {
		Value::Object(map) => map,
		_ => Attrs::new(),
	}
}

fn hook(f: impl Fn(&mut HookContext<'_>) + Send + Sync + 'static) -> Field<HookFn> {
	Field::Static(Arc::new(f))
}

fn bump(storage: &mut Value, key: &str) {
	let count = storage[key].as_u64().unwrap_or(0);
	storage[key] = json!(count + 1);
}

/// Behavior counting lifecycle events in its storage.
pub fn counter() -> Extension {
	Extension::behavior("counter")
		.field(STORAGE, Field::Static(json!({ "created": 0, "updates": 0, "transactions": 0 })))
		.field(ON_CREATE, hook(|cx| bump(cx.storage, "created")))
		.field(ON_UPDATE, hook(|cx| bump(cx.storage, "updates")))
		.field(
			ON_TRANSACTION,
			hook(|cx| {
				bump(cx.storage, "transactions");
				if let Some(tr) = cx.tr {
					cx.storage["last_steps"] = json!(tr.steps().len());
				}
			}),
		)
		.field(ON_DESTROY, hook(|cx| cx.storage["destroyed"] = json!(true)))
}

pub fn count(editor: &Editor, key: &str) -> u64 {
	editor
		.storage()
		.get("counter")
		.and_then(|s| s.get(key))
		.and_then(Value::as_u64)
		.unwrap_or(0)
}

/// View recording focus changes.
#[derive(Default)]
pub struct RecordingView {
	focused: AtomicBool,
	pub focus_calls: AtomicUsize,
	pub blur_calls: AtomicUsize,
}

impl EditorView for RecordingView {
	fn focus(&self) {
		self.focused.store(true, Ordering::SeqCst);
		self.focus_calls.fetch_add(1, Ordering::SeqCst);
	}

	fn blur(&self) {
		self.focused.store(false, Ordering::SeqCst);
		self.blur_calls.fetch_add(1, Ordering::SeqCst);
	}

	fn has_focus(&self) -> bool {
		self.focused.load(Ordering::SeqCst)
	}
}
