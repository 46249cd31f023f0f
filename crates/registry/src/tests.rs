use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{Value, json};

use crate::fields::{EXTENSIONS, OPTIONS, STORAGE};
use crate::{
	Extension, ExtensionGraph, ExtensionKind, ExtensionStorage, Field, FieldKey, RegistryError,
	dedup, flatten, sort_by_priority,
};

const LABEL: FieldKey<String> = FieldKey::new("label");
const DEPTH: FieldKey<u32> = FieldKey::new("depth");

fn names(extensions: &[Extension]) -> Vec<&str> {
	extensions.iter().map(Extension::name).collect()
}

fn kit(name: &str, nested: Vec<Extension>) -> Extension {
	Extension::behavior(name).field(EXTENSIONS, Field::Static(nested))
}

/// A field defined only on the root of a three-link chain resolves on the leaf.
#[test]
fn test_resolve_through_grandparent() {
	let root = Extension::node("paragraph").field(LABEL, Field::Static("v".into()));
	let leaf = root.extend().extend();

	assert_eq!(leaf.chain().len(), 3);
	assert_eq!(leaf.chain().resolve(LABEL, &json!({})).as_deref(), Some("v"));
}

/// The most specialized definition wins and the root is never consulted.
#[test]
fn test_resolve_first_definition_wins() {
	let root = Extension::node("heading").field(LABEL, Field::Static("root".into()));
	let mid = root.extend().field(LABEL, Field::Static("mid".into()));
	let leaf = mid.extend();

	assert_eq!(leaf.chain().resolve(LABEL, &json!({})).as_deref(), Some("mid"));
}

#[test]
fn test_resolve_missing_field() {
	let ext = Extension::mark("bold");
	assert_eq!(ext.chain().resolve(LABEL, &json!({})), None);
}

/// A computed field sees the value its parent would have produced.
#[test]
fn test_computed_field_sees_parent() {
	let root = Extension::node("list").field(DEPTH, Field::Static(1));
	let mid = root.extend().computed(DEPTH, |cx| cx.parent.unwrap_or(0) + 10);
	let leaf = mid.extend().computed(DEPTH, |cx| cx.parent.unwrap_or(0) * 2);

	assert_eq!(leaf.chain().resolve(DEPTH, &json!({})), Some(22));
	assert_eq!(mid.chain().resolve(DEPTH, &json!({})), Some(11));
}

#[test]
fn test_computed_field_reads_options_and_name() {
	let ext = Extension::node("heading")
		.field(OPTIONS, Field::Static(json!({ "prefix": "h" })))
		.computed(LABEL, |cx| {
			let prefix = cx.option("prefix").and_then(Value::as_str).unwrap_or("?");
			format!("{prefix}:{}", cx.name)
		});
	let chain = ext.chain();
	let options = chain.options();

	assert_eq!(chain.resolve(LABEL, &options).as_deref(), Some("h:heading"));
}

/// A field declared with one type and read with another is treated as undefined.
#[test]
fn test_type_mismatch_is_undefined() {
	const AS_STRING: FieldKey<String> = FieldKey::new("depth");
	let ext = Extension::node("list").field(DEPTH, Field::Static(3));
	assert_eq!(ext.chain().resolve(AS_STRING, &json!({})), None);
}

#[test]
fn test_configure_merges_options() {
	let base = Extension::node("heading").field(
		OPTIONS,
		Field::Static(json!({ "levels": [1, 2, 3], "html": { "class": "h" } })),
	);
	let configured = base
		.configure(json!({ "levels": [1, 2] }))
		.configure(json!({ "html": { "id": "x" } }));

	assert_eq!(
		configured.chain().options(),
		json!({ "levels": [1, 2], "html": { "class": "h", "id": "x" } })
	);
	assert!(configured.specializes(&base));
	assert_ne!(configured.id(), base.id());
}

#[test]
fn test_options_default_to_empty_object() {
	assert_eq!(Extension::behavior("history").chain().options(), json!({}));
}

#[test]
fn test_flatten_expands_in_place() {
	let list = vec![
		Extension::node("doc"),
		kit(
			"starter",
			vec![Extension::node("paragraph"), kit("marks", vec![Extension::mark("bold")])],
		),
		Extension::node("text"),
	];

	let flat = flatten(&list).unwrap();
	assert_eq!(names(&flat), vec!["doc", "starter", "paragraph", "marks", "bold", "text"]);
}

#[test]
fn test_flatten_is_idempotent_on_leaves() {
	let list = vec![
		kit("starter", vec![Extension::node("paragraph"), Extension::mark("bold")]),
		Extension::node("text"),
	];
	let once = flatten(&list).unwrap();
	let leaves: Vec<_> = once.into_iter().filter(|e| e.kind() != ExtensionKind::Behavior).collect();
	let twice = flatten(&leaves).unwrap();

	assert_eq!(names(&leaves), names(&twice));
}

#[test]
fn test_flatten_detects_nesting_cycle() {
	let inner = kit("outer", vec![]);
	let list = vec![kit("outer", vec![kit("middle", vec![inner])])];

	assert_eq!(
		flatten(&list).unwrap_err(),
		RegistryError::NestingCycle {
			path: "outer -> middle -> outer".into()
		}
	);
}

#[test]
fn test_flatten_allows_repeated_siblings() {
	let bold = Extension::mark("bold");
	let list = vec![kit("a", vec![bold.clone()]), kit("b", vec![bold])];
	assert_eq!(names(&flatten(&list).unwrap()), vec!["a", "bold", "b", "bold"]);
}

#[test]
fn test_flatten_rejects_empty_name() {
	assert_eq!(flatten(&[Extension::node("")]).unwrap_err(), RegistryError::EmptyName);
}

#[test]
fn test_nested_extensions_can_depend_on_options() {
	let kit = Extension::behavior("starter")
		.field(OPTIONS, Field::Static(json!({ "bold": true })))
		.computed(EXTENSIONS, |cx| {
			let mut out = vec![Extension::node("paragraph")];
			if cx.option("bold") == Some(&Value::Bool(true)) {
				out.push(Extension::mark("bold"));
			}
			out
		});

	let enabled = flatten(std::slice::from_ref(&kit)).unwrap();
	let disabled = flatten(&[kit.configure(json!({ "bold": false }))]).unwrap();

	assert_eq!(names(&enabled), vec!["starter", "paragraph", "bold"]);
	assert_eq!(names(&disabled), vec!["starter", "paragraph"]);
}

#[test]
fn test_flatten_with_drops_and_replaces() {
	let list = vec![
		kit("starter", vec![Extension::node("paragraph"), Extension::mark("bold")]),
		kit("tables", vec![Extension::node("table")]),
	];
	let flat = crate::flatten_with(&list, &mut |ext: &Extension| match ext.name() {
		"tables" => None,
		"bold" => Some(ext.configure(json!({ "strong": true }))),
		_ => Some(ext.clone()),
	})
	.unwrap();

	assert_eq!(names(&flat), vec!["starter", "paragraph", "bold"]);
	assert_eq!(flat[2].chain().options(), json!({ "strong": true }));
}

#[test]
fn test_sort_is_stable_descending() {
	let list = vec![
		Extension::node("a").with_priority(10),
		Extension::node("b").with_priority(50),
		Extension::node("c").with_priority(10),
		Extension::node("d").with_priority(50),
	];
	assert_eq!(names(&sort_by_priority(list)), vec!["b", "d", "a", "c"]);
}

#[test]
fn test_dedup_same_descriptor_twice() {
	let bold = Extension::mark("bold");
	let out = dedup(vec![bold.clone(), Extension::mark("italic"), bold]).unwrap();
	assert_eq!(names(&out), vec!["bold", "italic"]);
}

/// A low-priority specialization replaces its ancestor in the ancestor's slot.
#[test]
fn test_dedup_keeps_specialization_in_first_slot() {
	let bold = Extension::mark("bold").with_priority(200);
	let custom = bold.extend().with_priority(10);
	let sorted = sort_by_priority(vec![custom.clone(), Extension::mark("italic"), bold]);
	let out = dedup(sorted).unwrap();

	assert_eq!(names(&out), vec!["bold", "italic"]);
	assert_eq!(out[0].id(), custom.id());
}

#[rstest]
#[case::same_kind(Extension::mark("bold"), Extension::mark("bold"), ExtensionKind::Mark)]
#[case::cross_kind(Extension::node("bold"), Extension::mark("bold"), ExtensionKind::Mark)]
fn test_dedup_rejects_unrelated_duplicates(
	#[case] first: Extension,
	#[case] second: Extension,
	#[case] second_kind: ExtensionKind,
) {
	let first_kind = first.kind();
	assert_eq!(
		dedup(vec![first, second]).unwrap_err(),
		RegistryError::DuplicateName {
			name: "bold".into(),
			first: first_kind,
			second: second_kind,
		}
	);
}

#[test]
fn test_graph_build() {
	let bold = Extension::mark("bold");
	let list = vec![
		Extension::node("doc"),
		kit("starter", vec![Extension::node("paragraph"), bold.clone()]),
		bold.configure(json!({ "strong": true })),
	];
	let graph = ExtensionGraph::build(&list).unwrap();

	let order: Vec<_> = graph.iter().map(|e| e.name()).collect();
	assert_eq!(order, vec!["starter", "doc", "paragraph", "bold"]);
	assert_eq!(graph.of_kind(ExtensionKind::Node).count(), 2);
	assert_eq!(graph.get("bold").unwrap().options(), &json!({ "strong": true }));
	assert!(graph.get("missing").is_none());
}

#[test]
fn test_graph_resolves_with_effective_options() {
	let heading = Extension::node("heading")
		.field(OPTIONS, Field::Static(json!({ "level": 1 })))
		.computed(LABEL, |cx| format!("h{}", cx.option("level").unwrap_or(&Value::Null)));
	let graph = ExtensionGraph::build(&[heading.configure(json!({ "level": 3 }))]).unwrap();

	assert_eq!(graph.get("heading").unwrap().resolve(LABEL).as_deref(), Some("h3"));
}

#[test]
fn test_storage_init() {
	let list = vec![
		Extension::behavior("history").field(STORAGE, Field::Static(json!({ "depth": 0 }))),
		Extension::node("doc"),
	];
	let graph = ExtensionGraph::build(&list).unwrap();
	let mut storage = ExtensionStorage::init(&graph);

	assert_eq!(storage.len(), 1);
	assert!(storage.get("doc").is_none());
	storage.get_mut("history").unwrap()["depth"] = json!(2);
	assert_eq!(storage.get("history"), Some(&json!({ "depth": 2 })));
}

proptest! {
	/// Building twice from the same declaration list gives the same order.
	#[test]
	fn prop_graph_order_is_deterministic(priorities in prop::collection::vec(0i32..5, 1..20)) {
		let list: Vec<_> = priorities
			.iter()
			.enumerate()
			.map(|(i, p)| Extension::node(format!("n{i}")).with_priority(*p))
			.collect();
		let a: Vec<_> = ExtensionGraph::build(&list).unwrap().iter().map(|e| e.name().to_string()).collect();
		let b: Vec<_> = ExtensionGraph::build(&list).unwrap().iter().map(|e| e.name().to_string()).collect();
		prop_assert_eq!(&a, &b);

		let graph = ExtensionGraph::build(&list).unwrap();
		let sorted: Vec<_> = graph.iter().map(|e| e.priority()).collect();
		prop_assert!(sorted.windows(2).all(|w| w[0] >= w[1]));
	}
}
