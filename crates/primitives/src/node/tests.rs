use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn doc() -> Node {
	Node::with_content(
		"doc",
		vec![
			Node::with_content("paragraph", vec![Node::text("hello")]),
			Node::with_content(
				"paragraph",
				vec![
					Node::text("wo"),
					Node::new("hard_break"),
					Node::text("rld").with_marks(vec![Mark::new("bold")]),
				],
			),
		],
	)
}

fn model() -> StructuralModel {
	StructuralModel::with_leaves(["hard_break"])
}

#[test]
fn test_exchange_shape_deserializes() {
	let value = json!({
		"type": "doc",
		"content": [{
			"type": "heading",
			"attrs": { "level": 2 },
			"content": [{ "type": "text", "text": "Hi", "marks": [{ "type": "bold" }] }]
		}]
	});
	let node: Node = serde_json::from_value(value.clone()).unwrap();
	assert_eq!(node.content[0].attrs.get("level"), Some(&json!(2)));
	assert!(node.content[0].content[0].has_mark("bold"));
	assert_eq!(serde_json::to_value(&node).unwrap(), value);
}

#[test]
fn test_empty_parts_are_omitted() {
	let value = serde_json::to_value(Node::new("paragraph")).unwrap();
	assert_eq!(value, json!({ "type": "paragraph" }));
}

#[test]
fn test_sizes() {
	let doc = doc();
	let model = model();
	assert_eq!(doc.content[0].node_size(&model), 7);
	assert_eq!(doc.content[1].node_size(&model), 8);
	assert_eq!(doc.content_size(&model), 15);
	assert_eq!(Node::new("hard_break").node_size(&model), 1);
}

#[test]
fn test_text_content() {
	assert_eq!(doc().text_content(), "helloworld");
}

#[test]
fn test_nodes_between_visits_overlapping_nodes() {
	let doc = doc();
	let mut seen = Vec::new();
	doc.nodes_between(2, 9, &model(), &mut |node, pos| {
		seen.push((node.type_name.clone(), pos));
		true
	});
	assert_eq!(
		seen,
		vec![
			("paragraph".to_string(), 0),
			("text".to_string(), 1),
			("paragraph".to_string(), 7),
			("text".to_string(), 8),
		]
	);
}

#[test]
fn test_nodes_between_can_skip_children() {
	let doc = doc();
	let mut seen = Vec::new();
	doc.nodes_between(0, 15, &model(), &mut |node, _| {
		seen.push(node.type_name.clone());
		false
	});
	assert_eq!(seen, vec!["paragraph", "paragraph"]);
}

#[test]
fn test_textblock_detection() {
	let model = model();
	let doc = doc();
	assert!(!model.is_textblock(&doc));
	assert!(model.is_textblock(&doc.content[1]));
	assert!(model.is_textblock(&Node::new("paragraph")));
}

#[test]
fn test_type_names() {
	let (nodes, marks) = doc().type_names();
	assert!(nodes.contains("hard_break"));
	assert!(marks.contains("bold"));
	assert_eq!(nodes.len(), 4);
}
