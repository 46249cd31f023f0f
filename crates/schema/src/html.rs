//! HTML serialization through render rules.

use quire_primitives::Node;
use serde_json::Value;
use tracing::warn;

use crate::render::DomOutputSpec;
use crate::schema::Schema;

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "col", "wbr"];

impl Schema {
	/// Serializes a node to HTML. The top node serializes as its content.
	pub fn to_html(&self, node: &Node) -> String {
		let mut out = String::new();
		if node.type_name == self.top_node().name() {
			for child in &node.content {
				self.write_node(child, &mut out);
			}
		} else {
			self.write_node(node, &mut out);
		}
		out
	}

	fn write_node(&self, node: &Node, out: &mut String) {
		let mut html = String::new();
		if let Some(text) = &node.text {
			escape_into(text, false, &mut html);
		} else if let Some(spec) = self.render_node(node) {
			write_spec(
				&spec,
				&mut |out: &mut String| {
					for child in &node.content {
						self.write_node(child, out);
					}
				},
				&mut html,
			);
		} else {
			warn!(type_name = %node.type_name, "skipping node of unknown type");
			return;
		}

		for mark in node.marks.iter().rev() {
			let Some(spec) = self.render_mark(mark) else {
				warn!(type_name = %mark.type_name, "skipping mark of unknown type");
				continue;
			};
			let mut wrapped = String::new();
			write_spec(&spec, &mut |out: &mut String| out.push_str(&html), &mut wrapped);
			html = wrapped;
		}
		out.push_str(&html);
	}
}

fn write_spec(spec: &DomOutputSpec, hole: &mut dyn FnMut(&mut String), out: &mut String) {
	match spec {
		DomOutputSpec::Text(text) => escape_into(text, false, out),
		DomOutputSpec::Hole => hole(out),
		DomOutputSpec::Element {
			tag,
			attrs,
			children,
		} => {
			out.push('<');
			out.push_str(tag);
			for (name, value) in attrs {
				match value {
					Value::Null | Value::Bool(false) => {}
					Value::Bool(true) => {
						out.push(' ');
						out.push_str(name);
					}
					Value::String(s) => write_attr(name, s, out),
					other => write_attr(name, &other.to_string(), out),
				}
			}
			out.push('>');
			if children.is_empty() && VOID_ELEMENTS.contains(&tag.as_str()) {
				return;
			}
			for child in children {
				write_spec(child, hole, out);
			}
			out.push_str("</");
			out.push_str(tag);
			out.push('>');
		}
	}
}

fn write_attr(name: &str, value: &str, out: &mut String) {
	out.push(' ');
	out.push_str(name);
	out.push_str("=\"");
	escape_into(value, true, out);
	out.push('"');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' if attribute => out.push_str("&quot;"),
			c => out.push(c),
		}
	}
}
