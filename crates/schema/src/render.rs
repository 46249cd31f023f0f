//! HTML attribute computation and render output specs.

use std::sync::Arc;

use quire_primitives::Attrs;
use serde_json::Value;

use crate::attribute::ExtensionAttribute;

/// Renders a node or mark instance.
pub type RenderFn = Arc<dyn Fn(&RenderContext<'_>) -> DomOutputSpec + Send + Sync>;

/// Input of a [`RenderFn`].
#[derive(Debug)]
pub struct RenderContext<'a> {
	/// Type being rendered.
	pub type_name: &'a str,
	/// Instance attributes, defaults filled in.
	pub attrs: &'a Attrs,
	/// HTML attributes computed from the type's rendered attributes.
	pub html_attributes: &'a Attrs,
	/// Effective options of the type's extension.
	pub options: &'a Value,
}

/// Description of rendered DOM.
#[derive(Debug, Clone, PartialEq)]
pub enum DomOutputSpec {
	/// A text node.
	Text(String),
	/// An element with attributes and children.
	Element {
		tag: String,
		attrs: Attrs,
		children: Vec<DomOutputSpec>,
	},
	/// Where the instance's content goes.
	Hole,
}

impl DomOutputSpec {
	/// An element without attributes or children.
	pub fn element(tag: impl Into<String>) -> Self {
		Self::Element {
			tag: tag.into(),
			attrs: Attrs::new(),
			children: Vec::new(),
		}
	}

	/// `<tag ...attrs>` wrapping the content hole.
	pub fn wrap(tag: impl Into<String>, attrs: Attrs) -> Self {
		Self::element(tag).with_attrs(attrs).child(Self::Hole)
	}

	/// Replaces the attributes of an element.
	pub fn with_attrs(mut self, new_attrs: Attrs) -> Self {
		if let Self::Element { attrs, .. } = &mut self {
			*attrs = new_attrs;
		}
		self
	}

	/// Appends a child to an element.
	pub fn child(mut self, child: DomOutputSpec) -> Self {
		if let Self::Element { children, .. } = &mut self {
			children.push(child);
		}
		self
	}

	/// Returns true if the spec contains a content hole.
	pub fn has_hole(&self) -> bool {
		match self {
			Self::Hole => true,
			Self::Text(_) => false,
			Self::Element { children, .. } => children.iter().any(Self::has_hole),
		}
	}
}

/// Merges HTML attribute objects left to right.
///
/// `class` values are split on whitespace and deduplicated keeping the first
/// occurrence. Non-empty `style` values are joined with `"; "`. Any other key
/// takes the last value, `null` included.
pub fn merge_attributes<'a>(objects: impl IntoIterator<Item = &'a Attrs>) -> Attrs {
	let mut merged = Attrs::new();
	for object in objects {
		for (key, value) in object {
			match (key.as_str(), merged.get(key), value) {
				("class", existing, Value::String(incoming)) => {
					let existing = existing.and_then(Value::as_str).unwrap_or_default();
					let mut classes: Vec<&str> = Vec::new();
					for class in existing.split_whitespace().chain(incoming.split_whitespace()) {
						if !classes.contains(&class) {
							classes.push(class);
						}
					}
					let joined = classes.join(" ");
					merged.insert(key.clone(), Value::String(joined));
				}
				("style", Some(Value::String(existing)), Value::String(incoming)) => {
					let joined = [existing.as_str(), incoming.as_str()]
						.iter()
						.map(|s| s.trim().trim_end_matches(';').trim())
						.filter(|s| !s.is_empty())
						.collect::<Vec<_>>()
						.join("; ");
					merged.insert(key.clone(), Value::String(joined));
				}
				_ => {
					merged.insert(key.clone(), value.clone());
				}
			}
		}
	}
	merged
}

/// Computes the HTML attributes of an instance of `type_name`.
///
/// Only the type's rendered attributes contribute. An attribute without a
/// renderer yields `{name: value}` (`null` when unset); a renderer returning
/// `None` contributes nothing.
pub fn render_attributes(type_name: &str, attrs: &Attrs, attributes: &[ExtensionAttribute]) -> Attrs {
	let parts: Vec<Attrs> = attributes
		.iter()
		.filter(|e| e.type_name == type_name && e.attribute.rendered)
		.map(|e| match &e.attribute.render_html {
			Some(render) => render(attrs).unwrap_or_default(),
			None => {
				let value = attrs.get(&e.name).cloned().unwrap_or(Value::Null);
				Attrs::from_iter([(e.name.clone(), value)])
			}
		})
		.collect();
	merge_attributes(&parts)
}
