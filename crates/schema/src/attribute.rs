//! Attribute declarations and their aggregation across extensions.

use std::sync::Arc;

use indexmap::IndexMap;
use quire_primitives::{Attrs, DomNode};
use quire_registry::{ExtensionGraph, ExtensionKind, Field, FieldContext};
use serde_json::Value;
use tracing::trace;

use crate::fields::{ATTRIBUTES, GLOBAL_ATTRIBUTES};

/// Renders an attribute from the instance's attributes to HTML attributes.
pub type AttrRenderFn = Arc<dyn Fn(&Attrs) -> Option<Attrs> + Send + Sync>;

/// Extracts an attribute value from a DOM element.
pub type AttrParseFn = Arc<dyn Fn(&dyn DomNode) -> Option<Value> + Send + Sync>;

/// Attributes declared by one type, in declaration order.
pub type AttributeMap = IndexMap<String, Attribute>;

/// Declaration of one attribute of a node or mark type.
#[derive(Clone)]
pub struct Attribute {
	/// Value used when an instance does not set the attribute.
	pub default: Value,
	/// Whether the attribute appears in rendered HTML.
	pub rendered: bool,
	/// Whether split-style commands copy the attribute to the new node.
	pub keep_on_split: bool,
	/// Custom HTML rendering.
	pub render_html: Option<AttrRenderFn>,
	/// Custom extraction from parsed HTML.
	pub parse_html: Option<AttrParseFn>,
}

impl Default for Attribute {
	fn default() -> Self {
		Self {
			default: Value::Null,
			rendered: true,
			keep_on_split: true,
			render_html: None,
			parse_html: None,
		}
	}
}

impl core::fmt::Debug for Attribute {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Attribute")
			.field("default", &self.default)
			.field("rendered", &self.rendered)
			.field("keep_on_split", &self.keep_on_split)
			.field("render_html", &self.render_html.is_some())
			.field("parse_html", &self.parse_html.is_some())
			.finish()
	}
}

impl Attribute {
	/// Attribute with a `null` default.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attribute with the given default.
	pub fn with_default(default: impl Into<Value>) -> Self {
		Self {
			default: default.into(),
			..Self::default()
		}
	}

	/// Excludes the attribute from rendered HTML.
	pub fn not_rendered(mut self) -> Self {
		self.rendered = false;
		self
	}

	/// Sets whether split-style commands keep the attribute.
	pub fn keep_on_split(mut self, keep: bool) -> Self {
		self.keep_on_split = keep;
		self
	}

	/// Sets the HTML renderer.
	pub fn render_with(mut self, f: impl Fn(&Attrs) -> Option<Attrs> + Send + Sync + 'static) -> Self {
		self.render_html = Some(Arc::new(f));
		self
	}

	/// Sets the HTML parser.
	pub fn parse_with(
		mut self,
		f: impl Fn(&dyn DomNode) -> Option<Value> + Send + Sync + 'static,
	) -> Self {
		self.parse_html = Some(Arc::new(f));
		self
	}
}

/// Attributes an extension adds to other types.
#[derive(Debug, Clone, Default)]
pub struct GlobalAttributes {
	/// Names of the node or mark types receiving the attributes.
	pub types: Vec<String>,
	/// The attributes.
	pub attributes: AttributeMap,
}

impl GlobalAttributes {
	/// Global attributes for the given types.
	pub fn new<I, S>(types: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			types: types.into_iter().map(Into::into).collect(),
			attributes: AttributeMap::new(),
		}
	}

	/// Adds an attribute.
	pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
		self.attributes.insert(name.into(), attribute);
		self
	}
}

/// Attributes field that adds `extra` to the parent's attributes.
///
/// Plain `Field::Static` attributes replace the inherited set; this keeps it.
pub fn inherit_attributes(extra: AttributeMap) -> Field<AttributeMap> {
	Field::computed(move |cx: &FieldContext<'_, AttributeMap>| {
		let mut attributes: AttributeMap = cx.parent.clone().unwrap_or_default();
		for (name, attribute) in &extra {
			attributes.insert(name.clone(), attribute.clone());
		}
		attributes
	})
}

/// One attribute bound to the type that owns it.
#[derive(Debug, Clone)]
pub struct ExtensionAttribute {
	/// Owning node or mark type.
	pub type_name: String,
	/// Attribute name.
	pub name: String,
	/// The declaration.
	pub attribute: Attribute,
}

/// Every attribute contributed by the extensions of a graph.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
	entries: Vec<ExtensionAttribute>,
}

impl AttributeRegistry {
	/// Collects global attributes from every extension, then each node and
	/// mark type's own attributes.
	///
	/// A later contribution for the same type and name replaces the earlier
	/// one and keeps its position.
	pub fn build(graph: &ExtensionGraph) -> Self {
		let mut registry = Self::default();

		for ext in graph.iter() {
			let Some(globals) = ext.resolve(GLOBAL_ATTRIBUTES) else {
				continue;
			};
			for global in globals {
				for type_name in &global.types {
					for (name, attribute) in &global.attributes {
						registry.insert(type_name, name, attribute.clone());
					}
				}
			}
		}

		for ext in graph.iter().filter(|e| e.kind() != ExtensionKind::Behavior) {
			let Some(attributes) = ext.resolve(ATTRIBUTES) else {
				continue;
			};
			for (name, attribute) in attributes {
				registry.insert(ext.name(), &name, attribute);
			}
		}

		registry
	}

	fn insert(&mut self, type_name: &str, name: &str, attribute: Attribute) {
		if let Some(existing) = self
			.entries
			.iter_mut()
			.find(|e| e.type_name == type_name && e.name == name)
		{
			trace!(type_name, name, "attribute replaced by later contribution");
			existing.attribute = attribute;
			return;
		}
		self.entries.push(ExtensionAttribute {
			type_name: type_name.to_string(),
			name: name.to_string(),
			attribute,
		});
	}

	/// All entries in contribution order.
	pub fn entries(&self) -> &[ExtensionAttribute] {
		&self.entries
	}

	/// Attributes of one type, in contribution order.
	pub fn for_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a ExtensionAttribute> {
		self.entries.iter().filter(move |e| e.type_name == type_name)
	}

	/// Default values of one type's attributes.
	pub fn defaults(&self, type_name: &str) -> Attrs {
		self.for_type(type_name)
			.map(|e| (e.name.clone(), e.attribute.default.clone()))
			.collect()
	}
}
