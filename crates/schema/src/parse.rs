//! Parse rules and their augmentation with extension attributes.

use std::sync::Arc;

use quire_primitives::{Attrs, DomNode};
use serde_json::Value;

use crate::attribute::ExtensionAttribute;

/// Attribute extraction of a tag rule; `None` rejects the element.
pub type TagAttrsFn = Arc<dyn Fn(&dyn DomNode) -> Option<Attrs> + Send + Sync>;

/// Attribute extraction of a style rule, given the property value.
pub type StyleAttrsFn = Arc<dyn Fn(&str) -> Option<Attrs> + Send + Sync>;

/// Priority of rules that do not set one.
pub const DEFAULT_PARSE_PRIORITY: i32 = 50;

/// What a parse rule matches.
#[derive(Clone)]
pub enum Matcher {
	/// Elements with this tag name.
	Tag {
		tag: String,
		get_attrs: Option<TagAttrsFn>,
	},
	/// An inline style property, optionally with a fixed value.
	Style {
		property: String,
		value: Option<String>,
		get_attrs: Option<StyleAttrsFn>,
	},
}

/// Rule recognizing a node or mark in DOM input.
#[derive(Clone)]
pub struct ParseRule {
	/// Higher priorities are tried first.
	pub priority: i32,
	/// What the rule matches.
	pub matcher: Matcher,
}

impl core::fmt::Debug for ParseRule {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		let mut s = f.debug_struct("ParseRule");
		s.field("priority", &self.priority);
		match &self.matcher {
			Matcher::Tag { tag, get_attrs } => {
				s.field("tag", tag).field("get_attrs", &get_attrs.is_some())
			}
			Matcher::Style {
				property,
				value,
				get_attrs,
			} => s
				.field("style", property)
				.field("value", value)
				.field("get_attrs", &get_attrs.is_some()),
		};
		s.finish()
	}
}

impl ParseRule {
	/// Matches elements by tag name.
	pub fn tag(tag: impl Into<String>) -> Self {
		Self {
			priority: DEFAULT_PARSE_PRIORITY,
			matcher: Matcher::Tag {
				tag: tag.into().to_ascii_lowercase(),
				get_attrs: None,
			},
		}
	}

	/// Matches a style property; `"font-style=italic"` also fixes the value.
	pub fn style(selector: &str) -> Self {
		let (property, value) = match selector.split_once('=') {
			Some((p, v)) => (p.trim().to_string(), Some(v.trim().to_string())),
			None => (selector.trim().to_string(), None),
		};
		Self {
			priority: DEFAULT_PARSE_PRIORITY,
			matcher: Matcher::Style {
				property,
				value,
				get_attrs: None,
			},
		}
	}

	/// Sets the priority.
	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	/// Sets attribute extraction for a tag rule. Ignored on style rules.
	pub fn tag_attrs(
		mut self,
		f: impl Fn(&dyn DomNode) -> Option<Attrs> + Send + Sync + 'static,
	) -> Self {
		if let Matcher::Tag { get_attrs, .. } = &mut self.matcher {
			*get_attrs = Some(Arc::new(f));
		}
		self
	}

	/// Sets attribute extraction for a style rule. Ignored on tag rules.
	pub fn style_attrs(mut self, f: impl Fn(&str) -> Option<Attrs> + Send + Sync + 'static) -> Self {
		if let Matcher::Style { get_attrs, .. } = &mut self.matcher {
			*get_attrs = Some(Arc::new(f));
		}
		self
	}

	/// Returns true for style rules.
	pub fn is_style(&self) -> bool {
		matches!(self.matcher, Matcher::Style { .. })
	}

	/// Attributes for `element`, or `None` if the rule does not match it.
	pub fn match_element(&self, element: &dyn DomNode) -> Option<Attrs> {
		let Matcher::Tag { tag, get_attrs } = &self.matcher else {
			return None;
		};
		if tag != element.tag_name() {
			return None;
		}
		match get_attrs {
			Some(f) => f(element),
			None => Some(Attrs::new()),
		}
	}

	/// Attributes for a style declaration, or `None` if the rule does not match it.
	pub fn match_style(&self, property: &str, value: &str) -> Option<Attrs> {
		let Matcher::Style {
			property: expected,
			value: fixed,
			get_attrs,
		} = &self.matcher
		else {
			return None;
		};
		if !expected.eq_ignore_ascii_case(property) {
			return None;
		}
		if fixed.as_deref().is_some_and(|v| v != value.trim()) {
			return None;
		}
		match get_attrs {
			Some(f) => f(value.trim()),
			None => Some(Attrs::new()),
		}
	}
}

/// Decodes a raw DOM attribute string: JSON if it parses, else the string.
pub fn decode_attribute_value(raw: &str) -> Value {
	serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Wraps a tag rule so the type's extension attributes are extracted too.
///
/// The rule's own extraction runs first and can reject the element. Each
/// attribute is then read through its `parse_html` or the generic decoder;
/// missing and `null` values are skipped, others overwrite the rule's own.
/// Style rules are returned unchanged.
pub fn inject_extension_attributes(rule: ParseRule, attributes: &[ExtensionAttribute]) -> ParseRule {
	let (tag, own) = match rule.matcher {
		Matcher::Tag { tag, get_attrs } => (tag, get_attrs),
		matcher @ Matcher::Style { .. } => {
			return ParseRule {
				priority: rule.priority,
				matcher,
			};
		}
	};
	if attributes.is_empty() {
		return ParseRule {
			priority: rule.priority,
			matcher: Matcher::Tag { tag, get_attrs: own },
		};
	}

	let attributes = attributes.to_vec();
	let wrapped: TagAttrsFn = Arc::new(move |element: &dyn DomNode| {
		let mut attrs = match &own {
			Some(f) => f(element)?,
			None => Attrs::new(),
		};
		for entry in &attributes {
			let value = match &entry.attribute.parse_html {
				Some(parse) => parse(element),
				None => element.attribute(&entry.name).map(decode_attribute_value),
			};
			match value {
				None | Some(Value::Null) => {}
				Some(value) => {
					attrs.insert(entry.name.clone(), value);
				}
			}
		}
		Some(attrs)
	});

	ParseRule {
		priority: rule.priority,
		matcher: Matcher::Tag {
			tag,
			get_attrs: Some(wrapped),
		},
	}
}
