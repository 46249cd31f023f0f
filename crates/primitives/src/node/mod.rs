use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
mod tests;

/// Attribute object of a node or mark, in insertion order.
pub type Attrs = serde_json::Map<String, Value>;

/// A mark applied to inline content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
	/// Name of the mark type.
	#[serde(rename = "type")]
	pub type_name: String,
	/// Attribute values of this mark instance.
	#[serde(default, skip_serializing_if = "Attrs::is_empty")]
	pub attrs: Attrs,
}

impl Mark {
	/// Creates a mark without attributes.
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			attrs: Attrs::new(),
		}
	}

	/// Sets an attribute value.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}
}

/// A node in the document tree.
///
/// This is the exchange shape used at the kernel boundary:
/// `{ type, attrs?, content?, text?, marks? }`, recursively. Empty optional
/// parts are omitted when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Name of the node type.
	#[serde(rename = "type")]
	pub type_name: String,
	/// Attribute values of this node instance.
	#[serde(default, skip_serializing_if = "Attrs::is_empty")]
	pub attrs: Attrs,
	/// Child nodes.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub content: Vec<Node>,
	/// Text of a text node.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	/// Marks applied to an inline node.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub marks: Vec<Mark>,
}

/// Type name used for text nodes.
pub const TEXT_TYPE: &str = "text";

impl Node {
	/// Creates an empty node of the given type.
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			attrs: Attrs::new(),
			content: Vec::new(),
			text: None,
			marks: Vec::new(),
		}
	}

	/// Creates a text node.
	pub fn text(text: impl Into<String>) -> Self {
		Self {
			text: Some(text.into()),
			..Self::new(TEXT_TYPE)
		}
	}

	/// Creates a node with the given children.
	pub fn with_content(type_name: impl Into<String>, content: Vec<Node>) -> Self {
		Self {
			content,
			..Self::new(type_name)
		}
	}

	/// Sets an attribute value.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	/// Replaces the marks of this node.
	pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
		self.marks = marks;
		self
	}

	/// Returns true for text nodes.
	pub fn is_text(&self) -> bool {
		self.text.is_some()
	}

	/// Returns true if the node is text or a leaf.
	pub fn is_inline(&self, model: &dyn NodeModel) -> bool {
		self.is_text() || model.is_leaf(&self.type_name)
	}

	/// Returns the number of characters of a text node, 0 otherwise.
	pub fn text_len(&self) -> usize {
		self.text.as_deref().map_or(0, |t| t.chars().count())
	}

	/// Size of this node in the position model.
	///
	/// Text counts its characters, leaves count 1, every other node counts
	/// its content plus an opening and a closing token.
	pub fn node_size(&self, model: &dyn NodeModel) -> usize {
		if self.is_text() {
			self.text_len()
		} else if model.is_leaf(&self.type_name) {
			1
		} else {
			self.content_size(model) + 2
		}
	}

	/// Sum of the sizes of the children.
	pub fn content_size(&self, model: &dyn NodeModel) -> usize {
		self.content.iter().map(|c| c.node_size(model)).sum()
	}

	/// Concatenated text of all descendant text nodes.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		self.collect_text(&mut out);
		out
	}

	fn collect_text(&self, out: &mut String) {
		if let Some(text) = &self.text {
			out.push_str(text);
		}
		for child in &self.content {
			child.collect_text(out);
		}
	}

	/// Returns true if any mark of the given type is present.
	pub fn has_mark(&self, type_name: &str) -> bool {
		self.marks.iter().any(|m| m.type_name == type_name)
	}

	/// Calls `f` for every descendant overlapping `from..to`, with the
	/// position before it.
	///
	/// Returning `false` from `f` skips the node's children.
	pub fn nodes_between(
		&self,
		from: usize,
		to: usize,
		model: &dyn NodeModel,
		f: &mut dyn FnMut(&Node, usize) -> bool,
	) {
		self.walk_between(0, from, to, model, f);
	}

	fn walk_between(
		&self,
		base: usize,
		from: usize,
		to: usize,
		model: &dyn NodeModel,
		f: &mut dyn FnMut(&Node, usize) -> bool,
	) {
		let mut pos = base;
		for child in &self.content {
			if pos >= to {
				break;
			}
			let end = pos + child.node_size(model);
			if end > from && f(child, pos) && !child.content.is_empty() {
				child.walk_between(pos + 1, from, to, model, f);
			}
			pos = end;
		}
	}

	/// Collects the names of every node and mark type used in this tree.
	pub fn type_names(&self) -> (HashSet<String>, HashSet<String>) {
		let mut nodes = HashSet::default();
		let mut marks = HashSet::default();
		self.collect_types(&mut nodes, &mut marks);
		(nodes, marks)
	}

	fn collect_types(&self, nodes: &mut HashSet<String>, marks: &mut HashSet<String>) {
		nodes.insert(self.type_name.clone());
		for mark in &self.marks {
			marks.insert(mark.type_name.clone());
		}
		for child in &self.content {
			child.collect_types(nodes, marks);
		}
	}
}

/// Structural knowledge about node types that the position model needs.
///
/// A synthesized schema implements this; [`StructuralModel`] is a
/// schema-free fallback.
pub trait NodeModel: Send + Sync {
	/// Returns true if nodes of this type never have content.
	fn is_leaf(&self, type_name: &str) -> bool;

	/// Returns true if the node holds inline content directly.
	fn is_textblock(&self, node: &Node) -> bool {
		!node.is_text()
			&& !self.is_leaf(&node.type_name)
			&& node.content.iter().all(|c| c.is_text() || self.is_leaf(&c.type_name))
	}
}

/// Schema-free [`NodeModel`] with an explicit set of leaf types.
#[derive(Debug, Clone, Default)]
pub struct StructuralModel {
	leaves: HashSet<String>,
}

impl StructuralModel {
	/// Creates a model where only the listed types are leaves.
	pub fn with_leaves<I, S>(leaves: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			leaves: leaves.into_iter().map(Into::into).collect(),
		}
	}
}

impl NodeModel for StructuralModel {
	fn is_leaf(&self, type_name: &str) -> bool {
		self.leaves.contains(type_name)
	}
}
