//! Schema synthesis from an extension graph.

use indexmap::IndexMap;
use quire_primitives::{Attrs, DomNode, Mark, Node, NodeModel, TEXT_TYPE};
use quire_registry::{Extension, ExtensionGraph, ExtensionKind, ResolvedExtension};
use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;
use tracing::{debug, debug_span};

use crate::attribute::{AttributeRegistry, ExtensionAttribute};
use crate::content::ContentExpr;
use crate::error::SchemaError;
use crate::fields::{
	ATOM, CONTENT, EXCLUDES, GROUP, INCLUSIVE, INLINE, MARKS, PARSE_HTML, RENDER_HTML, SPANNING,
	TOP_NODE,
};
use crate::parse::{ParseRule, inject_extension_attributes};
use crate::render::{DomOutputSpec, RenderContext, RenderFn, render_attributes};

/// Set of mark types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkSet {
	/// Every mark.
	Any,
	/// No mark.
	Empty,
	/// The listed marks.
	Only(Vec<String>),
}

impl MarkSet {
	/// Returns true if `mark` is in the set.
	pub fn contains(&self, mark: &str) -> bool {
		match self {
			Self::Any => true,
			Self::Empty => false,
			Self::Only(names) => names.iter().any(|n| n == mark),
		}
	}
}

/// A synthesized node type.
#[derive(Clone)]
pub struct NodeType {
	name: String,
	content: Option<ContentExpr>,
	content_source: String,
	groups: Vec<String>,
	inline: bool,
	atom: bool,
	textblock: bool,
	marks: MarkSet,
	defaults: Attrs,
	options: Value,
	parse_rules: Vec<ParseRule>,
	render: Option<RenderFn>,
}

impl core::fmt::Debug for NodeType {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("NodeType")
			.field("name", &self.name)
			.field("content", &self.content_source)
			.field("groups", &self.groups)
			.field("inline", &self.inline)
			.field("atom", &self.atom)
			.field("marks", &self.marks)
			.field("defaults", &self.defaults)
			.field("parse_rules", &self.parse_rules.len())
			.field("render", &self.render.is_some())
			.finish()
	}
}

impl NodeType {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Content expression as declared.
	pub fn content_source(&self) -> &str {
		&self.content_source
	}

	/// Parsed content expression with groups expanded; `None` for leaves.
	pub fn content(&self) -> Option<&ContentExpr> {
		self.content.as_ref()
	}

	pub fn groups(&self) -> &[String] {
		&self.groups
	}

	pub fn is_inline(&self) -> bool {
		self.inline
	}

	pub fn is_atom(&self) -> bool {
		self.atom
	}

	pub fn is_leaf(&self) -> bool {
		self.content.is_none()
	}

	/// Returns true if the content expression only admits inline types.
	pub fn is_textblock(&self) -> bool {
		self.textblock
	}

	/// Marks allowed in this node's content.
	pub fn allowed_marks(&self) -> &MarkSet {
		&self.marks
	}

	/// Default attribute values.
	pub fn defaults(&self) -> &Attrs {
		&self.defaults
	}

	/// Effective options of the defining extension.
	pub fn options(&self) -> &Value {
		&self.options
	}

	/// Parse rules, extension attributes injected.
	pub fn parse_rules(&self) -> &[ParseRule] {
		&self.parse_rules
	}
}

/// A synthesized mark type.
#[derive(Clone)]
pub struct MarkType {
	name: String,
	groups: Vec<String>,
	inclusive: bool,
	excludes: MarkSet,
	spanning: bool,
	defaults: Attrs,
	options: Value,
	parse_rules: Vec<ParseRule>,
	render: Option<RenderFn>,
}

impl core::fmt::Debug for MarkType {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("MarkType")
			.field("name", &self.name)
			.field("groups", &self.groups)
			.field("inclusive", &self.inclusive)
			.field("excludes", &self.excludes)
			.field("spanning", &self.spanning)
			.field("defaults", &self.defaults)
			.field("parse_rules", &self.parse_rules.len())
			.field("render", &self.render.is_some())
			.finish()
	}
}

impl MarkType {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn groups(&self) -> &[String] {
		&self.groups
	}

	pub fn is_inclusive(&self) -> bool {
		self.inclusive
	}

	/// Marks this one cannot coexist with. Contains itself unless configured.
	pub fn excludes(&self) -> &MarkSet {
		&self.excludes
	}

	pub fn is_spanning(&self) -> bool {
		self.spanning
	}

	pub fn defaults(&self) -> &Attrs {
		&self.defaults
	}

	pub fn options(&self) -> &Value {
		&self.options
	}

	pub fn parse_rules(&self) -> &[ParseRule] {
		&self.parse_rules
	}
}

/// Result of matching DOM input against the schema's parse rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseMatch {
	/// Node or mark.
	pub kind: ExtensionKind,
	/// Matched type.
	pub type_name: String,
	/// Extracted attributes over the type's defaults.
	pub attrs: Attrs,
}

#[derive(Clone)]
struct RuleEntry {
	kind: ExtensionKind,
	type_name: String,
	rule: ParseRule,
}

/// Node and mark types synthesized from an extension graph.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Clone)]
pub struct Schema {
	nodes: IndexMap<String, NodeType>,
	marks: IndexMap<String, MarkType>,
	top: usize,
	attributes: AttributeRegistry,
	rules: Vec<RuleEntry>,
}

impl core::fmt::Debug for Schema {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Schema")
			.field("nodes", &self.nodes.keys().collect::<Vec<_>>())
			.field("marks", &self.marks.keys().collect::<Vec<_>>())
			.field("top_node", &self.top_node().name)
			.finish()
	}
}

/// Flattens, sorts and deduplicates `extensions`, then builds the schema.
pub fn synthesize(extensions: &[Extension]) -> Result<Schema, SchemaError> {
	let graph = ExtensionGraph::build(extensions)?;
	Schema::from_graph(&graph)
}

fn split_names(source: &str) -> Vec<String> {
	source.split_whitespace().map(str::to_string).collect()
}

fn groups_of<'a>(
	entries: impl Iterator<Item = (&'a str, &'a [String])>,
) -> HashMap<String, Vec<String>> {
	let mut groups: HashMap<String, Vec<String>> = HashMap::default();
	for (name, member_of) in entries {
		for group in member_of {
			groups.entry(group.clone()).or_default().push(name.to_string());
		}
	}
	groups
}

fn mark_set(
	owner: &str,
	field: &'static str,
	source: &str,
	marks: &[&ResolvedExtension],
	groups: &HashMap<String, Vec<String>>,
) -> Result<MarkSet, SchemaError> {
	match source.trim() {
		"_" => return Ok(MarkSet::Any),
		"" => return Ok(MarkSet::Empty),
		_ => {}
	}
	let mut names = Vec::new();
	for name in source.split_whitespace() {
		let members = if marks.iter().any(|m| m.name() == name) {
			vec![name.to_string()]
		} else if let Some(members) = groups.get(name) {
			members.clone()
		} else {
			return Err(SchemaError::UnknownMarkName {
				owner: owner.to_string(),
				field,
				name: name.to_string(),
			});
		};
		for member in members {
			if !names.contains(&member) {
				names.push(member);
			}
		}
	}
	Ok(MarkSet::Only(names))
}

impl Schema {
	/// Builds the schema from an already built graph.
	pub fn from_graph(graph: &ExtensionGraph) -> Result<Self, SchemaError> {
		let _span = debug_span!("synthesize", extensions = graph.len()).entered();

		let attributes = AttributeRegistry::build(graph);
		let node_exts: Vec<_> = graph.of_kind(ExtensionKind::Node).collect();
		let mark_exts: Vec<_> = graph.of_kind(ExtensionKind::Mark).collect();

		let node_groups: Vec<(String, Vec<String>)> = node_exts
			.iter()
			.map(|e| {
				let groups = e.resolve(GROUP).map(|g| split_names(&g)).unwrap_or_default();
				(e.name().to_string(), groups)
			})
			.collect();
		let group_map = groups_of(node_groups.iter().map(|(n, g)| (n.as_str(), g.as_slice())));

		let mark_groups: Vec<(String, Vec<String>)> = mark_exts
			.iter()
			.map(|e| {
				let groups = e.resolve(GROUP).map(|g| split_names(&g)).unwrap_or_default();
				(e.name().to_string(), groups)
			})
			.collect();
		let mark_group_map = groups_of(mark_groups.iter().map(|(n, g)| (n.as_str(), g.as_slice())));

		let is_node = |name: &str| node_exts.iter().any(|e| e.name() == name);
		let inline_types: Vec<&str> = node_exts
			.iter()
			.filter(|e| is_inline(e))
			.map(|e| e.name())
			.collect();

		let mut nodes = IndexMap::with_capacity(node_exts.len());
		for (ext, (_, groups)) in node_exts.iter().zip(node_groups) {
			let name = ext.name();
			let content_source = ext.resolve(CONTENT).unwrap_or_default();
			let content = ContentExpr::parse(&content_source)
				.map_err(|reason| SchemaError::InvalidContent {
					owner: name.to_string(),
					expr: content_source.clone(),
					reason,
				})?
				.map(|expr| expr.expand_groups(&is_node, &group_map))
				.transpose()
				.map_err(|unknown| SchemaError::UnknownContentType {
					owner: name.to_string(),
					name: unknown,
				})?;

			let referenced = content.as_ref().map(ContentExpr::names).unwrap_or_default();
			let has_inline = referenced.iter().any(|n| inline_types.contains(n));
			let textblock = has_inline && referenced.iter().all(|n| inline_types.contains(n));

			let atom = ext.resolve(ATOM).unwrap_or(content.is_none());
			let marks = match ext.resolve(MARKS) {
				Some(source) => mark_set(name, "marks", &source, &mark_exts, &mark_group_map)?,
				None if has_inline => MarkSet::Any,
				None => MarkSet::Empty,
			};

			nodes.insert(
				name.to_string(),
				NodeType {
					name: name.to_string(),
					content,
					content_source,
					groups,
					inline: is_inline(ext),
					atom,
					textblock,
					marks,
					defaults: attributes.defaults(name),
					options: ext.options().clone(),
					parse_rules: parse_rules(ext, &attributes),
					render: ext.resolve(RENDER_HTML),
				},
			);
		}

		let top = node_exts
			.iter()
			.position(|e| e.resolve(TOP_NODE).unwrap_or(false))
			.or_else(|| nodes.get_index_of("doc"))
			.ok_or(SchemaError::NoTopNode)?;

		let mut marks = IndexMap::with_capacity(mark_exts.len());
		for (ext, (_, groups)) in mark_exts.iter().zip(mark_groups) {
			let name = ext.name();
			let excludes = match ext.resolve(EXCLUDES) {
				Some(source) => mark_set(name, "excludes", &source, &mark_exts, &mark_group_map)?,
				None => MarkSet::Only(vec![name.to_string()]),
			};
			marks.insert(
				name.to_string(),
				MarkType {
					name: name.to_string(),
					groups,
					inclusive: ext.resolve(INCLUSIVE).unwrap_or(true),
					excludes,
					spanning: ext.resolve(SPANNING).unwrap_or(true),
					defaults: attributes.defaults(name),
					options: ext.options().clone(),
					parse_rules: parse_rules(ext, &attributes),
					render: ext.resolve(RENDER_HTML),
				},
			);
		}

		let mut rules: Vec<RuleEntry> = nodes
			.values()
			.flat_map(|t| t.parse_rules.iter().map(move |r| (ExtensionKind::Node, &t.name, r)))
			.chain(
				marks
					.values()
					.flat_map(|t| t.parse_rules.iter().map(move |r| (ExtensionKind::Mark, &t.name, r))),
			)
			.map(|(kind, type_name, rule)| RuleEntry {
				kind,
				type_name: type_name.clone(),
				rule: rule.clone(),
			})
			.collect();
		rules.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));

		debug!(
			nodes = nodes.len(),
			marks = marks.len(),
			attributes = attributes.entries().len(),
			parse_rules = rules.len(),
			"schema synthesized"
		);

		Ok(Self {
			nodes,
			marks,
			top,
			attributes,
			rules,
		})
	}

	/// Looks up a node type.
	pub fn node_type(&self, name: &str) -> Option<&NodeType> {
		self.nodes.get(name)
	}

	/// Looks up a mark type.
	pub fn mark_type(&self, name: &str) -> Option<&MarkType> {
		self.marks.get(name)
	}

	/// Node types in priority order.
	pub fn node_types(&self) -> impl Iterator<Item = &NodeType> {
		self.nodes.values()
	}

	/// Mark types in priority order.
	pub fn mark_types(&self) -> impl Iterator<Item = &MarkType> {
		self.marks.values()
	}

	/// The document root type.
	pub fn top_node(&self) -> &NodeType {
		&self.nodes[self.top]
	}

	/// Every attribute of every type.
	pub fn attributes(&self) -> &AttributeRegistry {
		&self.attributes
	}

	/// Extension attributes of one type.
	pub fn attributes_of(&self, type_name: &str) -> Vec<ExtensionAttribute> {
		self.attributes.for_type(type_name).cloned().collect()
	}

	/// Returns true if `mark` and `other` cannot be applied together.
	pub fn excludes(&self, mark: &str, other: &str) -> bool {
		let excludes = |a: &str, b: &str| self.marks.get(a).is_some_and(|m| m.excludes.contains(b));
		excludes(mark, other) || excludes(other, mark)
	}

	/// Fills missing attributes with type defaults, recursively.
	pub fn fill_defaults(&self, node: &mut Node) {
		if let Some(ty) = self.nodes.get(&node.type_name) {
			node.attrs = with_defaults(&ty.defaults, &node.attrs);
		}
		for mark in &mut node.marks {
			if let Some(ty) = self.marks.get(&mark.type_name) {
				mark.attrs = with_defaults(&ty.defaults, &mark.attrs);
			}
		}
		for child in &mut node.content {
			self.fill_defaults(child);
		}
	}

	/// Validates a document against the schema.
	pub fn check(&self, doc: &Node) -> Result<(), SchemaError> {
		let top = self.top_node();
		if doc.type_name != top.name {
			return Err(SchemaError::WrongTopNode {
				expected: top.name.clone(),
				found: doc.type_name.clone(),
			});
		}
		self.check_node(doc)
	}

	fn check_node(&self, node: &Node) -> Result<(), SchemaError> {
		let Some(ty) = self.nodes.get(&node.type_name) else {
			return Err(SchemaError::UnknownNodeType(node.type_name.clone()));
		};
		if ty.name == TEXT_TYPE && node.text.is_none() {
			return Err(SchemaError::MissingText);
		}

		for (i, mark) in node.marks.iter().enumerate() {
			if !self.marks.contains_key(&mark.type_name) {
				return Err(SchemaError::UnknownMarkType(mark.type_name.clone()));
			}
			if let Some(other) = node.marks[i + 1..]
				.iter()
				.find(|o| self.excludes(&mark.type_name, &o.type_name))
			{
				return Err(SchemaError::MarksExclude {
					first: mark.type_name.clone(),
					second: other.type_name.clone(),
				});
			}
		}

		let children: Vec<&str> = node.content.iter().map(|c| c.type_name.as_str()).collect();
		let valid = match &ty.content {
			Some(expr) => expr.matches(&children),
			None => children.is_empty(),
		};
		if !valid {
			return Err(SchemaError::ContentMismatch {
				type_name: ty.name.clone(),
			});
		}

		for child in &node.content {
			if let Some(mark) = child.marks.iter().find(|m| !ty.marks.contains(&m.type_name)) {
				return Err(SchemaError::MarkNotAllowed {
					mark: mark.type_name.clone(),
					parent: ty.name.clone(),
				});
			}
			self.check_node(child)?;
		}
		Ok(())
	}

	/// Render spec of a node, or `None` for unknown types.
	///
	/// Types without a render rule render as an element named after the type.
	pub fn render_node(&self, node: &Node) -> Option<DomOutputSpec> {
		let ty = self.nodes.get(&node.type_name)?;
		Some(self.render_with(
			&ty.name,
			&ty.defaults,
			&node.attrs,
			&ty.options,
			ty.render.as_ref(),
			ty.is_leaf(),
		))
	}

	/// Render spec of a mark, or `None` for unknown types.
	pub fn render_mark(&self, mark: &Mark) -> Option<DomOutputSpec> {
		let ty = self.marks.get(&mark.type_name)?;
		Some(self.render_with(&ty.name, &ty.defaults, &mark.attrs, &ty.options, ty.render.as_ref(), false))
	}

	fn render_with(
		&self,
		type_name: &str,
		defaults: &Attrs,
		attrs: &Attrs,
		options: &Value,
		render: Option<&RenderFn>,
		leaf: bool,
	) -> DomOutputSpec {
		let attrs = with_defaults(defaults, attrs);
		let html_attributes = render_attributes(type_name, &attrs, self.attributes.entries());
		match render {
			Some(render) => render(&RenderContext {
				type_name,
				attrs: &attrs,
				html_attributes: &html_attributes,
				options,
			}),
			None if leaf => DomOutputSpec::element(type_name).with_attrs(html_attributes),
			None => DomOutputSpec::wrap(type_name, html_attributes),
		}
	}

	/// First node or mark whose tag rule accepts `element`, by rule priority.
	pub fn match_element(&self, element: &dyn DomNode) -> Option<ParseMatch> {
		self.rules.iter().find_map(|entry| {
			let attrs = entry.rule.match_element(element)?;
			Some(self.parse_match(entry, attrs))
		})
	}

	/// First node or mark whose style rule accepts `property: value`.
	pub fn match_style(&self, property: &str, value: &str) -> Option<ParseMatch> {
		self.rules.iter().find_map(|entry| {
			let attrs = entry.rule.match_style(property, value)?;
			Some(self.parse_match(entry, attrs))
		})
	}

	fn parse_match(&self, entry: &RuleEntry, attrs: Attrs) -> ParseMatch {
		let defaults = match entry.kind {
			ExtensionKind::Mark => self.marks.get(&entry.type_name).map(|t| &t.defaults),
			_ => self.nodes.get(&entry.type_name).map(|t| &t.defaults),
		};
		ParseMatch {
			kind: entry.kind,
			type_name: entry.type_name.clone(),
			attrs: defaults.map_or_else(|| attrs.clone(), |d| with_defaults(d, &attrs)),
		}
	}
}

fn is_inline(ext: &ResolvedExtension) -> bool {
	ext.name() == TEXT_TYPE || ext.resolve(INLINE).unwrap_or(false)
}

fn parse_rules(ext: &ResolvedExtension, attributes: &AttributeRegistry) -> Vec<ParseRule> {
	let own: Vec<ExtensionAttribute> = attributes.for_type(ext.name()).cloned().collect();
	ext.resolve(PARSE_HTML)
		.unwrap_or_default()
		.into_iter()
		.map(|rule| inject_extension_attributes(rule, &own))
		.collect()
}

fn with_defaults(defaults: &Attrs, attrs: &Attrs) -> Attrs {
	let mut out = defaults.clone();
	for (key, value) in attrs {
		out.insert(key.clone(), value.clone());
	}
	out
}

impl NodeModel for Schema {
	fn is_leaf(&self, type_name: &str) -> bool {
		self.nodes.get(type_name).is_some_and(NodeType::is_leaf)
	}

	fn is_textblock(&self, node: &Node) -> bool {
		self.nodes.get(&node.type_name).is_some_and(NodeType::is_textblock)
	}
}
