//! Field keys read during schema synthesis.

use quire_registry::FieldKey;

use crate::attribute::{AttributeMap, GlobalAttributes};
use crate::parse::ParseRule;
use crate::render::RenderFn;

/// Content expression of a node type, e.g. `"paragraph+"` or `"inline*"`.
pub const CONTENT: FieldKey<String> = FieldKey::new("content");

/// Space-separated groups a node or mark type belongs to.
pub const GROUP: FieldKey<String> = FieldKey::new("group");

/// Whether a node type is inline.
pub const INLINE: FieldKey<bool> = FieldKey::new("inline");

/// Whether a node type is edited as a single unit.
pub const ATOM: FieldKey<bool> = FieldKey::new("atom");

/// Marks allowed inside a node type: `"_"` for all, `""` for none, or
/// space-separated mark names and groups.
pub const MARKS: FieldKey<String> = FieldKey::new("marks");

/// Whether a mark extends to text typed at its end.
pub const INCLUSIVE: FieldKey<bool> = FieldKey::new("inclusive");

/// Marks that cannot coexist with this one; `"_"` for all.
pub const EXCLUDES: FieldKey<String> = FieldKey::new("excludes");

/// Whether a mark may span multiple adjacent nodes.
pub const SPANNING: FieldKey<bool> = FieldKey::new("spanning");

/// Marks the node type as the document root.
pub const TOP_NODE: FieldKey<bool> = FieldKey::new("top_node");

/// Attributes of a node or mark type.
pub const ATTRIBUTES: FieldKey<AttributeMap> = FieldKey::new("add_attributes");

/// Attributes an extension adds to other types.
pub const GLOBAL_ATTRIBUTES: FieldKey<Vec<GlobalAttributes>> =
	FieldKey::new("add_global_attributes");

/// Rules matching DOM input to this type.
pub const PARSE_HTML: FieldKey<Vec<ParseRule>> = FieldKey::new("parse_html");

/// Renders an instance of this type to a DOM output spec.
pub const RENDER_HTML: FieldKey<RenderFn> = FieldKey::new("render_html");
