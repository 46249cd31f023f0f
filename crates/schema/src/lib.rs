//! Schema synthesis for the quire kernel.
//!
//! Node and mark extensions declare their content, attributes, parse rules
//! and render rule through the field keys in [`fields`]. [`synthesize`]
//! turns an extension list into an immutable [`Schema`]:
//!
//! - [`AttributeRegistry`] gathers global and type-owned attributes
//! - [`inject_extension_attributes`] extends tag parse rules with them
//! - [`render_attributes`] and [`merge_attributes`] compute HTML attributes

pub mod attribute;
pub mod content;
pub mod error;
pub mod fields;
mod html;
pub mod parse;
pub mod render;
pub mod schema;


pub use attribute::{
	AttrParseFn, AttrRenderFn, Attribute, AttributeMap, AttributeRegistry, ExtensionAttribute,
	GlobalAttributes, inherit_attributes,
};
pub use content::ContentExpr;
pub use error::SchemaError;
pub use parse::{
	DEFAULT_PARSE_PRIORITY, Matcher, ParseRule, StyleAttrsFn, TagAttrsFn, decode_attribute_value,
	inject_extension_attributes,
};
pub use render::{DomOutputSpec, RenderContext, RenderFn, merge_attributes, render_attributes};
pub use schema::{MarkSet, MarkType, NodeType, ParseMatch, Schema, synthesize};
