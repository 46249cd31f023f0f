use quire_registry::RegistryError;
use thiserror::Error;

/// Schema synthesis and document validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
	#[error(transparent)]
	Registry(#[from] RegistryError),
	#[error("no top node: mark a node type with top_node or name one \"doc\"")]
	NoTopNode,
	#[error("invalid content expression {expr:?} on {owner:?}: {reason}")]
	InvalidContent {
		owner: String,
		expr: String,
		reason: String,
	},
	#[error("unknown node type or group {name:?} in content of {owner:?}")]
	UnknownContentType { owner: String, name: String },
	#[error("unknown mark or group {name:?} in {field} of {owner:?}")]
	UnknownMarkName {
		owner: String,
		field: &'static str,
		name: String,
	},

	// Document validation.
	#[error("unknown node type {0:?}")]
	UnknownNodeType(String),
	#[error("unknown mark type {0:?}")]
	UnknownMarkType(String),
	#[error("top node must be {expected:?}, found {found:?}")]
	WrongTopNode { expected: String, found: String },
	#[error("text node without text")]
	MissingText,
	#[error("content of {type_name:?} does not match its content expression")]
	ContentMismatch { type_name: String },
	#[error("mark {mark:?} is not allowed in {parent:?}")]
	MarkNotAllowed { mark: String, parent: String },
	#[error("marks {first:?} and {second:?} exclude each other")]
	MarksExclude { first: String, second: String },
}
