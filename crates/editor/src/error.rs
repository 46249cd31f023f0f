use quire_primitives::StepError;
use quire_registry::RegistryError;
use quire_schema::SchemaError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while running a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
	/// No extension registers a command with this name.
	#[error("unknown command '{0}'")]
	UnknownCommand(String),
	/// The schema has no mark type with this name.
	#[error("unknown mark type '{0}'")]
	UnknownMark(String),
	/// The schema has no node or mark type with this name.
	#[error("unknown node type '{0}'")]
	UnknownNodeType(String),
	/// Arguments could not be interpreted.
	#[error("invalid argument for '{command}': {reason}")]
	InvalidArgument {
		command: String,
		reason: String,
	},
	#[error(transparent)]
	Step(#[from] StepError),
	#[error(transparent)]
	Schema(#[from] SchemaError),
}

impl CommandError {
	pub(crate) fn invalid(command: &str, reason: impl Into<String>) -> Self {
		Self::InvalidArgument {
			command: command.to_string(),
			reason: reason.into(),
		}
	}
}

/// Errors raised by the [`Editor`](crate::Editor).
#[derive(Error, Debug)]
pub enum EditorError {
	#[error(transparent)]
	Registry(#[from] RegistryError),
	#[error(transparent)]
	Schema(#[from] SchemaError),
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Command(#[from] CommandError),
	/// Initial content is not a valid document tree.
	#[error("invalid content: {0}")]
	Content(#[from] serde_json::Error),
	/// The editor was destroyed.
	#[error("editor has been destroyed")]
	Destroyed,
}
