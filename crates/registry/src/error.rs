use thiserror::Error;

use crate::extension::ExtensionKind;

/// Configuration errors found while building the extension graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	/// Two unrelated descriptors share a name.
	#[error("duplicate extension name {name:?} ({first} and {second})")]
	DuplicateName {
		name: String,
		first: ExtensionKind,
		second: ExtensionKind,
	},
	/// A descriptor re-adds itself through its nested extensions.
	#[error("extension nesting cycle: {path}")]
	NestingCycle { path: String },
	/// A descriptor has an empty name.
	#[error("extension name must not be empty")]
	EmptyName,
}
