use std::sync::Arc;

use quire_primitives::{EditorState, Transaction};
use quire_registry::ExtensionStorage;
use quire_schema::Schema;
use serde_json::Value;
use tracing::trace;

use super::CommandRegistry;
use crate::error::CommandError;
use crate::scheduler::FrameScheduler;
use crate::view::EditorView;

/// What a command runs against.
///
/// Every command of a chain sees the same `tr`. When `dispatch` is false
/// the transaction is thrown away after the chain, so commands must only
/// touch `tr` and leave the view and scheduler alone.
pub struct CommandProps<'a> {
	pub tr: &'a mut Transaction,
	/// State the chain started from.
	pub state: &'a EditorState,
	pub dispatch: bool,
	pub schema: &'a Schema,
	/// Extension storage. When `dispatch` is false this is a scratch copy
	/// discarded with the chain.
	pub storage: &'a mut ExtensionStorage,
	pub view: Option<&'a Arc<dyn EditorView>>,
	pub scheduler: &'a FrameScheduler,
	/// Whether replacement content is checked against the schema.
	pub content_check: bool,
	pub(super) registry: &'a CommandRegistry,
}

impl CommandProps<'_> {
	/// Runs another command on the same transaction.
	pub fn call(&mut self, name: &str, args: &Value) -> Result<bool, CommandError> {
		let command = self
			.registry
			.get(name)
			.cloned()
			.ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
		trace!(command = name, dispatch = self.dispatch, "command");
		command(self, args)
	}

	/// Returns true if a command with this name is registered.
	pub fn has_command(&self, name: &str) -> bool {
		self.registry.get(name).is_some()
	}
}
