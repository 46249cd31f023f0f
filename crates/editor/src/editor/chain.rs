use quire_primitives::Transaction;
use serde_json::Value;

use super::Editor;
use crate::commands::{CommandChain, CommandProps, Queued};
use crate::error::{CommandError, EditorError};

/// A command chain bound to an editor.
///
/// Built by [`Editor::chain`] or [`Editor::can`]. A chain from `can`
/// behaves like [`EditorChain::can`] on `run`.
pub struct EditorChain<'e> {
	editor: &'e mut Editor,
	queue: Vec<Queued<'e>>,
	dry_run: bool,
}

impl<'e> EditorChain<'e> {
	pub(super) fn new(editor: &'e mut Editor, dry_run: bool) -> Self {
		Self {
			editor,
			queue: Vec::new(),
			dry_run,
		}
	}

	/// Queues a registered command.
	pub fn command(mut self, name: impl Into<String>, args: Value) -> Self {
		self.queue.push(Queued::Named(name.into(), args));
		self
	}

	/// Queues an inline command.
	pub fn with(
		mut self,
		f: impl FnOnce(&mut CommandProps<'_>) -> Result<bool, CommandError> + 'e,
	) -> Self {
		self.queue.push(Queued::Inline(Box::new(f)));
		self
	}

	/// Runs the queue and dispatches the transaction to the editor.
	pub fn run(self) -> Result<bool, EditorError> {
		let dispatch = !self.dry_run;
		self.execute(dispatch)
	}

	/// Runs the queue without dispatching.
	pub fn can(self) -> Result<bool, EditorError> {
		self.execute(false)
	}

	fn execute(self, dispatch: bool) -> Result<bool, EditorError> {
		let Self { editor, queue, .. } = self;
		if editor.is_destroyed() {
			return Err(EditorError::Destroyed);
		}

		let mut finished: Option<Transaction> = None;
		let applied = {
			let mut sink = |tr: Transaction| finished = Some(tr);
			let chain = CommandChain::with_queue(editor.env(), queue);
			if dispatch {
				chain.dispatch_to(&mut sink).run()?
			} else {
				chain.can()?
			}
		};
		if let Some(tr) = finished {
			editor.dispatch(tr);
		}
		Ok(applied)
	}
}
