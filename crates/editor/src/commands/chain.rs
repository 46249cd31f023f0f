use std::fmt;
use std::sync::Arc;

use quire_primitives::{EditorState, Transaction};
use quire_registry::ExtensionStorage;
use quire_schema::Schema;
use serde_json::Value;
use tracing::{trace, trace_span};

use super::{CommandProps, CommandRegistry, PREVENT_DISPATCH};
use crate::error::CommandError;
use crate::scheduler::FrameScheduler;
use crate::view::EditorView;

/// Inline step of a chain.
pub(crate) type InlineCommand<'a> =
	Box<dyn FnOnce(&mut CommandProps<'_>) -> Result<bool, CommandError> + 'a>;

pub(crate) enum Queued<'a> {
	Named(String, Value),
	Inline(InlineCommand<'a>),
}

impl fmt::Debug for Queued<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Named(name, args) => f.debug_tuple("Named").field(name).field(args).finish(),
			Self::Inline(_) => f.write_str("Inline"),
		}
	}
}

/// Everything a chain borrows from its editor.
pub struct CommandEnv<'a> {
	pub state: &'a EditorState,
	pub schema: &'a Schema,
	pub storage: &'a mut ExtensionStorage,
	pub view: Option<&'a Arc<dyn EditorView>>,
	pub scheduler: &'a FrameScheduler,
	pub registry: &'a CommandRegistry,
	pub content_check: bool,
}

/// A queue of commands run against one transaction.
///
/// [`run`](Self::run) executes every queued command in order, then hands
/// the transaction to the dispatch sink once. [`can`](Self::can) runs the
/// same queue with `dispatch = false` against a copy of the storage, and
/// drops both afterwards.
pub struct CommandChain<'a> {
	env: CommandEnv<'a>,
	queue: Vec<Queued<'a>>,
	sink: Option<&'a mut dyn FnMut(Transaction)>,
}

impl<'a> CommandChain<'a> {
	pub fn new(env: CommandEnv<'a>) -> Self {
		Self {
			env,
			queue: Vec::new(),
			sink: None,
		}
	}

	pub(crate) fn with_queue(env: CommandEnv<'a>, queue: Vec<Queued<'a>>) -> Self {
		Self {
			env,
			queue,
			sink: None,
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
		f: impl FnOnce(&mut CommandProps<'_>) -> Result<bool, CommandError> + 'a,
	) -> Self {
		self.queue.push(Queued::Inline(Box::new(f)));
		self
	}

	/// Sets where the finished transaction goes on [`run`](Self::run).
	pub fn dispatch_to(mut self, sink: &'a mut dyn FnMut(Transaction)) -> Self {
		self.sink = Some(sink);
		self
	}

	/// Runs the queue and dispatches the transaction.
	///
	/// Returns true if every command applied. The transaction is dispatched
	/// whatever the result, unless it carries [`PREVENT_DISPATCH`]. An error
	/// stops the chain and nothing is dispatched.
	pub fn run(self) -> Result<bool, CommandError> {
		self.execute(true)
	}

	/// Runs the queue without dispatching.
	pub fn can(self) -> Result<bool, CommandError> {
		self.execute(false)
	}

	fn execute(self, dispatch: bool) -> Result<bool, CommandError> {
		let Self { env, queue, sink } = self;
		let _span = trace_span!("command_chain", dispatch, queued = queue.len()).entered();

		let mut tr = env.state.tr();
		let mut applied = true;
		let mut scratch;
		let storage = if dispatch {
			env.storage
		} else {
			scratch = env.storage.clone();
			&mut scratch
		};
		{
			let mut props = CommandProps {
				tr: &mut tr,
				state: env.state,
				dispatch,
				schema: env.schema,
				storage,
				view: env.view,
				scheduler: env.scheduler,
				content_check: env.content_check,
				registry: env.registry,
			};
			for queued in queue {
				let result = match queued {
					Queued::Named(name, args) => props.call(&name, &args)?,
					Queued::Inline(f) => {
						trace!(dispatch, "inline command");
						f(&mut props)?
					}
				};
				applied &= result;
			}
		}

		if dispatch && let Some(sink) = sink {
			if matches!(tr.get_meta(PREVENT_DISPATCH), Some(Value::Bool(true))) {
				trace!("dispatch prevented");
			} else {
				sink(tr);
			}
		}
		Ok(applied)
	}
}
