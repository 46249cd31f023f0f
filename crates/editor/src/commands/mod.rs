//! Named commands and the chain that runs them.
//!
//! Extensions contribute commands through [`COMMANDS`](crate::fields::COMMANDS).
//! [`CommandRegistry::build`] collects them in graph order, and a
//! [`CommandChain`] runs a queue of them against one shared transaction.

mod builtin;
mod chain;
mod props;


use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use quire_registry::ExtensionGraph;
use serde_json::Value;
use tracing::debug;

pub(crate) use self::builtin::empty_document;
pub use self::builtin::{CORE_COMMANDS, core_commands};
pub use self::chain::{CommandChain, CommandEnv};
pub(crate) use self::chain::Queued;
pub use self::props::CommandProps;
use crate::error::CommandError;
use crate::fields;

/// Transaction meta key that suppresses dispatch at the end of a chain.
pub const PREVENT_DISPATCH: &str = "prevent_dispatch";

/// A named command.
///
/// Returns whether the command applied. Commands mutate `props.tr` and
/// must not perform side effects when `props.dispatch` is false.
pub type CommandFn =
	Arc<dyn Fn(&mut CommandProps<'_>, &Value) -> Result<bool, CommandError> + Send + Sync>;

/// Commands of one extension, by name.
pub type CommandMap = IndexMap<String, CommandFn>;

/// Wraps a closure as a [`CommandFn`].
pub fn command(
	f: impl Fn(&mut CommandProps<'_>, &Value) -> Result<bool, CommandError> + Send + Sync + 'static,
) -> CommandFn {
	Arc::new(f)
}

/// Two extensions registered a command under the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
	pub command: String,
	/// Extension whose command was kept.
	pub winner: String,
	/// Extension whose command was ignored.
	pub loser: String,
}

struct Registered {
	owner: String,
	run: CommandFn,
}

/// Every command of a graph, first registration winning.
#[derive(Default)]
pub struct CommandRegistry {
	commands: IndexMap<String, Registered>,
	collisions: Vec<Collision>,
}

impl fmt::Debug for CommandRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandRegistry")
			.field("commands", &self.commands.keys().collect::<Vec<_>>())
			.field("collisions", &self.collisions)
			.finish()
	}
}

impl CommandRegistry {
	/// Collects the resolved command table of every extension in order.
	///
	/// The graph is sorted by descending priority, so the command seen
	/// first belongs to the higher-priority extension.
	pub fn build(graph: &ExtensionGraph) -> Self {
		let mut registry = Self::default();
		for ext in graph.iter() {
			let Some(commands) = ext.resolve(fields::COMMANDS) else {
				continue;
			};
			for (name, run) in commands {
				match registry.commands.entry(name) {
					Entry::Occupied(entry) => {
						let collision = Collision {
							command: entry.key().clone(),
							winner: entry.get().owner.clone(),
							loser: ext.name().to_string(),
						};
						debug!(
							command = %collision.command,
							winner = %collision.winner,
							loser = %collision.loser,
							"command collision"
						);
						registry.collisions.push(collision);
					}
					Entry::Vacant(entry) => {
						entry.insert(Registered {
							owner: ext.name().to_string(),
							run,
						});
					}
				}
			}
		}
		registry
	}

	/// Looks up a command by name.
	pub fn get(&self, name: &str) -> Option<&CommandFn> {
		self.commands.get(name).map(|r| &r.run)
	}

	/// Extension that registered the command.
	pub fn owner(&self, name: &str) -> Option<&str> {
		self.commands.get(name).map(|r| r.owner.as_str())
	}

	/// Command names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.commands.keys().map(String::as_str)
	}

	/// Name collisions found while building.
	pub fn collisions(&self) -> &[Collision] {
		&self.collisions
	}

	pub fn len(&self) -> usize {
		self.commands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}
}
