//! Lifecycle hooks and transaction plugins.
//!
//! Hooks are resolved once per graph into a [`HookTable`] and emitted by
//! the editor in extension order. Each hook sees its own extension's name,
//! options and storage bag through [`HookContext`].

use std::fmt;
use std::sync::Arc;

use quire_primitives::{EditorState, Transaction};
use quire_registry::{ExtensionGraph, ExtensionStorage, FieldKey};
use serde_json::Value;
use tracing::{trace, trace_span};

use crate::fields;

/// Lifecycle hook.
pub type HookFn = Arc<dyn Fn(&mut HookContext<'_>) + Send + Sync>;

/// Transaction filter; returning false drops the transaction.
pub type FilterFn = Arc<dyn Fn(&Transaction, &EditorState) -> bool + Send + Sync>;

/// What a hook is invoked with.
pub struct HookContext<'a> {
	/// Name of the extension owning the hook.
	pub name: &'a str,
	/// Effective options of that extension.
	pub options: &'a Value,
	/// Storage bag of that extension.
	pub storage: &'a mut Value,
	/// Editor state after the event.
	pub state: &'a EditorState,
	/// Transaction that caused the event, for update and transaction hooks.
	pub tr: Option<&'a Transaction>,
}

/// Editor lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
	/// The editor was constructed or reconfigured.
	Create,
	/// A dispatched transaction changed the document.
	Update,
	/// A transaction was dispatched.
	Transaction,
	/// The editor is being destroyed.
	Destroy,
}

impl HookEvent {
	fn key(self) -> FieldKey<HookFn> {
		match self {
			Self::Create => fields::ON_CREATE,
			Self::Update => fields::ON_UPDATE,
			Self::Transaction => fields::ON_TRANSACTION,
			Self::Destroy => fields::ON_DESTROY,
		}
	}
}

struct HookEntry {
	event: HookEvent,
	extension: String,
	options: Value,
	hook: HookFn,
}

/// Hooks of every extension in a graph, in extension order.
#[derive(Default)]
pub struct HookTable {
	entries: Vec<HookEntry>,
}

impl fmt::Debug for HookTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.entries.iter().map(|e| (e.event, &e.extension)))
			.finish()
	}
}

impl HookTable {
	/// Resolves the hook fields of every extension.
	pub fn build(graph: &ExtensionGraph) -> Self {
		let events = [
			HookEvent::Create,
			HookEvent::Update,
			HookEvent::Transaction,
			HookEvent::Destroy,
		];
		let mut entries = Vec::new();
		for ext in graph.iter() {
			for event in events {
				if let Some(hook) = ext.resolve(event.key()) {
					entries.push(HookEntry {
						event,
						extension: ext.name().to_string(),
						options: ext.options().clone(),
						hook,
					});
				}
			}
		}
		Self { entries }
	}

	/// Number of hooks registered for an event.
	pub fn count(&self, event: HookEvent) -> usize {
		self.entries.iter().filter(|e| e.event == event).count()
	}

	/// Invokes every hook registered for `event`.
	pub fn emit(
		&self,
		event: HookEvent,
		storage: &mut ExtensionStorage,
		state: &EditorState,
		tr: Option<&Transaction>,
	) {
		let _span = trace_span!("hooks", ?event).entered();
		for entry in self.entries.iter().filter(|e| e.event == event) {
			trace!(extension = %entry.extension, "hook");
			let mut cx = HookContext {
				name: &entry.extension,
				options: &entry.options,
				storage: storage.entry(&entry.extension),
				state,
				tr,
			};
			(entry.hook)(&mut cx);
		}
	}
}

/// A transaction plugin contributed by an extension.
#[derive(Clone)]
pub struct Plugin {
	key: String,
	filter_transaction: Option<FilterFn>,
}

impl fmt::Debug for Plugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Plugin")
			.field("key", &self.key)
			.field("filters", &self.filter_transaction.is_some())
			.finish()
	}
}

impl Plugin {
	/// Creates a plugin without behavior.
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			filter_transaction: None,
		}
	}

	/// Sets the transaction filter.
	pub fn filter_transaction(
		mut self,
		f: impl Fn(&Transaction, &EditorState) -> bool + Send + Sync + 'static,
	) -> Self {
		self.filter_transaction = Some(Arc::new(f));
		self
	}

	/// Plugin key.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns false if the plugin rejects the transaction.
	pub fn allows(&self, tr: &Transaction, state: &EditorState) -> bool {
		self.filter_transaction.as_ref().is_none_or(|f| f(tr, state))
	}
}

/// Collects the plugins of every extension, in extension order.
pub fn collect_plugins(graph: &ExtensionGraph) -> Vec<Plugin> {
	graph
		.iter()
		.filter_map(|ext| ext.resolve(fields::PLUGINS))
		.flatten()
		.collect()
}
