//! The editor: a schema, a command surface and a document state.
//!
//! An [`Editor`] is built from a list of extensions and an
//! [`EditorConfig`]. Construction flattens and orders the extensions,
//! synthesizes the schema, collects commands, hooks and plugins, and
//! initializes storage. [`Editor::reconfigure`] repeats all of it and swaps
//! the result in wholesale.

mod chain;

use std::fmt;
use std::sync::Arc;

use quire_primitives::{EditorState, Node, NodeModel, Transaction};
use quire_registry::{Extension, ExtensionGraph, ExtensionStorage};
use quire_schema::Schema;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, warn};

pub use self::chain::EditorChain;
use crate::commands::{CommandEnv, CommandRegistry, core_commands, empty_document};
use crate::config::{ConfigWarning, EditorConfig};
use crate::error::EditorError;
use crate::hooks::{HookEvent, HookTable, Plugin, collect_plugins};
use crate::scheduler::FrameScheduler;
use crate::view::EditorView;

/// Everything derived from the extension list.
struct Runtime {
	graph: ExtensionGraph,
	schema: Arc<Schema>,
	commands: CommandRegistry,
	hooks: HookTable,
	plugins: Vec<Plugin>,
	warnings: Vec<ConfigWarning>,
}

impl Runtime {
	fn build(declared: &[Extension], config: &EditorConfig) -> Result<Self, EditorError> {
		let _span = debug_span!("editor_runtime", declared = declared.len()).entered();
		let mut extensions = declared.to_vec();
		if config.enable_core_extensions {
			extensions.push(core_commands());
		}
		let (graph, warnings) = config.build_graph(&extensions)?;
		let schema = Arc::new(Schema::from_graph(&graph)?);
		let commands = CommandRegistry::build(&graph);
		let hooks = HookTable::build(&graph);
		let plugins = collect_plugins(&graph);
		debug!(
			extensions = graph.len(),
			commands = commands.len(),
			plugins = plugins.len(),
			"editor runtime built"
		);
		Ok(Self {
			graph,
			schema,
			commands,
			hooks,
			plugins,
			warnings,
		})
	}

	fn model(&self) -> Arc<dyn NodeModel> {
		self.schema.clone()
	}

	/// Reads a document, fills attribute defaults and optionally checks it.
	fn document(&self, content: Option<Node>, check: bool) -> Result<Node, EditorError> {
		let Some(mut doc) = content else {
			return Ok(empty_document(&self.schema));
		};
		self.schema.fill_defaults(&mut doc);
		if check {
			self.schema.check(&doc)?;
		}
		Ok(doc)
	}
}

/// Builder for an [`Editor`].
#[derive(Default)]
pub struct EditorBuilder {
	extensions: Vec<Extension>,
	content: Option<Value>,
	config: EditorConfig,
	view: Option<Arc<dyn EditorView>>,
}

impl EditorBuilder {
	/// Adds extensions in declaration order.
	pub fn extensions(mut self, extensions: impl IntoIterator<Item = Extension>) -> Self {
		self.extensions.extend(extensions);
		self
	}

	/// Adds one extension.
	pub fn extension(mut self, extension: Extension) -> Self {
		self.extensions.push(extension);
		self
	}

	/// Initial document in its JSON exchange shape.
	pub fn content(mut self, content: Value) -> Self {
		self.content = Some(content);
		self
	}

	pub fn config(mut self, config: EditorConfig) -> Self {
		self.config = config;
		self
	}

	/// Host view receiving focus and blur requests.
	pub fn view(mut self, view: Arc<dyn EditorView>) -> Self {
		self.view = Some(view);
		self
	}

	pub fn build(self) -> Result<Editor, EditorError> {
		let runtime = Runtime::build(&self.extensions, &self.config)?;
		let content = self.content.map(serde_json::from_value::<Node>).transpose()?;
		let doc = runtime.document(content, self.config.enable_content_check)?;
		let state = EditorState::new(doc, runtime.model());
		let storage = ExtensionStorage::init(&runtime.graph);
		let cancel = CancellationToken::new();

		let mut editor = Editor {
			declared: self.extensions,
			editable: self.config.editable,
			config: self.config,
			runtime,
			storage,
			state,
			view: self.view,
			scheduler: FrameScheduler::new(cancel.child_token()),
			cancel,
			destroyed: false,
		};
		editor.emit(HookEvent::Create, None);
		Ok(editor)
	}
}

/// A live editor instance.
pub struct Editor {
	declared: Vec<Extension>,
	config: EditorConfig,
	runtime: Runtime,
	storage: ExtensionStorage,
	state: EditorState,
	view: Option<Arc<dyn EditorView>>,
	scheduler: FrameScheduler,
	cancel: CancellationToken,
	editable: bool,
	destroyed: bool,
}

impl fmt::Debug for Editor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Editor")
			.field("state", &self.state)
			.field("commands", &self.runtime.commands)
			.field("editable", &self.editable)
			.field("destroyed", &self.destroyed)
			.finish_non_exhaustive()
	}
}

impl Editor {
	pub fn builder() -> EditorBuilder {
		EditorBuilder::default()
	}

	/// Runs one command and dispatches its transaction.
	pub fn command(&mut self, name: &str, args: Value) -> Result<bool, EditorError> {
		self.chain().command(name, args).run()
	}

	/// Starts a chain that dispatches on [`EditorChain::run`].
	pub fn chain(&mut self) -> EditorChain<'_> {
		EditorChain::new(self, false)
	}

	/// Starts a chain that never dispatches.
	pub fn can(&mut self) -> EditorChain<'_> {
		EditorChain::new(self, true)
	}

	pub(crate) fn env(&mut self) -> CommandEnv<'_> {
		CommandEnv {
			state: &self.state,
			schema: &self.runtime.schema,
			storage: &mut self.storage,
			view: self.view.as_ref(),
			scheduler: &self.scheduler,
			registry: &self.runtime.commands,
			content_check: self.config.enable_content_check,
		}
	}

	/// Applies a transaction to the state.
	///
	/// Returns false if the editor is destroyed or a plugin filtered the
	/// transaction. Transaction hooks run for every applied transaction,
	/// update hooks only when the document changed.
	pub fn dispatch(&mut self, tr: Transaction) -> bool {
		if self.destroyed {
			warn!("dispatch on destroyed editor");
			return false;
		}
		if let Some(plugin) = self
			.runtime
			.plugins
			.iter()
			.find(|plugin| !plugin.allows(&tr, &self.state))
		{
			warn!(plugin = plugin.key(), "transaction filtered");
			return false;
		}

		self.state = self.state.apply(&tr);
		self.emit(HookEvent::Transaction, Some(&tr));
		if tr.doc_changed() {
			self.emit(HookEvent::Update, Some(&tr));
		}
		true
	}

	fn emit(&mut self, event: HookEvent, tr: Option<&Transaction>) {
		self.runtime
			.hooks
			.emit(event, &mut self.storage, &self.state, tr);
	}

	/// Rebuilds schema, commands, hooks and storage from a new extension
	/// list and configuration.
	///
	/// The current document is kept and must be valid under the new schema
	/// when content checking is enabled. On error nothing changes.
	pub fn reconfigure(
		&mut self,
		extensions: Vec<Extension>,
		config: EditorConfig,
	) -> Result<(), EditorError> {
		if self.destroyed {
			return Err(EditorError::Destroyed);
		}
		let runtime = Runtime::build(&extensions, &config)?;
		let doc = runtime.document(Some(self.state.doc().clone()), config.enable_content_check)?;
		let selection = self.state.selection();
		let fresh = EditorState::new(doc, runtime.model());
		let mut tr = fresh.tr();
		tr.set_selection(selection);
		let state = fresh.apply(&tr);

		self.emit(HookEvent::Destroy, None);
		self.storage = ExtensionStorage::init(&runtime.graph);
		self.runtime = runtime;
		self.state = state;
		self.declared = extensions;
		self.editable = config.editable;
		self.config = config;
		debug!(extensions = self.runtime.graph.len(), "editor reconfigured");
		self.emit(HookEvent::Create, None);
		Ok(())
	}

	/// Runs destroy hooks and cancels pending frame tasks.
	pub fn destroy(&mut self) {
		if self.destroyed {
			return;
		}
		self.emit(HookEvent::Destroy, None);
		self.cancel.cancel();
		self.destroyed = true;
		debug!(pending = self.scheduler.pending_count(), "editor destroyed");
	}

	/// Runs the frame tasks queued so far.
	pub fn run_frame(&self) -> usize {
		self.scheduler.run_pending()
	}

	pub fn is_destroyed(&self) -> bool {
		self.destroyed
	}

	pub fn set_editable(&mut self, editable: bool) {
		self.editable = editable;
	}

	pub fn is_editable(&self) -> bool {
		self.editable && !self.destroyed
	}

	/// Document serialized through the schema's render rules.
	pub fn get_html(&self) -> String {
		self.runtime.schema.to_html(self.state.doc())
	}

	/// Document in its JSON exchange shape.
	pub fn get_json(&self) -> Result<Value, EditorError> {
		Ok(serde_json::to_value(self.state.doc())?)
	}

	pub fn state(&self) -> &EditorState {
		&self.state
	}

	pub fn schema(&self) -> &Arc<Schema> {
		&self.runtime.schema
	}

	pub fn graph(&self) -> &ExtensionGraph {
		&self.runtime.graph
	}

	pub fn commands(&self) -> &CommandRegistry {
		&self.runtime.commands
	}

	pub fn storage(&self) -> &ExtensionStorage {
		&self.storage
	}

	pub fn storage_mut(&mut self) -> &mut ExtensionStorage {
		&mut self.storage
	}

	pub fn scheduler(&self) -> &FrameScheduler {
		&self.scheduler
	}

	/// Extensions as declared, before flattening.
	pub fn extensions(&self) -> &[Extension] {
		&self.declared
	}

	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// Warnings from the last (re)configuration.
	pub fn warnings(&self) -> &[ConfigWarning] {
		&self.runtime.warnings
	}
}
