//! Transactions: ordered steps applied to a document.

mod inline;
mod map;
mod step;


use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;

pub use map::{Bias, MapRange, MapResult, StepMap, map_through};
pub(crate) use step::locate_textblock;
pub use step::{
	AddMarkStep, RemoveMarkStep, ReplaceDocStep, ReplaceTextStep, SetNodeAttrsStep, Step,
	StepError,
};

use crate::node::{Attrs, Mark, Node, NodeModel};
use crate::selection::Selection;

/// An append-only sequence of steps on top of a starting document.
///
/// Every step is applied as soon as it is added, so [`Transaction::doc`]
/// always reflects all steps so far. The selection is mapped through each
/// step unless it was set explicitly afterwards.
pub struct Transaction {
	before: Node,
	doc: Node,
	steps: Vec<Box<dyn Step>>,
	maps: Vec<StepMap>,
	selection: Selection,
	selection_set: bool,
	meta: HashMap<String, Value>,
	model: Arc<dyn NodeModel>,
}

impl fmt::Debug for Transaction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Transaction")
			.field("steps", &self.steps)
			.field("selection", &self.selection)
			.field("meta", &self.meta)
			.finish_non_exhaustive()
	}
}

impl Transaction {
	/// Starts a transaction on `doc` with the given selection.
	pub fn new(doc: Node, selection: Selection, model: Arc<dyn NodeModel>) -> Self {
		Self {
			before: doc.clone(),
			doc,
			steps: Vec::new(),
			maps: Vec::new(),
			selection,
			selection_set: false,
			meta: HashMap::default(),
			model,
		}
	}

	/// Document before any step.
	pub fn before(&self) -> &Node {
		&self.before
	}

	/// Document after all steps so far.
	pub fn doc(&self) -> &Node {
		&self.doc
	}

	/// Steps added so far.
	pub fn steps(&self) -> &[Box<dyn Step>] {
		&self.steps
	}

	/// Position maps of the steps added so far, in order.
	pub fn maps(&self) -> &[StepMap] {
		&self.maps
	}

	/// Node model the steps are applied with.
	pub fn model(&self) -> &dyn NodeModel {
		&*self.model
	}

	/// Returns true if any step was added.
	pub fn doc_changed(&self) -> bool {
		!self.steps.is_empty()
	}

	/// Returns true if the selection was set explicitly.
	pub fn selection_set(&self) -> bool {
		self.selection_set
	}

	/// Current selection.
	pub fn selection(&self) -> Selection {
		self.selection
	}

	/// Applies and records a step.
	pub fn step(&mut self, step: impl Step + 'static) -> Result<&mut Self, StepError> {
		let doc = step.apply(&self.doc, &*self.model)?;
		let map = step.map();
		self.selection = self.selection.map(&map).clamp(doc.content_size(&*self.model));
		self.doc = doc;
		self.maps.push(map);
		self.steps.push(Box::new(step));
		Ok(self)
	}

	/// Inserts text at `pos`.
	pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<&mut Self, StepError> {
		self.replace_text(pos, pos, text)
	}

	/// Replaces `from..to` with text that inherits the surrounding marks.
	pub fn replace_text(
		&mut self,
		from: usize,
		to: usize,
		text: &str,
	) -> Result<&mut Self, StepError> {
		self.step(ReplaceTextStep {
			from,
			to,
			text: text.to_string(),
			marks: None,
		})
	}

	/// Deletes `from..to` inside one textblock.
	pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
		if from == to {
			return Ok(self);
		}
		self.replace_text(from, to, "")
	}

	/// Adds a mark to the text in `from..to`.
	pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<&mut Self, StepError> {
		self.step(AddMarkStep { from, to, mark })
	}

	/// Removes a mark type from the text in `from..to`.
	pub fn remove_mark(
		&mut self,
		from: usize,
		to: usize,
		mark_type: &str,
	) -> Result<&mut Self, StepError> {
		self.step(RemoveMarkStep {
			from,
			to,
			mark_type: mark_type.to_string(),
		})
	}

	/// Merges attributes into the node starting at `pos`.
	pub fn set_node_attrs(&mut self, pos: usize, attrs: Attrs) -> Result<&mut Self, StepError> {
		self.step(SetNodeAttrsStep { pos, attrs })
	}

	/// Replaces the whole document.
	pub fn replace_doc(&mut self, doc: Node) -> Result<&mut Self, StepError> {
		let old_size = self.doc.content_size(&*self.model);
		let new_size = doc.content_size(&*self.model);
		self.step(ReplaceDocStep {
			doc,
			old_size,
			new_size,
		})
	}

	/// Sets the selection; it is no longer mapped by later steps' defaults.
	pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
		let size = self.doc.content_size(&*self.model);
		self.selection = selection.clamp(size);
		self.selection_set = true;
		self
	}

	/// Stores a metadata value.
	pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.meta.insert(key.into(), value.into());
		self
	}

	/// Reads a metadata value.
	pub fn get_meta(&self, key: &str) -> Option<&Value> {
		self.meta.get(key)
	}

	/// Maps a position through every step.
	pub fn map(&self, pos: usize, bias: Bias) -> MapResult {
		map_through(&self.maps, pos, bias)
	}

	/// Maps a position through the steps starting at index `from`.
	pub fn map_from(&self, from: usize, pos: usize, bias: Bias) -> MapResult {
		map_through(self.maps.get(from..).unwrap_or(&[]), pos, bias)
	}
}
