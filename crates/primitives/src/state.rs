use std::fmt;
use std::sync::Arc;

use crate::node::{Node, NodeModel};
use crate::selection::Selection;
use crate::transaction::Transaction;

/// Immutable editor state: a document and a selection.
#[derive(Clone)]
pub struct EditorState {
	doc: Node,
	selection: Selection,
	model: Arc<dyn NodeModel>,
}

impl fmt::Debug for EditorState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EditorState")
			.field("doc", &self.doc)
			.field("selection", &self.selection)
			.finish_non_exhaustive()
	}
}

impl EditorState {
	/// Creates a state with the cursor at the start of the document.
	pub fn new(doc: Node, model: Arc<dyn NodeModel>) -> Self {
		let selection = Selection::at_start(&doc, &*model);
		Self {
			doc,
			selection,
			model,
		}
	}

	/// Current document.
	pub fn doc(&self) -> &Node {
		&self.doc
	}

	/// Current selection.
	pub fn selection(&self) -> Selection {
		self.selection
	}

	/// Node model of this state.
	pub fn model(&self) -> &Arc<dyn NodeModel> {
		&self.model
	}

	/// Starts a transaction on this state.
	pub fn tr(&self) -> Transaction {
		Transaction::new(self.doc.clone(), self.selection, self.model.clone())
	}

	/// Produces the state after a transaction.
	pub fn apply(&self, tr: &Transaction) -> EditorState {
		let doc = tr.doc().clone();
		let selection = tr.selection().clamp(doc.content_size(&*self.model));
		EditorState {
			doc,
			selection,
			model: self.model.clone(),
		}
	}
}
