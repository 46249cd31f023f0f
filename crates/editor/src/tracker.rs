//! Positions tracked across the steps of a transaction.

use quire_primitives::{Bias, Transaction};

/// A position mapped through a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedPosition {
	pub pos: usize,
	/// The content after the position was removed by some step.
	pub deleted: bool,
}

/// Maps positions through the steps added to a transaction after a checkpoint.
///
/// Every call re-derives the result from the checkpoint, so a tracker can
/// be kept while more steps are appended.
///
/// ```
/// use std::sync::Arc;
///
/// use quire_editor::PositionTracker;
/// use quire_primitives::{EditorState, Node, StructuralModel};
///
/// let doc = Node::with_content("doc", vec![Node::with_content("p", vec![Node::text("hello")])]);
/// let state = EditorState::new(doc, Arc::new(StructuralModel::default()));
/// let mut tr = state.tr();
///
/// let tracker = PositionTracker::new(&tr);
/// tr.insert_text(1, "ab").unwrap();
///
/// let mapped = tracker.map(&tr, 4);
/// assert_eq!((mapped.pos, mapped.deleted), (6, false));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PositionTracker {
	checkpoint: usize,
}

impl PositionTracker {
	/// Starts tracking at the transaction's current step count.
	pub fn new(tr: &Transaction) -> Self {
		Self {
			checkpoint: tr.steps().len(),
		}
	}

	/// Index of the first step the tracker maps through.
	pub fn checkpoint(&self) -> usize {
		self.checkpoint
	}

	/// Maps `pos` through the steps added since the checkpoint.
	///
	/// Positions at a replacement boundary associate to the right.
	pub fn map(&self, tr: &Transaction, pos: usize) -> TrackedPosition {
		let result = tr.map_from(self.checkpoint, pos, Bias::Right);
		TrackedPosition {
			pos: result.pos,
			deleted: result.deleted,
		}
	}
}
