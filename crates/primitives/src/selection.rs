use crate::node::{Node, NodeModel};
use crate::transaction::{Bias, StepMap, locate_textblock};

/// A text selection between two document positions.
///
/// `anchor` is the fixed side and `head` the moving side; either may be
/// the larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
	pub anchor: usize,
	pub head: usize,
}

impl Selection {
	/// Creates a selection from anchor to head.
	pub fn new(anchor: usize, head: usize) -> Self {
		Self { anchor, head }
	}

	/// Creates a collapsed selection.
	pub fn cursor(pos: usize) -> Self {
		Self::new(pos, pos)
	}

	/// Cursor at the start of the first textblock, or 0.
	pub fn at_start(doc: &Node, model: &dyn NodeModel) -> Self {
		let size = doc.content_size(model);
		(0..=size)
			.find_map(|pos| locate_textblock(doc, 0, pos, model).map(|(_, start)| start))
			.map_or(Self::cursor(0), Self::cursor)
	}

	/// Lower bound of the selection.
	pub fn from(&self) -> usize {
		self.anchor.min(self.head)
	}

	/// Upper bound of the selection.
	pub fn to(&self) -> usize {
		self.anchor.max(self.head)
	}

	/// Returns true if anchor and head coincide.
	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	/// Maps both ends through a step map.
	pub fn map(&self, map: &StepMap) -> Self {
		Self::new(map.map(self.anchor, Bias::Right), map.map(self.head, Bias::Right))
	}

	/// Clamps both ends into `0..=size`.
	pub fn clamp(&self, size: usize) -> Self {
		Self::new(self.anchor.min(size), self.head.min(size))
	}
}
