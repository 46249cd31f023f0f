use std::fmt;

use thiserror::Error;

use super::inline;
use super::map::StepMap;
use crate::node::{Attrs, Mark, Node, NodeModel};

/// Errors raised when a step cannot be applied to a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
	/// No textblock contains the position.
	#[error("no textblock at position {0}")]
	NoTextblock(usize),
	/// The range starts and ends in different textblocks.
	#[error("range {from}..{to} crosses a block boundary")]
	CrossesBlock { from: usize, to: usize },
	/// The range is inverted or past the end of the document.
	#[error("invalid range {from}..{to}")]
	InvalidRange { from: usize, to: usize },
	/// No node starts at the position.
	#[error("no node at position {0}")]
	NoNode(usize),
}

/// An atomic document mutation.
///
/// Steps are applied to an immutable document and produce the next one,
/// together with the position map describing how positions move.
pub trait Step: fmt::Debug + Send + Sync {
	/// Applies the step, returning the changed document.
	fn apply(&self, doc: &Node, model: &dyn NodeModel) -> Result<Node, StepError>;

	/// Position map of this step.
	fn map(&self) -> StepMap;
}

/// Replaces `from..to` inside one textblock with text.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceTextStep {
	pub from: usize,
	pub to: usize,
	pub text: String,
	/// Marks for the inserted text; inherited from the preceding character when `None`.
	pub marks: Option<Vec<Mark>>,
}

impl Step for ReplaceTextStep {
	fn apply(&self, doc: &Node, model: &dyn NodeModel) -> Result<Node, StepError> {
		if self.to < self.from {
			return Err(StepError::InvalidRange {
				from: self.from,
				to: self.to,
			});
		}
		let mut doc = doc.clone();
		let (path, start) =
			locate_textblock(&doc, 0, self.from, model).ok_or(StepError::NoTextblock(self.from))?;
		let block = node_at_path_mut(&mut doc, &path);
		let size = block.content_size(model);
		if self.to > start + size {
			return Err(StepError::CrossesBlock {
				from: self.from,
				to: self.to,
			});
		}

		let mut units = inline::explode(&block.content, model);
		let (a, b) = (self.from - start, self.to - start);
		if !inline::is_boundary(&units, a) || !inline::is_boundary(&units, b) {
			return Err(StepError::InvalidRange {
				from: self.from,
				to: self.to,
			});
		}
		let marks = match &self.marks {
			Some(marks) => marks.clone(),
			None => inline::marks_at(&units, a),
		};
		units.splice(
			a..b,
			self.text.chars().map(|c| inline::Unit::Char(c, marks.clone())),
		);
		block.content = inline::regroup(units);
		Ok(doc)
	}

	fn map(&self) -> StepMap {
		StepMap::replace(self.from, self.to - self.from, self.text.chars().count())
	}
}

/// Adds a mark to all text in `from..to`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddMarkStep {
	pub from: usize,
	pub to: usize,
	pub mark: Mark,
}

impl Step for AddMarkStep {
	fn apply(&self, doc: &Node, model: &dyn NodeModel) -> Result<Node, StepError> {
		edit_textblocks(doc, self.from, self.to, model, |units, a, b| {
			inline::add_mark(units, a, b, &self.mark)
		})
	}

	fn map(&self) -> StepMap {
		StepMap::empty()
	}
}

/// Removes marks of one type from all text in `from..to`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveMarkStep {
	pub from: usize,
	pub to: usize,
	pub mark_type: String,
}

impl Step for RemoveMarkStep {
	fn apply(&self, doc: &Node, model: &dyn NodeModel) -> Result<Node, StepError> {
		edit_textblocks(doc, self.from, self.to, model, |units, a, b| {
			inline::remove_mark(units, a, b, &self.mark_type)
		})
	}

	fn map(&self) -> StepMap {
		StepMap::empty()
	}
}

/// Merges attribute values into the node starting at `pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetNodeAttrsStep {
	pub pos: usize,
	pub attrs: Attrs,
}

impl Step for SetNodeAttrsStep {
	fn apply(&self, doc: &Node, model: &dyn NodeModel) -> Result<Node, StepError> {
		let mut doc = doc.clone();
		let node = node_starting_at_mut(&mut doc, 0, self.pos, model)
			.ok_or(StepError::NoNode(self.pos))?;
		for (key, value) in &self.attrs {
			node.attrs.insert(key.clone(), value.clone());
		}
		Ok(doc)
	}

	fn map(&self) -> StepMap {
		StepMap::empty()
	}
}

/// Replaces the whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceDocStep {
	pub doc: Node,
	/// Content size of the replaced document.
	pub old_size: usize,
	/// Content size of the new document.
	pub new_size: usize,
}

impl Step for ReplaceDocStep {
	fn apply(&self, _doc: &Node, _model: &dyn NodeModel) -> Result<Node, StepError> {
		Ok(self.doc.clone())
	}

	fn map(&self) -> StepMap {
		StepMap::replace(0, self.old_size, self.new_size)
	}
}

/// Finds the textblock whose content contains `pos`.
///
/// Returns the child-index path to the block and the position where its
/// content starts. `base` is the position where `node`'s content starts.
pub(crate) fn locate_textblock(
	node: &Node,
	base: usize,
	pos: usize,
	model: &dyn NodeModel,
) -> Option<(Vec<usize>, usize)> {
	if model.is_textblock(node) {
		return (pos >= base && pos <= base + node.content_size(model)).then(|| (Vec::new(), base));
	}
	let mut offset = base;
	for (index, child) in node.content.iter().enumerate() {
		let end = offset + child.node_size(model);
		if pos > offset && pos < end && !child.is_inline(model) {
			let (mut path, start) = locate_textblock(child, offset + 1, pos, model)?;
			path.insert(0, index);
			return Some((path, start));
		}
		offset = end;
	}
	None
}

fn node_at_path_mut<'a>(mut node: &'a mut Node, path: &[usize]) -> &'a mut Node {
	for &index in path {
		node = &mut node.content[index];
	}
	node
}

fn node_starting_at_mut<'a>(
	node: &'a mut Node,
	base: usize,
	pos: usize,
	model: &dyn NodeModel,
) -> Option<&'a mut Node> {
	let mut offset = base;
	for child in node.content.iter_mut() {
		let size = child.node_size(model);
		if offset == pos {
			return Some(child);
		}
		if pos > offset && pos < offset + size {
			return node_starting_at_mut(child, offset + 1, pos, model);
		}
		offset += size;
	}
	None
}

/// Runs `edit` over the inline units of every textblock overlapping `from..to`.
fn edit_textblocks(
	doc: &Node,
	from: usize,
	to: usize,
	model: &dyn NodeModel,
	mut edit: impl FnMut(&mut [inline::Unit], usize, usize),
) -> Result<Node, StepError> {
	if to < from || to > doc.content_size(model) {
		return Err(StepError::InvalidRange { from, to });
	}
	let mut blocks = Vec::new();
	collect_textblocks(doc, 0, from, to, model, &mut Vec::new(), &mut blocks);

	let mut doc = doc.clone();
	for (path, start) in blocks {
		let block = node_at_path_mut(&mut doc, &path);
		let size = block.content_size(model);
		let a = from.saturating_sub(start).min(size);
		let b = to.saturating_sub(start).min(size);
		if a >= b {
			continue;
		}
		let mut units = inline::explode(&block.content, model);
		if b > units.len() {
			return Err(StepError::InvalidRange { from, to });
		}
		edit(&mut units, a, b);
		block.content = inline::regroup(units);
	}
	Ok(doc)
}

fn collect_textblocks(
	node: &Node,
	base: usize,
	from: usize,
	to: usize,
	model: &dyn NodeModel,
	path: &mut Vec<usize>,
	out: &mut Vec<(Vec<usize>, usize)>,
) {
	let mut offset = base;
	for (index, child) in node.content.iter().enumerate() {
		let end = offset + child.node_size(model);
		if offset >= to {
			break;
		}
		if end > from && !child.is_inline(model) {
			path.push(index);
			if model.is_textblock(child) {
				out.push((path.clone(), offset + 1));
			} else {
				collect_textblocks(child, offset + 1, from, to, model, path, out);
			}
			path.pop();
		}
		offset = end;
	}
}
