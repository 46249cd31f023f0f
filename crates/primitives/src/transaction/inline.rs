//! Character-level editing of a textblock's inline content.

use crate::node::{Mark, Node, NodeModel};

/// One position of inline content.
#[derive(Debug, Clone)]
pub(super) enum Unit {
	Char(char, Vec<Mark>),
	/// A non-text child, at its first position.
	Node(Node),
	/// A later position covered by the preceding [`Unit::Node`].
	Covered,
}

/// Splits inline children into one unit per position.
///
/// A non-text child spans its full `node_size`, so unit indices and
/// content offsets stay aligned.
pub(super) fn explode(children: &[Node], model: &dyn NodeModel) -> Vec<Unit> {
	let mut units = Vec::new();
	for child in children {
		match &child.text {
			Some(text) => units.extend(text.chars().map(|c| Unit::Char(c, child.marks.clone()))),
			None => {
				units.push(Unit::Node(child.clone()));
				units.extend((1..child.node_size(model)).map(|_| Unit::Covered));
			}
		}
	}
	units
}

/// Returns true if `offset` lies between units rather than inside a child node.
pub(super) fn is_boundary(units: &[Unit], offset: usize) -> bool {
	offset <= units.len() && !matches!(units.get(offset), Some(Unit::Covered))
}

/// Joins runs of characters sharing the same marks back into text nodes.
pub(super) fn regroup(units: Vec<Unit>) -> Vec<Node> {
	let mut out: Vec<Node> = Vec::new();
	for unit in units {
		match unit {
			Unit::Char(c, marks) => {
				if let Some(last) = out.last_mut()
					&& let Some(text) = last.text.as_mut()
					&& last.marks == marks
				{
					text.push(c);
					continue;
				}
				out.push(Node::text(c.to_string()).with_marks(marks));
			}
			Unit::Node(node) => out.push(node),
			Unit::Covered => {}
		}
	}
	out
}

/// Marks that text inserted at `offset` inherits.
pub(super) fn marks_at(units: &[Unit], offset: usize) -> Vec<Mark> {
	let before = offset.checked_sub(1).and_then(|i| units.get(i));
	match before.or_else(|| units.get(offset)) {
		Some(Unit::Char(_, marks)) => marks.clone(),
		_ => Vec::new(),
	}
}

/// Adds `mark` to every character in `from..to`, replacing a mark of the same type.
pub(super) fn add_mark(units: &mut [Unit], from: usize, to: usize, mark: &Mark) {
	for unit in &mut units[from..to] {
		let Unit::Char(_, marks) = unit else { continue };
		match marks.iter_mut().find(|m| m.type_name == mark.type_name) {
			Some(existing) => *existing = mark.clone(),
			None => marks.push(mark.clone()),
		}
	}
}

/// Removes marks of `type_name` from every character in `from..to`.
pub(super) fn remove_mark(units: &mut [Unit], from: usize, to: usize, type_name: &str) {
	for unit in &mut units[from..to] {
		if let Unit::Char(_, marks) = unit {
			marks.retain(|m| m.type_name != type_name);
		}
	}
}
