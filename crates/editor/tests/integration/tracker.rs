use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quire_editor::{PositionTracker, TrackedPosition};
use quire_primitives::{EditorState, Node, StructuralModel, Transaction};

/// `<p>hello world</p>`: text positions 1..=12.
fn transaction() -> Transaction {
	let doc = Node::with_content(
		"doc",
		vec![Node::with_content("paragraph", vec![Node::text("hello world")])],
	);
	EditorState::new(doc, Arc::new(StructuralModel::default())).tr()
}

fn tracked(pos: usize, deleted: bool) -> TrackedPosition {
	TrackedPosition { pos, deleted }
}

#[test]
fn test_fresh_tracker_is_identity() {
	let tr = transaction();
	let tracker = PositionTracker::new(&tr);
	assert_eq!(tracker.map(&tr, 7), tracked(7, false));
}

#[test]
fn test_insert_before_shifts() {
	let mut tr = transaction();
	let tracker = PositionTracker::new(&tr);
	tr.insert_text(1, "oh, ").unwrap();

	assert_eq!(tracker.map(&tr, 7), tracked(11, false));
	assert_eq!(tracker.map(&tr, 1), tracked(5, false));
}

#[test]
fn test_deletion_is_sticky() {
	let mut tr = transaction();
	let tracker = PositionTracker::new(&tr);

	tr.delete(2, 5).unwrap();
	assert_eq!(tracker.map(&tr, 3), tracked(2, true));
	assert_eq!(tracker.map(&tr, 1), tracked(1, false));
	assert_eq!(tracker.map(&tr, 5), tracked(2, false));

	tr.insert_text(6, "!").unwrap();
	assert_eq!(tracker.map(&tr, 3), tracked(2, true));
	assert_eq!(tracker.map(&tr, 9), tracked(7, false));
}

#[test]
fn test_checkpoint_skips_earlier_steps() {
	let mut tr = transaction();
	tr.insert_text(1, "ab").unwrap();
	let tracker = PositionTracker::new(&tr);
	assert_eq!(tracker.checkpoint(), 1);

	tr.delete(1, 3).unwrap();
	assert_eq!(tracker.map(&tr, 3), tracked(1, false));
	assert_eq!(tracker.map(&tr, 2), tracked(1, true));
}

proptest! {
	#[test]
	fn prop_fresh_tracker_is_identity(pos in 0usize..=13) {
		let tr = transaction();
		let tracker = PositionTracker::new(&tr);
		prop_assert_eq!(tracker.map(&tr, pos), tracked(pos, false));
	}

	/// Positions at or after an insertion move right by its length.
	#[test]
	fn prop_insertion_shifts_right(at in 1usize..=12, pos in 0usize..=13, len in 1usize..5) {
		let mut tr = transaction();
		let tracker = PositionTracker::new(&tr);
		tr.insert_text(at, &"x".repeat(len)).unwrap();

		let expected = if pos < at { pos } else { pos + len };
		prop_assert_eq!(tracker.map(&tr, pos), tracked(expected, false));
	}

	/// Once deleted, a position stays deleted through later steps.
	#[test]
	fn prop_deletion_stays_deleted(from in 1usize..6, len in 2usize..5, extra in 1usize..4) {
		let mut tr = transaction();
		let tracker = PositionTracker::new(&tr);
		let inside = from + 1;
		tr.delete(from, from + len).unwrap();
		prop_assert!(tracker.map(&tr, inside).deleted);

		tr.insert_text(1, &"y".repeat(extra)).unwrap();
		prop_assert!(tracker.map(&tr, inside).deleted);
	}
}
