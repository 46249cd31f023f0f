//! Document primitives for the quire kernel: nodes, marks, steps, transactions.
//!
//! This is a small reference substrate. The kernel talks to it through the
//! [`NodeModel`], [`Step`] and [`DomNode`] seams, so a host can supply a
//! richer document engine.

/// DOM element access for parse rules.
pub mod dom;
/// Document tree in its exchange shape.
pub mod node;
/// Text selection.
pub mod selection;
/// Editor state snapshots.
pub mod state;
/// Steps, position maps and transactions.
pub mod transaction;

pub use dom::{DomNode, Element};
pub use node::{Attrs, Mark, Node, NodeModel, StructuralModel, TEXT_TYPE};
pub use selection::Selection;
pub use state::EditorState;
pub use transaction::{
	AddMarkStep, Bias, MapRange, MapResult, RemoveMarkStep, ReplaceDocStep, ReplaceTextStep,
	SetNodeAttrsStep, Step, StepError, StepMap, Transaction, map_through,
};
