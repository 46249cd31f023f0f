//! Extension descriptors and the machinery that orders and resolves them.
//!
//! - [`Extension`]: declarative node, mark or behavior descriptor
//! - [`FieldKey`] / [`Field`]: typed configuration fields, static or computed
//! - [`ParentChain`]: field resolution through specializations
//! - [`ExtensionGraph`]: flattened, priority-sorted, deduplicated extensions
//! - [`ExtensionStorage`]: per-extension storage side-table

pub mod chain;
pub mod error;
pub mod extension;
pub mod field;
pub mod fields;
pub mod graph;
pub mod options;
pub mod storage;

#[cfg(test)]
mod tests;

pub use chain::ParentChain;
pub use error::RegistryError;
pub use extension::{Extension, ExtensionId, ExtensionKind};
pub use field::{ComputeFn, Field, FieldContext, FieldKey};
pub use graph::{
	ExtensionGraph, ResolvedExtension, dedup, flatten, flatten_with, sort_by_priority,
};
pub use options::merge_options;
pub use storage::ExtensionStorage;
