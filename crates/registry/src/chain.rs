//! Field resolution along an extension's parent chain.

use serde_json::Value;

use crate::extension::Extension;
use crate::field::{Field, FieldContext, FieldKey};
use crate::fields;
use crate::options::merge_options;

/// An extension and its ancestors, most specialized first.
///
/// Built once per extension. Parent links are immutable `Arc`s, so the
/// walk is finite.
#[derive(Debug, Clone)]
pub struct ParentChain {
	links: Vec<Extension>,
}

impl ParentChain {
	/// Linearizes the chain of `extension`.
	pub fn new(extension: &Extension) -> Self {
		let mut links = vec![extension.clone()];
		let mut current = extension.parent();
		while let Some(parent) = current {
			links.push(parent.clone());
			current = parent.parent();
		}
		Self { links }
	}

	/// The most specialized descriptor.
	pub fn leaf(&self) -> &Extension {
		&self.links[0]
	}

	/// Descriptors from most specialized to root.
	pub fn links(&self) -> &[Extension] {
		&self.links
	}

	/// Number of descriptors in the chain.
	pub fn len(&self) -> usize {
		self.links.len()
	}

	/// Always false: a chain contains at least its leaf.
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Resolves a field for the leaf with the given effective options.
	///
	/// The first descriptor defining the field wins. A computed field is
	/// invoked with `parent` set to the value resolved from the defining
	/// descriptor's parent. Returns `None` when no descriptor defines it.
	pub fn resolve<T>(&self, key: FieldKey<T>, options: &Value) -> Option<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		resolve_from(&self.links, key, self.leaf().name(), options)
	}

	/// Effective options: the resolved options field, then every
	/// `configure` override from root to leaf deep-merged on top.
	pub fn options(&self) -> Value {
		let empty = Value::Object(Default::default());
		let mut options = self.resolve(fields::OPTIONS, &empty).unwrap_or(empty);
		for link in self.links.iter().rev() {
			if let Some(overrides) = link.option_overrides() {
				merge_options(&mut options, overrides);
			}
		}
		options
	}
}

fn resolve_from<T>(links: &[Extension], key: FieldKey<T>, name: &str, options: &Value) -> Option<T>
where
	T: Clone + Send + Sync + 'static,
{
	let (index, field) = links
		.iter()
		.enumerate()
		.find_map(|(i, link)| link.fields().get(key).map(|f| (i, f)))?;
	match field {
		Field::Static(value) => Some(value.clone()),
		Field::Computed(compute) => {
			let parent = resolve_from(&links[index + 1..], key, name, options);
			Some(compute(&FieldContext {
				name,
				options,
				parent,
			}))
		}
	}
}
