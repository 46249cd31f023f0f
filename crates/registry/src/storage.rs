use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;

use crate::fields;
use crate::graph::ExtensionGraph;

/// Side-table of per-extension storage bags, keyed by extension name.
///
/// Owned by the editor instance; descriptors never hold their storage.
#[derive(Debug, Clone, Default)]
pub struct ExtensionStorage {
	bags: HashMap<String, Value>,
}

impl ExtensionStorage {
	/// Creates bags for every extension that declares initial storage.
	pub fn init(graph: &ExtensionGraph) -> Self {
		let bags = graph
			.iter()
			.filter_map(|ext| ext.resolve(fields::STORAGE).map(|v| (ext.name().to_string(), v)))
			.collect();
		Self { bags }
	}

	/// Storage of an extension.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.bags.get(name)
	}

	/// Mutable storage of an extension.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.bags.get_mut(name)
	}

	/// Storage of an extension, created as `null` if missing.
	pub fn entry(&mut self, name: &str) -> &mut Value {
		self.bags.entry(name.to_string()).or_insert(Value::Null)
	}

	/// Number of bags.
	pub fn len(&self) -> usize {
		self.bags.len()
	}

	/// Returns true if no extension has storage.
	pub fn is_empty(&self) -> bool {
		self.bags.is_empty()
	}
}
