//! Flattening, ordering and deduplication of extension lists.

use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;
use tracing::{debug, debug_span, trace};

use crate::chain::ParentChain;
use crate::error::RegistryError;
use crate::extension::{Extension, ExtensionKind};
use crate::field::FieldKey;
use crate::fields;

/// Expands nested extensions depth-first, in place after their owner.
///
/// Sibling order is preserved and duplicates are kept. A descriptor whose
/// name reappears on its own expansion path is rejected.
pub fn flatten(extensions: &[Extension]) -> Result<Vec<Extension>, RegistryError> {
	flatten_with(extensions, &mut |ext: &Extension| Some(ext.clone()))
}

/// [`flatten`], passing every descriptor through `adjust` before expanding it.
///
/// `adjust` may replace a descriptor (e.g. with a configured specialization)
/// or return `None` to drop it together with everything it nests.
pub fn flatten_with(
	extensions: &[Extension],
	adjust: &mut dyn FnMut(&Extension) -> Option<Extension>,
) -> Result<Vec<Extension>, RegistryError> {
	let mut out = Vec::with_capacity(extensions.len());
	let mut path = Vec::new();
	for extension in extensions {
		visit(extension, adjust, &mut path, &mut out)?;
	}
	Ok(out)
}

fn visit(
	extension: &Extension,
	adjust: &mut dyn FnMut(&Extension) -> Option<Extension>,
	path: &mut Vec<String>,
	out: &mut Vec<Extension>,
) -> Result<(), RegistryError> {
	if extension.name().is_empty() {
		return Err(RegistryError::EmptyName);
	}
	if path.iter().any(|name| name == extension.name()) {
		let mut cycle = path.clone();
		cycle.push(extension.name().to_string());
		return Err(RegistryError::NestingCycle {
			path: cycle.join(" -> "),
		});
	}
	let Some(extension) = adjust(extension) else {
		trace!(name = extension.name(), "descriptor dropped while flattening");
		return Ok(());
	};

	out.push(extension.clone());

	let chain = extension.chain();
	let options = chain.options();
	let Some(nested) = chain.resolve(fields::EXTENSIONS, &options) else {
		return Ok(());
	};
	path.push(extension.name().to_string());
	for child in &nested {
		visit(child, adjust, path, out)?;
	}
	path.pop();
	Ok(())
}

/// Stable sort by descending priority; ties keep their order.
pub fn sort_by_priority(mut extensions: Vec<Extension>) -> Vec<Extension> {
	extensions.sort_by(|a, b| b.priority().cmp(&a.priority()));
	extensions
}

/// Keeps one descriptor per name.
///
/// When two descriptors share a name and one specializes the other, the
/// specialization is kept in the slot of the first one seen. Unrelated
/// descriptors sharing a name are a configuration error, whatever their kinds.
pub fn dedup(sorted: Vec<Extension>) -> Result<Vec<Extension>, RegistryError> {
	let mut out: Vec<Extension> = Vec::with_capacity(sorted.len());
	let mut by_name: HashMap<String, usize> = HashMap::default();

	for extension in sorted {
		let Some(&index) = by_name.get(extension.name()) else {
			by_name.insert(extension.name().to_string(), out.len());
			out.push(extension);
			continue;
		};
		let existing = &out[index];
		if existing.specializes(&extension) {
			trace!(name = extension.name(), "descriptor shadowed by its specialization");
		} else if extension.specializes(existing) {
			debug!(
				name = extension.name(),
				priority = extension.priority(),
				"specialization replaces higher-priority ancestor"
			);
			out[index] = extension;
		} else {
			return Err(RegistryError::DuplicateName {
				name: extension.name().to_string(),
				first: existing.kind(),
				second: extension.kind(),
			});
		}
	}
	Ok(out)
}

/// An extension with its linearized chain and effective options.
#[derive(Debug, Clone)]
pub struct ResolvedExtension {
	chain: ParentChain,
	options: Value,
}

impl ResolvedExtension {
	fn new(extension: Extension) -> Self {
		let chain = extension.chain();
		let options = chain.options();
		Self { chain, options }
	}

	/// The most specialized descriptor.
	pub fn extension(&self) -> &Extension {
		self.chain.leaf()
	}

	/// Name of the extension.
	pub fn name(&self) -> &str {
		self.extension().name()
	}

	/// Kind of the extension.
	pub fn kind(&self) -> ExtensionKind {
		self.extension().kind()
	}

	/// Sort priority.
	pub fn priority(&self) -> i32 {
		self.extension().priority()
	}

	/// Effective options.
	pub fn options(&self) -> &Value {
		&self.options
	}

	/// Parent chain, most specialized first.
	pub fn chain(&self) -> &ParentChain {
		&self.chain
	}

	/// Resolves a field with this extension's effective options.
	pub fn resolve<T>(&self, key: FieldKey<T>) -> Option<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		self.chain.resolve(key, &self.options)
	}
}

/// Flattened, sorted and deduplicated extensions with precomputed chains.
#[derive(Debug, Clone, Default)]
pub struct ExtensionGraph {
	entries: Vec<ResolvedExtension>,
}

impl ExtensionGraph {
	/// Builds the graph from a declaration list.
	///
	/// The result depends only on the order of `extensions`.
	pub fn build(extensions: &[Extension]) -> Result<Self, RegistryError> {
		Self::build_with(extensions, &mut |ext: &Extension| Some(ext.clone()))
	}

	/// Builds the graph, adjusting descriptors as in [`flatten_with`].
	pub fn build_with(
		extensions: &[Extension],
		adjust: &mut dyn FnMut(&Extension) -> Option<Extension>,
	) -> Result<Self, RegistryError> {
		let _span = debug_span!("extension_graph", declared = extensions.len()).entered();

		let flat = flatten_with(extensions, adjust)?;
		let flattened = flat.len();
		let unique = dedup(sort_by_priority(flat))?;
		let entries: Vec<_> = unique.into_iter().map(ResolvedExtension::new).collect();

		debug!(flattened, unique = entries.len(), "extension graph built");
		Ok(Self { entries })
	}

	/// All extensions in priority order.
	pub fn iter(&self) -> impl Iterator<Item = &ResolvedExtension> {
		self.entries.iter()
	}

	/// Extensions of one kind, in priority order.
	pub fn of_kind(&self, kind: ExtensionKind) -> impl Iterator<Item = &ResolvedExtension> {
		self.entries.iter().filter(move |e| e.kind() == kind)
	}

	/// Looks up an extension by name.
	pub fn get(&self, name: &str) -> Option<&ResolvedExtension> {
		self.entries.iter().find(|e| e.name() == name)
	}

	/// Number of extensions.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if there are no extensions.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
