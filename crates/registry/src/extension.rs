use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::chain::ParentChain;
use crate::field::{Field, FieldContext, FieldKey, FieldTable};

/// What an extension describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
	/// A document node type.
	Node,
	/// An inline mark type.
	Mark,
	/// Cross-cutting behavior (commands, plugins, global attributes).
	Behavior,
}

impl ExtensionKind {
	/// Priority used when an extension does not set one.
	///
	/// Behaviors sort ahead of types so their commands and plugins register
	/// first; nodes and marks keep declaration order among themselves.
	pub const fn default_priority(self) -> i32 {
		match self {
			Self::Node | Self::Mark => 100,
			Self::Behavior => 1000,
		}
	}
}

impl core::fmt::Display for ExtensionKind {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Self::Node => write!(f, "node"),
			Self::Mark => write!(f, "mark"),
			Self::Behavior => write!(f, "behavior"),
		}
	}
}

/// Identity of an extension descriptor.
///
/// Clones and builder calls keep the id; [`Extension::extend`] and
/// [`Extension::configure`] mint a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionId(u64);

impl ExtensionId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

/// Declarative description of a node type, mark type or behavior.
///
/// # Example
///
/// ```
/// use quire_registry::{Extension, Field, FieldKey};
///
/// const CONTENT: FieldKey<String> = FieldKey::new("content");
///
/// let paragraph = Extension::node("paragraph").field(CONTENT, Field::Static("text*".into()));
/// let custom = paragraph.extend().with_priority(200);
///
/// assert_eq!(custom.name(), "paragraph");
/// assert_eq!(custom.chain().resolve(CONTENT, &serde_json::json!({})).as_deref(), Some("text*"));
/// ```
#[derive(Clone)]
pub struct Extension {
	id: ExtensionId,
	name: String,
	kind: ExtensionKind,
	priority: i32,
	fields: Arc<FieldTable>,
	option_overrides: Option<Value>,
	parent: Option<Arc<Extension>>,
}

impl core::fmt::Debug for Extension {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		let mut fields: Vec<_> = self.fields.names().collect();
		fields.sort_unstable();
		f.debug_struct("Extension")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("priority", &self.priority)
			.field("fields", &fields)
			.field("parent", &self.parent.as_ref().map(|p| p.id))
			.finish()
	}
}

impl Extension {
	/// Creates an extension of the given kind.
	pub fn new(name: impl Into<String>, kind: ExtensionKind) -> Self {
		Self {
			id: ExtensionId::next(),
			name: name.into(),
			kind,
			priority: kind.default_priority(),
			fields: Arc::default(),
			option_overrides: None,
			parent: None,
		}
	}

	/// Creates a node extension.
	pub fn node(name: impl Into<String>) -> Self {
		Self::new(name, ExtensionKind::Node)
	}

	/// Creates a mark extension.
	pub fn mark(name: impl Into<String>) -> Self {
		Self::new(name, ExtensionKind::Mark)
	}

	/// Creates a behavior extension.
	pub fn behavior(name: impl Into<String>) -> Self {
		Self::new(name, ExtensionKind::Behavior)
	}

	/// Sets the priority (higher sorts first).
	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	/// Renames the extension.
	pub fn rename(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	/// Defines a field on this descriptor.
	pub fn field<T>(mut self, key: FieldKey<T>, field: Field<T>) -> Self
	where
		T: Send + Sync + 'static,
	{
		Arc::make_mut(&mut self.fields).insert(key, field);
		self
	}

	/// Defines a computed field.
	pub fn computed<T>(
		self,
		key: FieldKey<T>,
		f: impl Fn(&FieldContext<'_, T>) -> T + Send + Sync + 'static,
	) -> Self
	where
		T: Send + Sync + 'static,
	{
		self.field(key, Field::computed(f))
	}

	/// Creates a specialization inheriting every field, name, kind and priority.
	pub fn extend(&self) -> Extension {
		Extension {
			id: ExtensionId::next(),
			name: self.name.clone(),
			kind: self.kind,
			priority: self.priority,
			fields: Arc::default(),
			option_overrides: None,
			parent: Some(Arc::new(self.clone())),
		}
	}

	/// Creates a specialization whose options are deep-merged with `overrides`.
	pub fn configure(&self, overrides: Value) -> Extension {
		let mut child = self.extend();
		child.option_overrides = Some(overrides);
		child
	}

	/// Identity of this descriptor.
	pub fn id(&self) -> ExtensionId {
		self.id
	}

	/// Name of the extension.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Kind of the extension.
	pub fn kind(&self) -> ExtensionKind {
		self.kind
	}

	/// Sort priority of the extension.
	pub fn priority(&self) -> i32 {
		self.priority
	}

	/// Descriptor this one specializes.
	pub fn parent(&self) -> Option<&Extension> {
		self.parent.as_deref()
	}

	/// Linearized parent chain, most specialized first.
	pub fn chain(&self) -> ParentChain {
		ParentChain::new(self)
	}

	/// Returns true if `other` is this descriptor or one of its ancestors.
	pub fn specializes(&self, other: &Extension) -> bool {
		let mut current = Some(self);
		while let Some(ext) = current {
			if ext.id == other.id {
				return true;
			}
			current = ext.parent();
		}
		false
	}

	pub(crate) fn fields(&self) -> &FieldTable {
		&self.fields
	}

	pub(crate) fn option_overrides(&self) -> Option<&Value> {
		self.option_overrides.as_ref()
	}
}
