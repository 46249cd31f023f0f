use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;

/// Typed handle to a configuration field.
///
/// Keys are declared as constants by the crate that owns the field's
/// semantics; the registry itself only knows the options, storage and
/// nested-extension fields.
pub struct FieldKey<T> {
	name: &'static str,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Clone for FieldKey<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for FieldKey<T> {}

impl<T> core::fmt::Debug for FieldKey<T> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("FieldKey").field(&self.name).finish()
	}
}

impl<T> FieldKey<T> {
	/// Declares a field key.
	pub const fn new(name: &'static str) -> Self {
		Self {
			name,
			_marker: PhantomData,
		}
	}

	/// Name of the field.
	pub const fn name(&self) -> &'static str {
		self.name
	}
}

/// Context a computed field is invoked with.
pub struct FieldContext<'a, T> {
	/// Name of the extension the field is resolved for.
	pub name: &'a str,
	/// Effective options of that extension.
	pub options: &'a Value,
	/// Value of the same field resolved from the defining descriptor's parent.
	pub parent: Option<T>,
}

impl<T> FieldContext<'_, T> {
	/// Reads an option by key.
	pub fn option(&self, key: &str) -> Option<&Value> {
		self.options.get(key)
	}
}

/// Function computing a field value.
pub type ComputeFn<T> = Arc<dyn Fn(&FieldContext<'_, T>) -> T + Send + Sync>;

/// A configuration field: a static value or a function of its context.
pub enum Field<T> {
	/// Value used as-is.
	Static(T),
	/// Value computed on resolution.
	Computed(ComputeFn<T>),
}

impl<T> Clone for Field<T>
where
	T: Clone,
{
	fn clone(&self) -> Self {
		match self {
			Self::Static(v) => Self::Static(v.clone()),
			Self::Computed(f) => Self::Computed(f.clone()),
		}
	}
}

impl<T> Field<T> {
	/// Wraps a closure as a computed field.
	pub fn computed(f: impl Fn(&FieldContext<'_, T>) -> T + Send + Sync + 'static) -> Self {
		Self::Computed(Arc::new(f))
	}

	/// Returns the value, invoking a computed field with `ctx`.
	pub fn evaluate(&self, ctx: &FieldContext<'_, T>) -> T
	where
		T: Clone,
	{
		match self {
			Self::Static(v) => v.clone(),
			Self::Computed(f) => f(ctx),
		}
	}
}

/// Heterogeneous table of fields keyed by field name.
#[derive(Clone, Default)]
pub(crate) struct FieldTable {
	entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl FieldTable {
	pub(crate) fn insert<T>(&mut self, key: FieldKey<T>, field: Field<T>)
	where
		T: Send + Sync + 'static,
	{
		self.entries.insert(key.name(), Arc::new(field));
	}

	pub(crate) fn get<T>(&self, key: FieldKey<T>) -> Option<&Field<T>>
	where
		T: Send + Sync + 'static,
	{
		let entry = self.entries.get(key.name())?;
		let field = (**entry).downcast_ref::<Field<T>>();
		if field.is_none() {
			tracing::warn!(
				field = key.name(),
				expected = std::any::type_name::<T>(),
				"field stored with a different type; treating as undefined",
			);
		}
		field
	}

	pub(crate) fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.entries.keys().copied()
	}
}
