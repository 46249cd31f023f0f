use indexmap::IndexMap;


/// Read access to a DOM element supplied by the host.
pub trait DomNode {
	/// Lowercase tag name.
	fn tag_name(&self) -> &str;

	/// Raw value of an attribute.
	fn attribute(&self, name: &str) -> Option<&str>;

	/// Value of an inline style property.
	fn style(&self, property: &str) -> Option<&str> {
		self.attribute("style")?
			.split(';')
			.filter_map(|decl| decl.split_once(':'))
			.find(|(name, _)| name.trim().eq_ignore_ascii_case(property))
			.map(|(_, value)| value.trim())
	}
}

/// Owned element used by hosts without a DOM and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
	tag: String,
	attributes: IndexMap<String, String>,
}

impl Element {
	/// Creates an element without attributes.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into().to_ascii_lowercase(),
			attributes: IndexMap::new(),
		}
	}

	/// Sets an attribute.
	pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// All attributes in insertion order.
	pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
		self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl DomNode for Element {
	fn tag_name(&self) -> &str {
		&self.tag
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}
}
