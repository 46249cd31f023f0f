//! Editor configuration loaded from TOML.
//!
//! ```toml
//! editable = true
//! disabled = ["italic"]
//!
//! [extensions.heading]
//! levels = [1, 2]
//!
//! [[specialize]]
//! name = "emphasis"
//! extends = "italic"
//! priority = 200
//! options = { class = "em" }
//! ```
//!
//! Option overrides under `[extensions]` are applied with
//! [`Extension::configure`] to the descriptor that wins its name.
//! Specializations are extended from a declared extension or from another
//! specialization; a specialization named after its base replaces it.
//! Unknown names produce [`ConfigWarning`]s rather than errors.


use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use quire_registry::{
	Extension, ExtensionGraph, ExtensionId, RegistryError, dedup, flatten, flatten_with,
	sort_by_priority,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Editor construction settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
	/// Whether the document accepts user edits.
	pub editable: bool,
	/// Whether the built-in command behavior is added.
	pub enable_core_extensions: bool,
	/// Whether replacement content is checked against the schema.
	pub enable_content_check: bool,
	/// Extensions removed from the graph, nested ones included.
	pub disabled: Vec<String>,
	/// Option overrides by extension name.
	pub extensions: BTreeMap<String, Value>,
	/// Named specializations.
	pub specialize: Vec<Specialization>,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			editable: true,
			enable_core_extensions: true,
			enable_content_check: true,
			disabled: Vec::new(),
			extensions: BTreeMap::new(),
			specialize: Vec::new(),
		}
	}
}

/// A specialization of an extension declared in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Specialization {
	pub name: String,
	/// Extension or specialization this one extends.
	pub extends: String,
	pub priority: Option<i32>,
	/// Option overrides merged over the base's options.
	pub options: Option<Value>,
}

/// Non-fatal problem found while applying a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	/// A name matched no declared extension or specialization.
	UnknownExtension {
		name: String,
		/// Configuration section the name appeared in.
		section: &'static str,
	},
}

impl fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigWarning::UnknownExtension { name, section } => {
				write!(f, "'{name}' in {section} matches no extension and will be ignored")
			}
		}
	}
}

/// Errors raised while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	/// Specializations extend each other in a loop.
	#[error("specialization cycle: {path}")]
	ParentCycle { path: String },

	/// A specialization extends a name that is not declared.
	#[error("specialization '{name}' extends unknown extension '{extends}'")]
	UnknownBase { name: String, extends: String },

	#[error(transparent)]
	Registry(#[from] RegistryError),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parses a configuration from TOML text.
pub fn parse_config_str(input: &str) -> Result<EditorConfig> {
	Ok(toml::from_str(input)?)
}

/// Reads and parses a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<EditorConfig> {
	let path = path.as_ref();
	let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	parse_config_str(&input)
}

impl EditorConfig {
	/// Builds the extension graph for `declared` under this configuration.
	///
	/// Specializations are appended after the declared list, disabled names
	/// are dropped during flattening, and option overrides are applied to
	/// the descriptor that survives deduplication for each name.
	pub fn build_graph(
		&self,
		declared: &[Extension],
	) -> Result<(ExtensionGraph, Vec<ConfigWarning>)> {
		let flat = flatten(declared)?;
		let mut all = declared.to_vec();
		let mut resolved = FxHashMap::default();
		for def in &self.specialize {
			let ext = self.specialization(&def.name, &flat, &mut resolved, &mut Vec::new())?;
			all.push(ext);
		}

		let known: FxHashSet<&str> = flat
			.iter()
			.map(Extension::name)
			.chain(self.specialize.iter().map(|s| s.name.as_str()))
			.collect();
		let warnings = self.warnings(&known);

		let disabled: FxHashSet<&str> = self.disabled.iter().map(String::as_str).collect();
		let enabled = |ext: &Extension| (!disabled.contains(ext.name())).then(|| ext.clone());

		let winners: FxHashMap<String, ExtensionId> =
			dedup(sort_by_priority(flatten_with(&all, &mut |ext: &Extension| enabled(ext))?))?
				.into_iter()
				.map(|ext| (ext.name().to_string(), ext.id()))
				.collect();

		let mut configured: FxHashMap<ExtensionId, Extension> = FxHashMap::default();
		let graph = ExtensionGraph::build_with(&all, &mut |ext: &Extension| {
			let ext = enabled(ext)?;
			let Some(overrides) = self.extensions.get(ext.name()) else {
				return Some(ext);
			};
			if winners.get(ext.name()) != Some(&ext.id()) {
				return Some(ext);
			}
			Some(
				configured
					.entry(ext.id())
					.or_insert_with(|| {
						debug!(extension = %ext.name(), "applying option overrides");
						ext.configure(overrides.clone())
					})
					.clone(),
			)
		})?;

		Ok((graph, warnings))
	}

	fn warnings(&self, known: &FxHashSet<&str>) -> Vec<ConfigWarning> {
		let sections = self
			.extensions
			.keys()
			.map(|name| (name, "[extensions]"))
			.chain(self.disabled.iter().map(|name| (name, "disabled")));

		let mut warnings = Vec::new();
		for (name, section) in sections {
			if !known.contains(name.as_str()) {
				let warning = ConfigWarning::UnknownExtension {
					name: name.clone(),
					section,
				};
				warn!(%warning, "config warning");
				warnings.push(warning);
			}
		}
		warnings
	}

	/// Resolves a specialization by name, memoized in `resolved`.
	///
	/// `stack` holds the specializations currently being resolved.
	fn specialization(
		&self,
		name: &str,
		declared: &[Extension],
		resolved: &mut FxHashMap<String, Extension>,
		stack: &mut Vec<String>,
	) -> Result<Extension> {
		if let Some(ext) = resolved.get(name) {
			return Ok(ext.clone());
		}
		if stack.iter().any(|n| n == name) {
			stack.push(name.to_string());
			return Err(ConfigError::ParentCycle {
				path: stack.join(" -> "),
			});
		}
		let Some(def) = self.specialize.iter().find(|s| s.name == name) else {
			return Err(ConfigError::UnknownBase {
				name: stack.last().cloned().unwrap_or_default(),
				extends: name.to_string(),
			});
		};

		stack.push(name.to_string());
		let extends_spec =
			def.extends != def.name && self.specialize.iter().any(|s| s.name == def.extends);
		let base = if extends_spec {
			self.specialization(&def.extends, declared, resolved, stack)?
		} else {
			declared
				.iter()
				.find(|ext| ext.name() == def.extends)
				.cloned()
				.ok_or_else(|| ConfigError::UnknownBase {
					name: def.name.clone(),
					extends: def.extends.clone(),
				})?
		};
		stack.pop();

		let mut ext = match &def.options {
			Some(options) => base.configure(options.clone()),
			None => base.extend(),
		}
		.rename(&def.name);
		if let Some(priority) = def.priority {
			ext = ext.with_priority(priority);
		}
		resolved.insert(def.name.clone(), ext.clone());
		Ok(ext)
	}
}
