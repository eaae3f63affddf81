use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::BuiltinTag;
use crate::TagDefinition;

/// Maps tag names to their definitions.
///
/// Registration overwrites any previous definition with the same name, so
/// caller supplied tags replace the built-ins. There is no removal: a
/// registry is assembled once and then only read.
#[derive(Clone, Default)]
pub struct TagRegistry {
	definitions: BTreeMap<String, Arc<dyn TagDefinition>>,
}

impl TagRegistry {
	/// An empty registry without the built-in tags.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding the built-in `query` and `datasource` tags.
	pub fn builtin() -> Self {
		let mut registry = Self::new();
		for tag in BuiltinTag::ALL {
			registry.register(tag.name(), Arc::new(tag));
		}
		registry
	}

	/// Insert a definition, replacing any existing one with the same name.
	pub fn register(&mut self, name: impl Into<String>, definition: Arc<dyn TagDefinition>) {
		let name = name.into();
		if self.definitions.insert(name.clone(), definition).is_some() {
			tracing::debug!(tag = %name, "overriding tag definition");
		}
	}

	/// Builder style [`register`](Self::register).
	#[must_use]
	pub fn with(mut self, name: impl Into<String>, definition: Arc<dyn TagDefinition>) -> Self {
		self.register(name, definition);
		self
	}

	pub fn resolve(&self, name: &str) -> Option<&dyn TagDefinition> {
		self.definitions.get(name).map(AsRef::as_ref)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.definitions.contains_key(name)
	}

	/// Merge `other` into this registry. Definitions from `other` win.
	#[must_use]
	pub fn merge(mut self, other: TagRegistry) -> Self {
		for (name, definition) in other.definitions {
			self.register(name, definition);
		}
		self
	}

	/// Registered tag names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.definitions.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

impl fmt::Debug for TagRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TagRegistry")
			.field("tags", &self.definitions.keys().collect::<Vec<_>>())
			.finish()
	}
}
