use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::AttributeSchema;
use crate::AttributeSpec;
use crate::AttributeType;
use crate::AttributeValue;
use crate::BodyMode;
use crate::ElementTag;
use crate::TagRegistry;
use crate::TbdocError;
use crate::TbdocResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["tbdoc.toml", ".tbdoc.toml", ".config/tbdoc.toml"];

/// Configuration loaded from a `tbdoc.toml` file.
///
/// ```toml
/// [tags.note]
/// render = "aside"
/// body = "markdown"
///
/// [tags.note.attributes.title]
/// type = "string"
/// required = true
/// default = "Note"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TbdocConfig {
	/// Extra tags keyed by tag name. A name shared with a built-in tag
	/// replaces it.
	#[serde(default)]
	pub tags: BTreeMap<String, TagConfig>,
}

/// A tag declared in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TagConfig {
	/// The HTML element the tag renders as.
	pub render: String,
	#[serde(default)]
	pub body: BodyMode,
	#[serde(default)]
	pub attributes: BTreeMap<String, AttributeConfig>,
}

/// An attribute accepted by a configured tag.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AttributeConfig {
	#[serde(rename = "type")]
	pub r#type: AttributeType,
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub default: Option<AttributeValue>,
}

impl TbdocConfig {
	/// Return the path of the first config file found at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no candidate exists.
	pub fn load(root: &Path) -> TbdocResult<Option<TbdocConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn load_file(path: &Path) -> TbdocResult<TbdocConfig> {
		tracing::debug!(path = %path.display(), "loading config");
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	pub fn from_toml_str(content: &str) -> TbdocResult<TbdocConfig> {
		let config: TbdocConfig =
			toml::from_str(content).map_err(|e| TbdocError::ConfigParse(e.to_string()))?;
		config.validate()?;

		Ok(config)
	}

	fn validate(&self) -> TbdocResult<()> {
		for (name, tag) in &self.tags {
			if tag.render.trim().is_empty() {
				return Err(TbdocError::ConfigParse(format!(
					"tag `{name}` must declare a non-empty `render` element"
				)));
			}

			for (attribute, config) in &tag.attributes {
				let Some(default) = &config.default else {
					continue;
				};
				if default.r#type() != config.r#type {
					return Err(TbdocError::ConfigParse(format!(
						"default of attribute `{attribute}` on tag `{name}` must be a {}, found {}",
						config.r#type,
						default.r#type()
					)));
				}
			}
		}

		Ok(())
	}

	/// Build an [`ElementTag`] for every configured tag.
	pub fn tag_definitions(&self) -> TbdocResult<BTreeMap<String, ElementTag>> {
		self.validate()?;

		Ok(self
			.tags
			.iter()
			.map(|(name, tag)| (name.clone(), tag.to_element_tag()))
			.collect())
	}

	/// The built-in registry with the configured tags merged over it.
	pub fn registry(&self) -> TbdocResult<TagRegistry> {
		let configured = self
			.tag_definitions()?
			.into_iter()
			.fold(TagRegistry::new(), |registry, (name, tag)| {
				registry.with(name, Arc::new(tag))
			});

		Ok(TagRegistry::builtin().merge(configured))
	}
}

impl TagConfig {
	pub fn to_element_tag(&self) -> ElementTag {
		let schema = self
			.attributes
			.iter()
			.fold(AttributeSchema::new(), |schema, (name, config)| {
				schema.with(name.as_str(), config.to_spec())
			});

		ElementTag::new(&self.render)
			.with_schema(schema)
			.with_body(self.body)
	}
}

impl AttributeConfig {
	pub fn to_spec(&self) -> AttributeSpec {
		AttributeSpec {
			r#type: self.r#type,
			required: self.required,
			default: self.default.clone(),
		}
	}
}
