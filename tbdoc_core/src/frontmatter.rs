use derive_more::Deref;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::TbdocError;
use crate::TbdocResult;

/// Decoded frontmatter metadata of a document.
///
/// Documents without frontmatter decode to an empty mapping, so callers can
/// always iterate the metadata without checking for its presence first.
#[derive(Debug, Clone, Default, PartialEq, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(Map<String, Value>);

impl Frontmatter {
	/// Decode the raw frontmatter captured by the parser.
	///
	/// Absent or blank input and a YAML `null` document decode to the empty
	/// mapping. Anything that is not a mapping is an error.
	pub fn decode(raw: Option<&str>) -> TbdocResult<Self> {
		let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
			return Ok(Self::default());
		};

		let value: Value = serde_yaml_ng::from_str(raw)
			.map_err(|e| TbdocError::FrontmatterDecode(e.to_string()))?;

		match value {
			Value::Object(map) => Ok(Self(map)),
			Value::Null => Ok(Self::default()),
			other => {
				Err(TbdocError::FrontmatterDecode(format!(
					"expected a mapping, found {}",
					value_kind(&other)
				)))
			}
		}
	}

	/// A string value, or `None` when absent or not a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}

	/// The document name declared with `name:`.
	pub fn name(&self) -> Option<&str> {
		self.get_str("name")
	}

	/// The resource kind declared with `type:`, e.g. `datasource` or `pipe`.
	pub fn kind(&self) -> Option<&str> {
		self.get_str("type")
	}

	/// Deserialize the metadata into a typed structure.
	pub fn deserialize_into<T: DeserializeOwned>(&self) -> TbdocResult<T> {
		serde_json::from_value(Value::Object(self.0.clone()))
			.map_err(|e| TbdocError::FrontmatterDecode(e.to_string()))
	}

	pub fn into_inner(self) -> Map<String, Value> {
		self.0
	}
}

impl From<Map<String, Value>> for Frontmatter {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a sequence",
		Value::Object(_) => "a mapping",
	}
}
