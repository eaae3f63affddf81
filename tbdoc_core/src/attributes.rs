use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::TbdocError;
use crate::TbdocResult;

/// A value declared on a tag, e.g. `name="orders"`, `limit=10` or
/// `visible=false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum AttributeValue {
	/// A quoted string value, e.g. `"orders"` or `'|'`.
	String(String),
	/// A numeric value, e.g. `42` or `-1.5`.
	Number(OrderedFloat),
	/// A boolean value: `true` or `false`.
	Boolean(bool),
}

impl AttributeValue {
	pub fn r#type(&self) -> AttributeType {
		match self {
			Self::String(_) => AttributeType::String,
			Self::Number(_) => AttributeType::Number,
			Self::Boolean(_) => AttributeType::Boolean,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value.as_str()),
			_ => None,
		}
	}
}

impl std::fmt::Display for AttributeValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::String(value) => write!(f, "{value}"),
			Self::Number(value) => write!(f, "{value}"),
			Self::Boolean(value) => write!(f, "{value}"),
		}
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		Self::Number(OrderedFloat(value))
	}
}

impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

/// A float wrapper that implements `PartialEq` via approximate comparison,
/// allowing `AttributeValue` to derive `PartialEq` cleanly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
	fn eq(&self, other: &Self) -> bool {
		float_cmp::approx_eq!(f64, self.0, other.0)
	}
}

impl std::fmt::Display for OrderedFloat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The type an attribute value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum AttributeType {
	String,
	Number,
	Boolean,
}

impl std::fmt::Display for AttributeType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::String => write!(f, "string"),
			Self::Number => write!(f, "number"),
			Self::Boolean => write!(f, "boolean"),
		}
	}
}

/// The declaration of a single attribute accepted by a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
	pub r#type: AttributeType,
	/// Whether the tag fails validation when the attribute is absent.
	pub required: bool,
	/// Value substituted when the attribute is absent.
	pub default: Option<AttributeValue>,
}

impl AttributeSpec {
	pub fn required(r#type: AttributeType) -> Self {
		Self {
			r#type,
			required: true,
			default: None,
		}
	}

	pub fn optional(r#type: AttributeType) -> Self {
		Self {
			r#type,
			required: false,
			default: None,
		}
	}

	#[must_use]
	pub fn with_default(mut self, value: impl Into<AttributeValue>) -> Self {
		self.default = Some(value.into());
		self
	}
}

/// The attributes a tag understands, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSchema {
	specs: BTreeMap<String, AttributeSpec>,
}

impl AttributeSchema {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
		self.specs.insert(name.into(), spec);
		self
	}

	pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
		self.specs.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeSpec)> {
		self.specs.iter()
	}

	/// Bind the attributes declared on a tag node against this schema.
	///
	/// Supplied values must match their declared type. Absent attributes take
	/// their default, and a required attribute with no default is an error.
	/// Attributes the schema does not mention are kept as extras.
	pub fn resolve(
		&self,
		tag: &str,
		declared: &BTreeMap<String, AttributeValue>,
	) -> TbdocResult<ResolvedAttributes> {
		let mut values = BTreeMap::new();

		for (name, spec) in &self.specs {
			match declared.get(name) {
				Some(value) if value.r#type() != spec.r#type => {
					return Err(TbdocError::InvalidAttributeType {
						tag: tag.to_string(),
						attribute: name.clone(),
						expected: spec.r#type.to_string(),
						found: value.r#type().to_string(),
					});
				}
				Some(value) => {
					values.insert(name.clone(), value.clone());
				}
				None => {
					match &spec.default {
						Some(default) => {
							values.insert(name.clone(), default.clone());
						}
						None if spec.required => {
							return Err(TbdocError::MissingAttribute {
								tag: tag.to_string(),
								attribute: name.clone(),
							});
						}
						None => {}
					}
				}
			}
		}

		let extra = declared
			.iter()
			.filter(|(name, _)| !self.specs.contains_key(*name))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect();

		Ok(ResolvedAttributes {
			tag: tag.to_string(),
			values,
			extra,
		})
	}
}

/// Attributes of one tag node after validation against its schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAttributes {
	tag: String,
	values: BTreeMap<String, AttributeValue>,
	extra: BTreeMap<String, AttributeValue>,
}

impl ResolvedAttributes {
	/// The name of the tag these attributes belong to.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// A schema-bound value.
	pub fn get(&self, name: &str) -> Option<&AttributeValue> {
		self.values.get(name)
	}

	/// A schema-bound string value, failing when it is absent or not text.
	pub fn require_str(&self, name: &str) -> TbdocResult<&str> {
		match self.values.get(name) {
			Some(AttributeValue::String(value)) => Ok(value),
			Some(other) => {
				Err(TbdocError::InvalidAttributeType {
					tag: self.tag.clone(),
					attribute: name.to_string(),
					expected: AttributeType::String.to_string(),
					found: other.r#type().to_string(),
				})
			}
			None => {
				Err(TbdocError::MissingAttribute {
					tag: self.tag.clone(),
					attribute: name.to_string(),
				})
			}
		}
	}

	/// Schema-bound values in name order.
	pub fn values(&self) -> &BTreeMap<String, AttributeValue> {
		&self.values
	}

	/// Declared attributes the schema does not know about.
	pub fn extra(&self) -> &BTreeMap<String, AttributeValue> {
		&self.extra
	}

	/// Every attribute, bound and extra, rendered as HTML attribute text.
	pub fn to_html_attributes(&self) -> BTreeMap<String, String> {
		self.values
			.iter()
			.chain(&self.extra)
			.map(|(name, value)| (name.clone(), value.to_string()))
			.collect()
	}
}
