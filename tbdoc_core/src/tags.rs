use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::Serialize;

use crate::AttributeSchema;
use crate::AttributeSpec;
use crate::AttributeType;
use crate::AttributeValue;
use crate::Element;
use crate::Renderable;
use crate::ResolvedAttributes;
use crate::TbdocError;
use crate::TbdocResult;
use crate::columns::Column;
use crate::columns::DEFAULT_DELIMITER;
use crate::columns::extract_columns;

/// How the body of a tag is handed to its transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum BodyMode {
	/// Content is rendered as markdown before the transform sees it.
	#[default]
	Markdown,
	/// Content is passed through verbatim as text nodes.
	Raw,
}

/// The behaviour attached to a tag name in a
/// [`TagRegistry`](crate::TagRegistry).
///
/// Implement this to add tags beyond the built-in `query` and `datasource`.
pub trait TagDefinition: Send + Sync {
	/// The attributes the tag accepts.
	fn schema(&self) -> &AttributeSchema;

	/// How the tag's body is transformed before [`transform`] runs.
	///
	/// [`transform`]: TagDefinition::transform
	fn body(&self) -> BodyMode {
		BodyMode::Markdown
	}

	/// Build the renderable node for a tag from its validated attributes
	/// and its already transformed children.
	fn transform(
		&self,
		attributes: ResolvedAttributes,
		children: Vec<Renderable>,
	) -> TbdocResult<Renderable>;
}

/// The tags every parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTag {
	/// `{% query name="..." %}`, an SQL block.
	Query,
	/// `{% datasource name="..." delimiter="|" %}`, a column schema table.
	Datasource,
}

impl BuiltinTag {
	pub const ALL: [BuiltinTag; 2] = [BuiltinTag::Query, BuiltinTag::Datasource];

	pub fn name(self) -> &'static str {
		match self {
			Self::Query => "query",
			Self::Datasource => "datasource",
		}
	}
}

static QUERY_SCHEMA: LazyLock<AttributeSchema> = LazyLock::new(|| {
	AttributeSchema::new().with("name", AttributeSpec::required(AttributeType::String))
});

static DATASOURCE_SCHEMA: LazyLock<AttributeSchema> = LazyLock::new(|| {
	AttributeSchema::new()
		.with("name", AttributeSpec::required(AttributeType::String))
		.with(
			"delimiter",
			AttributeSpec::optional(AttributeType::String).with_default(DEFAULT_DELIMITER),
		)
});

impl TagDefinition for BuiltinTag {
	fn schema(&self) -> &AttributeSchema {
		match self {
			Self::Query => &QUERY_SCHEMA,
			Self::Datasource => &DATASOURCE_SCHEMA,
		}
	}

	fn body(&self) -> BodyMode {
		match self {
			Self::Query | Self::Datasource => BodyMode::Raw,
		}
	}

	fn transform(
		&self,
		attributes: ResolvedAttributes,
		children: Vec<Renderable>,
	) -> TbdocResult<Renderable> {
		match self {
			Self::Query => {
				let attributes = QueryAttributes::from_resolved(&attributes)?;
				Ok(transform_query(&attributes, &children))
			}
			Self::Datasource => {
				let attributes = DatasourceAttributes::from_resolved(&attributes)?;
				Ok(transform_datasource(&attributes, &children))
			}
		}
	}
}

/// Attributes of a `query` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAttributes {
	pub name: String,
	/// Undeclared attributes, passed through to the `pre` element.
	pub extra: BTreeMap<String, String>,
}

impl QueryAttributes {
	pub fn from_resolved(attributes: &ResolvedAttributes) -> TbdocResult<Self> {
		Ok(Self {
			name: attributes.require_str("name")?.to_string(),
			extra: stringify(attributes.extra()),
		})
	}
}

/// Attributes of a `datasource` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasourceAttributes {
	pub name: String,
	pub delimiter: String,
	/// Undeclared attributes, passed through to the container `div`.
	pub extra: BTreeMap<String, String>,
}

impl DatasourceAttributes {
	pub fn from_resolved(attributes: &ResolvedAttributes) -> TbdocResult<Self> {
		let delimiter = attributes.require_str("delimiter")?;
		if delimiter.is_empty() {
			return Err(TbdocError::InvalidAttributeValue {
				tag: attributes.tag().to_string(),
				attribute: "delimiter".to_string(),
				reason: "the delimiter cannot be empty".to_string(),
			});
		}

		Ok(Self {
			name: attributes.require_str("name")?.to_string(),
			delimiter: delimiter.to_string(),
			extra: stringify(attributes.extra()),
		})
	}
}

fn stringify(values: &BTreeMap<String, AttributeValue>) -> BTreeMap<String, String> {
	values
		.iter()
		.map(|(name, value)| (name.clone(), value.to_string()))
		.collect()
}

/// Render a `query` tag as `<pre name="..."><code class="language-sql">`.
///
/// `name` and any extra attributes are written as plain attributes on the
/// `pre`, not as `data-*` attributes.
pub fn transform_query(attributes: &QueryAttributes, children: &[Renderable]) -> Renderable {
	let sql: String = children.iter().map(Renderable::text_content).collect();
	let sql = sql.trim_matches(['\n', '\r']);

	let mut code = Element::new("code").attribute("class", "language-sql");
	if !sql.is_empty() {
		code = code.child(Renderable::text(sql));
	}

	Element::new("pre")
		.attribute("name", &attributes.name)
		.extend_attributes(attributes.extra.clone())
		.child(code)
		.into()
}

/// Render a `datasource` tag as a container `div` wrapping the column table.
pub fn transform_datasource(
	attributes: &DatasourceAttributes,
	children: &[Renderable],
) -> Renderable {
	let mut texts = Vec::new();
	for child in children {
		child.collect_text_nodes(&mut texts);
	}
	let columns = extract_columns(texts, &attributes.delimiter);

	Element::new("div")
		.attribute("class", "datasource-container")
		.attribute("name", &attributes.name)
		.attribute("delimiter", &attributes.delimiter)
		.extend_attributes(attributes.extra.clone())
		.child(columns_table(&columns))
		.into()
}

/// Build the `table` listing datasource columns under a fixed header.
pub fn columns_table(columns: &[Column]) -> Element {
	let header = Element::new("tr").extend_children(
		["Name", "Type", "Path", "Description"]
			.into_iter()
			.map(|title| Renderable::from(Element::with_text("th", title))),
	);

	let rows = columns.iter().map(|column| {
		Renderable::from(
			Element::new("tr")
				.child(Element::with_text("td", &column.name))
				.child(Element::with_text("td", &column.r#type))
				.child(Element::with_text("td", &column.path))
				.child(Element::with_text("td", &column.description)),
		)
	});

	Element::new("table")
		.attribute("class", "datasource-table")
		.child(Element::new("thead").child(header))
		.child(Element::new("tbody").extend_children(rows))
}

/// A tag that renders as a plain HTML element carrying its attributes,
/// typically declared in `tbdoc.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTag {
	/// The HTML element name, e.g. `aside`.
	pub render: String,
	pub schema: AttributeSchema,
	pub body: BodyMode,
}

impl ElementTag {
	pub fn new(render: impl Into<String>) -> Self {
		Self {
			render: render.into(),
			schema: AttributeSchema::new(),
			body: BodyMode::Markdown,
		}
	}

	#[must_use]
	pub fn with_schema(mut self, schema: AttributeSchema) -> Self {
		self.schema = schema;
		self
	}

	#[must_use]
	pub fn with_body(mut self, body: BodyMode) -> Self {
		self.body = body;
		self
	}
}

impl TagDefinition for ElementTag {
	fn schema(&self) -> &AttributeSchema {
		&self.schema
	}

	fn body(&self) -> BodyMode {
		self.body
	}

	fn transform(
		&self,
		attributes: ResolvedAttributes,
		children: Vec<Renderable>,
	) -> TbdocResult<Renderable> {
		Ok(Element::new(&self.render)
			.extend_attributes(attributes.to_html_attributes())
			.extend_children(children)
			.into())
	}
}
