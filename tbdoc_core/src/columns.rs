use serde::Deserialize;
use serde::Serialize;

/// The delimiter used by `datasource` tags when none is declared.
pub const DEFAULT_DELIMITER: &str = "|";

/// One row of a datasource schema: `name | type | path | description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
	pub name: String,
	pub r#type: String,
	/// The JSON path the column is extracted from, e.g. `$.user.id`.
	pub path: String,
	/// Free text, empty when the row has no fourth field.
	pub description: String,
}

impl Column {
	/// Parse a single schema line. Returns `None` for blank lines and for
	/// rows missing a name, type or path.
	pub fn from_line(line: &str, delimiter: &str) -> Option<Self> {
		let line = line.trim();
		if line.is_empty() {
			return None;
		}

		let mut fields = line.split(delimiter).map(str::trim);
		let name = fields.next().unwrap_or_default();
		let r#type = fields.next().unwrap_or_default();
		let path = fields.next().unwrap_or_default();
		let description = fields.next().unwrap_or_default();

		if name.is_empty() || r#type.is_empty() || path.is_empty() {
			return None;
		}

		Some(Self {
			name: name.to_string(),
			r#type: r#type.to_string(),
			path: path.to_string(),
			description: description.to_string(),
		})
	}
}

/// Extract the columns described by the text of a `datasource` body.
///
/// Each text chunk may hold several lines. Malformed rows are skipped with a
/// warning so that a partial schema still renders.
pub fn extract_columns<'a>(
	texts: impl IntoIterator<Item = &'a str>,
	delimiter: &str,
) -> Vec<Column> {
	let mut columns = Vec::new();

	for line in texts.into_iter().flat_map(str::lines) {
		match Column::from_line(line, delimiter) {
			Some(column) => columns.push(column),
			None if line.trim().is_empty() => {}
			None => {
				tracing::warn!(
					line = line.trim(),
					delimiter,
					"skipping datasource row without a name, type and path"
				);
			}
		}
	}

	columns
}
